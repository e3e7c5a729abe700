//! Sound cue boundary
//!
//! The simulation emits named cues; an `AudioSink` plays them. Playback is
//! fire-and-forget: a failing sink is logged and never reaches the tick.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Bomb fuse expired or detonated
    BombExplode,
    /// Player lost a life
    Death,
    /// Last life lost
    GameOver,
    /// Gameplay paused
    Pause,
    /// Stop the background theme
    ThemeStop,
    /// Pickup collected
    PowerUpCollect,
    /// Door reached with the stage cleared
    StageClear,
}

impl SoundEffect {
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::BombExplode => "bomb_explode",
            SoundEffect::Death => "death",
            SoundEffect::GameOver => "game_over",
            SoundEffect::Pause => "pause",
            SoundEffect::ThemeStop => "theme_stop",
            SoundEffect::PowerUpCollect => "power_up_collect",
            SoundEffect::StageClear => "stage_clear",
        }
    }

    /// Music cues are scaled by the music volume, everything else by sfx
    pub fn is_music(self) -> bool {
        matches!(self, SoundEffect::ThemeStop | SoundEffect::GameOver)
    }
}

/// Audio backend supplied by the host
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> anyhow::Result<()>;
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes cues to the log instead of a sound device
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> anyhow::Result<()> {
        log::info!("cue {} (volume {:.2})", effect.name(), volume);
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }

    pub fn from_settings(sink: Box<dyn AudioSink>, settings: &Settings) -> Self {
        let mut manager = Self::new(sink);
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager.set_music_volume(settings.music_volume);
        manager.set_muted(settings.muted);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self, effect: SoundEffect) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = if effect.is_music() {
            self.music_volume
        } else {
            self.sfx_volume
        };
        self.master_volume * channel
    }

    /// Play a sound cue
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume(effect);
        // Stopping the theme must reach the backend even when silent
        if vol <= 0.0 && effect != SoundEffect::ThemeStop {
            return;
        }
        if let Err(e) = self.sink.play(effect, vol) {
            log::warn!("Audio cue {} failed: {:#}", effect.name(), e);
        }
    }
}
