//! Session driver
//!
//! Owns a running game: queues input between frames, runs fixed-size ticks
//! from real elapsed time, forwards sound cues to audio and produces the
//! report that goes back to storage when the session ends.

use std::collections::BTreeMap;

use crate::audio::{AudioManager, AudioSink};
use crate::consts::{MAX_LEVEL, MAX_SUBSTEPS};
use crate::persistence::{SessionReport, SessionStart};
use crate::renderer::{FrameSnapshot, Renderer, SpriteLoader, ensure_sprites_loaded};
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GamePhase, GameState, Hostiles, Key, KeyEvent, LevelPlan, NoHostiles, TickInput,
    tick,
};

/// Longest real frame fed to the accumulator; anything longer is a stall
const MAX_FRAME_DT: f32 = 0.5;

pub struct Session {
    state: GameState,
    pending: TickInput,
    accumulator: f32,
    /// Seconds per tick
    dt: f32,
    audio: AudioManager,
    hostiles: Box<dyn Hostiles>,
    bindings: BTreeMap<String, Key>,
    start: SessionStart,
}

fn fresh_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

impl Session {
    /// Wrap an existing state with silent audio and no hostiles
    pub fn new(state: GameState, start: SessionStart) -> Self {
        let settings = Settings::default();
        Self {
            state,
            pending: TickInput::default(),
            accumulator: 0.0,
            dt: settings.tick_dt(),
            audio: AudioManager::default(),
            hostiles: Box::new(NoHostiles),
            bindings: settings.key_bindings,
            start,
        }
    }

    /// Start a generated run on the highest unlocked stage
    pub fn start(settings: &Settings, start: SessionStart, sink: Box<dyn AudioSink>) -> Self {
        let seed = settings.seed.unwrap_or_else(fresh_seed);
        let stage = start.level_unlocked.clamp(1, MAX_LEVEL);
        let state = GameState::with_plan(LevelPlan::Generated, seed, stage, settings.tuning.clone());
        log::info!("Session started: seed {}, stage {}", seed, stage);
        Self::configured(state, settings, start, sink)
    }

    /// Continue a saved run. Sprites are reattached on the first render.
    pub fn resume_saved(
        state: GameState,
        settings: &Settings,
        start: SessionStart,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        log::info!(
            "Session continued: seed {}, stage {}, tick {}",
            state.seed,
            state.stage,
            state.time_ticks
        );
        Self::configured(state, settings, start, sink)
    }

    fn configured(
        state: GameState,
        settings: &Settings,
        start: SessionStart,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        let mut session = Self::new(state, start);
        session.dt = settings.tick_dt();
        session.audio = AudioManager::from_settings(sink, settings);
        session.bindings = settings.key_bindings.clone();
        session
    }

    pub fn with_hostiles(mut self, hostiles: Box<dyn Hostiles>) -> Self {
        self.hostiles = hostiles;
        self
    }

    pub fn with_audio(mut self, audio: AudioManager) -> Self {
        self.audio = audio;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn on_key_down(&mut self, key: Key) {
        self.pending.keys.push(KeyEvent::Down(key));
    }

    pub fn on_key_up(&mut self, key: Key) {
        self.pending.keys.push(KeyEvent::Up(key));
    }

    /// Queue a host key by name. Returns false for unbound keys.
    pub fn on_host_key(&mut self, name: &str, down: bool) -> bool {
        let Some(&key) = self.bindings.get(name) else {
            return false;
        };
        if down {
            self.on_key_down(key);
        } else {
            self.on_key_up(key);
        }
        true
    }

    /// Run exactly one tick with everything queued so far
    pub fn step(&mut self) -> Vec<GameEvent> {
        let input = std::mem::take(&mut self.pending);
        tick(&mut self.state, &input, &mut *self.hostiles);
        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::Sound(cue) = event {
                self.audio.play(*cue);
            }
        }
        events
    }

    /// Advance by real elapsed seconds, running at most `MAX_SUBSTEPS` ticks
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < MAX_SUBSTEPS {
            events.extend(self.step());
            self.accumulator -= self.dt;
            substeps += 1;
        }
        events
    }

    /// Leave the pause menu
    pub fn resume(&mut self) -> bool {
        self.state.resume()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(&self.state).with_high_score(self.start.high_score)
    }

    /// Attach missing sprites, then hand the frame to the renderer
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        loader: &mut dyn SpriteLoader,
    ) -> anyhow::Result<()> {
        ensure_sprites_loaded(&mut self.state, loader);
        renderer.draw(&self.snapshot())
    }

    /// Progress to store when the session ends
    pub fn report(&self) -> SessionReport {
        SessionReport {
            score_delta: self.state.score,
            games_played: 1,
            level_unlocked: self.start.level_unlocked.max(self.state.stage).min(MAX_LEVEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundEffect;
    use crate::audio::tests::RecordingSink;
    use crate::consts::SIM_DT;
    use crate::persistence::saves;
    use crate::renderer::{SpriteCache, TextRenderer};
    use crate::sim::Grid;
    use crate::tuning::Tuning;

    fn room_session() -> Session {
        let state = GameState::with_grid(Grid::from_ascii("#####\n#...#\n#...#\n#####"), Tuning::default());
        Session::new(state, SessionStart::default())
    }

    #[test]
    fn test_update_runs_whole_ticks() {
        let mut session = room_session();
        session.update(SIM_DT * 2.5);
        assert_eq!(session.state().time_ticks, 2);
        session.update(SIM_DT * 0.6);
        assert_eq!(session.state().time_ticks, 3);
    }

    #[test]
    fn test_update_caps_substeps() {
        let mut session = room_session();
        session.update(10.0);
        assert_eq!(session.state().time_ticks, MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_queued_keys_apply_on_next_tick() {
        let mut session = room_session();
        session.on_key_down(Key::Right);
        assert_eq!(session.state().player.entity.vel.x, 0);
        session.step();
        assert_eq!(session.state().player.entity.pos.x, 34);

        assert!(session.on_host_key("ArrowRight", false));
        assert!(!session.on_host_key("F12", true));
        session.step();
        assert_eq!(session.state().player.entity.vel.x, 0);
    }

    #[test]
    fn test_cues_reach_audio() {
        let sink = RecordingSink::default();
        let mut session = room_session().with_audio(AudioManager::new(Box::new(sink.clone())));
        session.on_key_down(Key::Pause);
        let events = session.step();
        assert!(events.contains(&GameEvent::Paused));
        assert_eq!(*sink.0.borrow(), vec![SoundEffect::Pause]);

        assert!(session.resume());
        assert_eq!(session.phase(), GamePhase::InGame);
    }

    #[test]
    fn test_report_tracks_stage_and_score() {
        let state = GameState::with_grid(Grid::from_ascii("#####\n#.D.#\n#####"), Tuning::default());
        let start = SessionStart {
            level_unlocked: 1,
            high_score: 0,
        };
        let mut session = Session::new(state, start);
        session.on_key_down(Key::Right);
        for _ in 0..10 {
            session.step();
        }
        let report = session.report();
        assert_eq!(report.level_unlocked, 2);
        assert_eq!(report.score_delta, 1000);
        assert_eq!(report.games_played, 1);
    }

    #[test]
    fn test_start_uses_unlocked_stage() {
        let settings = Settings {
            seed: Some(5),
            ..Default::default()
        };
        let start = SessionStart {
            level_unlocked: 4,
            high_score: 900,
        };
        let session = Session::start(&settings, start, Box::new(crate::audio::NullSink));
        assert_eq!(session.state().stage, 4);
        assert_eq!(session.state().seed, 5);
        assert_eq!(session.report().level_unlocked, 4);
        assert_eq!(session.snapshot().high_score, 900);
    }

    #[test]
    fn test_resume_saved_run() {
        let dir = std::env::temp_dir().join(format!("blast-grid-resume-{}", std::process::id()));
        let mut session = room_session();
        session.on_key_down(Key::PlaceBomb);
        session.step();
        let mut cache = SpriteCache::new();
        let mut renderer = TextRenderer::new(Vec::new());
        session.render(&mut renderer, &mut cache).unwrap();
        saves::save_game(&dir, "ana", session.state()).unwrap();

        let loaded = saves::load_game(&dir, "ana").unwrap().unwrap();
        assert!(loaded.player.entity.sprite.is_none());
        let mut resumed = Session::resume_saved(
            loaded,
            &Settings::default(),
            SessionStart::default(),
            Box::new(crate::audio::NullSink),
        );
        assert_eq!(resumed.state().time_ticks, 1);
        assert_eq!(resumed.state().player.bombs.len(), 1);

        resumed.render(&mut renderer, &mut cache).unwrap();
        let frame = resumed.snapshot();
        assert_eq!(frame.sprites.len(), 2);
        assert!(frame.sprites.iter().all(|s| s.handle.is_some()));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_render_attaches_sprites() {
        let mut session = room_session();
        let mut renderer = TextRenderer::new(Vec::new());
        let mut cache = SpriteCache::new();
        session.render(&mut renderer, &mut cache).unwrap();
        assert!(session.state().player.entity.sprite.is_some());
        assert!(!renderer.into_inner().is_empty());
    }
}
