//! Game settings and preferences
//!
//! Persisted as JSON, separately from player profiles. A missing or
//! unreadable file means defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::sim::Key;
use crate::tuning::Tuning;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Input ===
    /// Host key name -> game key
    pub key_bindings: BTreeMap<String, Key>,

    // === Simulation ===
    /// Frames per second of game time
    pub tick_rate: u32,
    /// Fixed run seed; a fresh one is picked when unset
    pub seed: Option<u64>,
    pub tuning: Tuning,
}

fn default_bindings() -> BTreeMap<String, Key> {
    [
        ("ArrowUp", Key::Up),
        ("ArrowDown", Key::Down),
        ("ArrowLeft", Key::Left),
        ("ArrowRight", Key::Right),
        ("w", Key::Up),
        ("s", Key::Down),
        ("a", Key::Left),
        ("d", Key::Right),
        ("Escape", Key::Pause),
        ("p", Key::Pause),
        ("x", Key::Detonate),
        ("Space", Key::PlaceBomb),
    ]
    .into_iter()
    .map(|(name, key)| (name.to_string(), key))
    .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            key_bindings: default_bindings(),
            tick_rate: (1.0 / SIM_DT).round() as u32,
            seed: None,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Game key bound to a host key name
    pub fn key_for(&self, name: &str) -> Option<Key> {
        self.key_bindings.get(name).copied()
    }

    pub fn bind(&mut self, name: impl Into<String>, key: Key) {
        self.key_bindings.insert(name.into(), key);
    }

    /// Seconds per simulation frame
    pub fn tick_dt(&self) -> f32 {
        if self.tick_rate == 0 {
            SIM_DT
        } else {
            1.0 / self.tick_rate as f32
        }
    }

    /// Per-user settings file, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "BlastGrid")?;
        Some(dirs.config_dir().join("settings.json"))
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&json) {
            Ok(mut settings) => {
                settings.tuning = settings.tuning.sanitized();
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring corrupt settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to encode settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
