//! Per-user saved games
//!
//! One JSON document per user holding the whole `GameState`. Sprite handles
//! are not saved; the renderer reattaches them on the first frame after a
//! load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::sim::GameState;

/// Default saves directory, if the platform has a data directory
pub fn default_dir() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "BlastGrid")?;
    Some(dirs.data_dir().join("saves"))
}

/// File holding `username`'s save inside `dir`
pub fn save_path(dir: &Path, username: &str) -> anyhow::Result<PathBuf> {
    let valid = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    anyhow::ensure!(valid, "Invalid username for a save file: {:?}", username);
    Ok(dir.join(format!("{username}.json")))
}

/// Write a save, replacing any earlier one for the same user
pub fn save_game(dir: &Path, username: &str, state: &GameState) -> anyhow::Result<PathBuf> {
    let path = save_path(dir, username)?;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let json = serde_json::to_string(state).context("Failed to encode saved game")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", path.display()))?;
    log::info!("Saved game for {} at stage {}", username, state.stage);
    Ok(path)
}

/// Read a user's save. `Ok(None)` if they have none.
pub fn load_game(dir: &Path, username: &str) -> anyhow::Result<Option<GameState>> {
    let path = save_path(dir, username)?;
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut state: GameState = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    state.tuning = state.tuning.sanitized();
    log::info!("Loaded saved game for {} at stage {}", username, state.stage);
    Ok(Some(state))
}

/// Remove a user's save. Returns whether one existed.
pub fn delete_save(dir: &Path, username: &str) -> anyhow::Result<bool> {
    let path = save_path(dir, username)?;
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    Ok(true)
}
