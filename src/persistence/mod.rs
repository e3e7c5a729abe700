//! Player profile persistence
//!
//! Features:
//! - Account schema with hashed passwords
//! - `ProfileStore` trait with in-memory and JSON file backends
//! - Per-user saved games for continuing a run later
//! - Session boundary plumbing: read progress at start, report at the end
//!
//! Nothing here runs during a tick. Store failures at the session boundary
//! are logged and replaced with defaults.

pub mod profile;
pub mod saves;
pub mod store;

pub use profile::{PlayerScore, Profile, hash_password};
pub use saves::{delete_save, load_game, save_game};
pub use store::{JsonFileStore, MemoryStore, ProfileStore};

use crate::consts::MAX_LEVEL;

/// Stored progress a session starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStart {
    pub level_unlocked: u32,
    pub high_score: u64,
}

impl Default for SessionStart {
    fn default() -> Self {
        Self {
            level_unlocked: 1,
            high_score: 0,
        }
    }
}

impl SessionStart {
    /// Read a user's progress. Unknown users and store failures start fresh.
    pub fn load(store: &dyn ProfileStore, username: &str) -> Self {
        match store.get(username) {
            Ok(Some(profile)) => Self {
                level_unlocked: profile.level_unlocked.clamp(1, MAX_LEVEL),
                high_score: profile.high_score,
            },
            Ok(None) => {
                log::warn!("No profile for {}, starting fresh", username);
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load profile for {}: {:#}", username, e);
                Self::default()
            }
        }
    }
}

/// What a finished session hands back to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub score_delta: u64,
    pub games_played: u32,
    pub level_unlocked: u32,
}

fn try_record(
    store: &mut dyn ProfileStore,
    username: &str,
    report: &SessionReport,
) -> anyhow::Result<()> {
    let delta = i64::try_from(report.score_delta).unwrap_or(i64::MAX);
    store.add_score(username, delta)?;
    for _ in 0..report.games_played {
        store.increment_games_played(username)?;
    }
    // Progress only moves forward
    let stored = store.level_unlocked(username)?.unwrap_or(1);
    if report.level_unlocked > stored {
        store.set_level_unlocked(username, report.level_unlocked)?;
    }
    Ok(())
}

/// Apply a session report. Returns false if the store failed.
pub fn record_session(store: &mut dyn ProfileStore, username: &str, report: &SessionReport) -> bool {
    match try_record(store, username, report) {
        Ok(()) => {
            log::info!(
                "Recorded session for {}: +{} points, level {}",
                username,
                report.score_delta,
                report.level_unlocked
            );
            true
        }
        Err(e) => {
            log::warn!("Failed to record session for {}: {:#}", username, e);
            false
        }
    }
}
