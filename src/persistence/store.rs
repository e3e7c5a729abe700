//! Account storage backends
//!
//! Backends implement four primitives; every account operation is built on
//! top of them. Policy rejections (taken username, level out of range,
//! negative score, empty field) are `Ok(false)`, never errors.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::profile::{PlayerScore, Profile};
use crate::consts::MAX_LEVEL;

pub trait ProfileStore {
    fn get(&self, username: &str) -> anyhow::Result<Option<Profile>>;
    fn put(&mut self, profile: Profile) -> anyhow::Result<()>;
    /// Returns whether the profile existed
    fn remove(&mut self, username: &str) -> anyhow::Result<bool>;
    fn all(&self) -> anyhow::Result<Vec<Profile>>;

    /// Register a new account. Fails softly if the username is taken.
    fn create_user(&mut self, username: &str, password: &str, real_name: &str) -> anyhow::Result<bool> {
        if self.get(username)?.is_some() {
            log::debug!("Username {} taken", username);
            return Ok(false);
        }
        self.put(Profile::new(username, password, real_name))?;
        log::info!("Created user {}", username);
        Ok(true)
    }

    fn authenticate(&self, username: &str, password: &str) -> anyhow::Result<bool> {
        Ok(self
            .get(username)?
            .is_some_and(|p| p.password_matches(password)))
    }

    fn level_unlocked(&self, username: &str) -> anyhow::Result<Option<u32>> {
        Ok(self.get(username)?.map(|p| p.level_unlocked))
    }

    /// Accepts levels 1 through 60
    fn set_level_unlocked(&mut self, username: &str, level: u32) -> anyhow::Result<bool> {
        if !(1..=MAX_LEVEL).contains(&level) {
            log::debug!("Rejected unlock level {} for {}", level, username);
            return Ok(false);
        }
        modify(self, username, &mut |p: &mut Profile| p.level_unlocked = level)
    }

    fn score(&self, username: &str) -> anyhow::Result<Option<u64>> {
        Ok(self.get(username)?.map(|p| p.high_score))
    }

    /// Add to the stored cumulative score. Negative amounts are rejected.
    fn add_score(&mut self, username: &str, amount: i64) -> anyhow::Result<bool> {
        let Ok(amount) = u64::try_from(amount) else {
            log::debug!("Rejected negative score {} for {}", amount, username);
            return Ok(false);
        };
        modify(self, username, &mut |p: &mut Profile| {
            p.high_score = p.high_score.saturating_add(amount)
        })
    }

    fn increment_games_played(&mut self, username: &str) -> anyhow::Result<bool> {
        modify(self, username, &mut |p: &mut Profile| p.games_played += 1)
    }

    fn games_played(&self, username: &str) -> anyhow::Result<Option<u32>> {
        Ok(self.get(username)?.map(|p| p.games_played))
    }

    fn update_password(&mut self, username: &str, password: &str) -> anyhow::Result<bool> {
        if password.is_empty() {
            return Ok(false);
        }
        let hash = super::profile::hash_password(password);
        modify(self, username, &mut |p: &mut Profile| p.password_hash = hash.clone())
    }

    fn update_real_name(&mut self, username: &str, real_name: &str) -> anyhow::Result<bool> {
        if real_name.is_empty() {
            return Ok(false);
        }
        modify(self, username, &mut |p: &mut Profile| p.real_name = real_name.to_string())
    }

    fn delete_account(&mut self, username: &str) -> anyhow::Result<bool> {
        let removed = self.remove(username)?;
        if removed {
            log::info!("Deleted user {}", username);
        }
        Ok(removed)
    }

    fn profile(&self, username: &str) -> anyhow::Result<Option<PlayerScore>> {
        Ok(self.get(username)?.map(|p| p.score_card()))
    }

    /// Every account, best score first
    fn top_scores(&self) -> anyhow::Result<Vec<PlayerScore>> {
        let mut scores: Vec<PlayerScore> = self.all()?.iter().map(Profile::score_card).collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));
        Ok(scores)
    }
}

/// Read-modify-write one profile. Ok(false) if the user does not exist.
fn modify<S: ProfileStore + ?Sized>(
    store: &mut S,
    username: &str,
    edit: &mut dyn FnMut(&mut Profile),
) -> anyhow::Result<bool> {
    let Some(mut profile) = store.get(username)? else {
        log::debug!("No such user {}", username);
        return Ok(false);
    };
    edit(&mut profile);
    store.put(profile)?;
    Ok(true)
}

/// In-process store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    profiles: BTreeMap<String, Profile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn get(&self, username: &str) -> anyhow::Result<Option<Profile>> {
        Ok(self.profiles.get(username).cloned())
    }

    fn put(&mut self, profile: Profile) -> anyhow::Result<()> {
        self.profiles.insert(profile.username.clone(), profile);
        Ok(())
    }

    fn remove(&mut self, username: &str) -> anyhow::Result<bool> {
        Ok(self.profiles.remove(username).is_some())
    }

    fn all(&self) -> anyhow::Result<Vec<Profile>> {
        Ok(self.profiles.values().cloned().collect())
    }
}

/// All profiles in one JSON document, rewritten on every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    profiles: MemoryStore,
}

impl JsonFileStore {
    /// Open the document at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let mut profiles = MemoryStore::new();
        if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let list: Vec<Profile> = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            log::info!("Loaded {} profiles from {}", list.len(), path.display());
            for profile in list {
                profiles.put(profile)?;
            }
        }
        Ok(Self { path, profiles })
    }

    /// Default per-user location, if the platform has a data directory
    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "BlastGrid")?;
        Some(dirs.data_dir().join("profiles.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename over the document
    fn flush(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.profiles.all()?)
            .context("Failed to encode profiles")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl ProfileStore for JsonFileStore {
    fn get(&self, username: &str) -> anyhow::Result<Option<Profile>> {
        self.profiles.get(username)
    }

    fn put(&mut self, profile: Profile) -> anyhow::Result<()> {
        self.profiles.put(profile)?;
        self.flush()
    }

    fn remove(&mut self, username: &str) -> anyhow::Result<bool> {
        let removed = self.profiles.remove(username)?;
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn all(&self) -> anyhow::Result<Vec<Profile>> {
        self.profiles.all()
    }
}
