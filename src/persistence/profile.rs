//! Stored player account schema

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One stored account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    /// Hex SHA-256 of the password
    pub password_hash: String,
    pub real_name: String,
    /// Cumulative score over all sessions
    pub high_score: u64,
    pub level_unlocked: u32,
    pub games_played: u32,
}

impl Profile {
    pub fn new(username: &str, password: &str, real_name: &str) -> Self {
        Self {
            username: username.to_string(),
            password_hash: hash_password(password),
            real_name: real_name.to_string(),
            high_score: 0,
            level_unlocked: 1,
            games_played: 0,
        }
    }

    pub fn password_matches(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }

    pub fn score_card(&self) -> PlayerScore {
        PlayerScore {
            username: self.username.clone(),
            score: self.high_score,
            real_name: self.real_name.clone(),
            games_played: self.games_played,
        }
    }
}

/// Public view of a profile, as shown on score tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub username: String,
    pub score: u64,
    pub real_name: String,
    pub games_played: u32,
}

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let profile = Profile::new("sam", "hunter2", "Sam Lee");
        assert_eq!(profile.level_unlocked, 1);
        assert_eq!(profile.high_score, 0);
        assert_ne!(profile.password_hash, "hunter2");
        assert_eq!(profile.password_hash.len(), 64);
        assert!(profile.password_matches("hunter2"));
        assert!(!profile.password_matches("hunter3"));
    }
}
