//! Data-driven game balance
//!
//! Every timer and cap in the simulation reads from a `Tuning` value so that
//! settings files and tests can override the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fuse length; the bomb explodes on the tick its counter exceeds this
    pub fuse_frames: u32,
    /// Lifetime of a flame cell in ticks
    pub flame_frames: u32,
    pub respawn_frames: u32,
    pub invincibility_frames: u32,
    pub initial_lives: u32,
    pub initial_bombs: u32,
    pub max_bombs: u32,
    pub initial_radius: u32,
    pub max_radius: u32,
    pub normal_speed: i32,
    pub fast_speed: i32,
    /// Chance (0-1) that an open stage tile is generated as destructible
    pub destructible_density: f64,
    /// Power-ups hidden under destructibles per generated stage
    pub power_ups_per_stage: u32,
    pub stage_clear_bonus: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fuse_frames: FUSE_FRAMES,
            flame_frames: FLAME_FRAMES,
            respawn_frames: RESPAWN_FRAMES,
            invincibility_frames: INVINCIBILITY_FRAMES,
            initial_lives: INITIAL_LIVES,
            initial_bombs: INITIAL_BOMBS,
            max_bombs: MAX_BOMBS,
            initial_radius: INITIAL_RADIUS,
            max_radius: MAX_RADIUS,
            normal_speed: NORMAL_SPEED,
            fast_speed: FAST_SPEED,
            destructible_density: 0.35,
            power_ups_per_stage: 1,
            stage_clear_bonus: STAGE_CLEAR_BONUS,
        }
    }
}

impl Tuning {
    /// Clamp values that would break simulation invariants
    pub fn sanitized(mut self) -> Self {
        self.fuse_frames = self.fuse_frames.clamp(1, MAX_TIMER_FRAMES);
        self.flame_frames = self.flame_frames.clamp(1, MAX_TIMER_FRAMES);
        self.respawn_frames = self.respawn_frames.clamp(1, MAX_TIMER_FRAMES);
        self.invincibility_frames = self.invincibility_frames.clamp(1, MAX_TIMER_FRAMES);
        self.max_bombs = self.max_bombs.max(1);
        self.initial_bombs = self.initial_bombs.clamp(1, self.max_bombs);
        self.max_radius = self.max_radius.max(1);
        self.initial_radius = self.initial_radius.clamp(1, self.max_radius);
        self.fast_speed = self.fast_speed.max(self.normal_speed);
        self.destructible_density = self.destructible_density.clamp(0.0, 1.0);
        self
    }
}
