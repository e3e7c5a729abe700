//! Blast Grid - simulation core for a grid-based bomb arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, bombs, flames, player, power-ups)
//! - `session`: Fixed-timestep driver, input queue and collaborator dispatch
//! - `renderer`: Draw-request boundary (the core never draws)
//! - `audio`: Sound cue boundary
//! - `persistence`: Player profile storage boundary
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::Leaderboard;
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (30 Hz, the cadence all frame counts assume)
    pub const SIM_DT: f32 = 1.0 / 30.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Side length of a grid tile in pixels
    pub const TILE_SIZE: i32 = 30;
    /// Pixels into a tile at which bomb placement rounds up to the next tile
    pub const SNAP_THRESHOLD: i32 = 17;

    /// Player spawn coordinate (both axes, pixels)
    pub const PLAYER_SPAWN: i32 = 32;
    /// Player hitbox side length
    pub const PLAYER_SIZE: i32 = 26;

    /// A bomb explodes once its fuse counter exceeds this
    pub const FUSE_FRAMES: u32 = 90;
    /// Frames a flame cell stays lethal after ignition
    pub const FLAME_FRAMES: u32 = 2;
    /// Upper bound for any configurable timer (one hour of ticks)
    pub const MAX_TIMER_FRAMES: u32 = 30 * 60 * 60;
    /// Frames between death and respawn
    pub const RESPAWN_FRAMES: u32 = 60;
    /// Duration of the invincibility power-up (5 seconds)
    pub const INVINCIBILITY_FRAMES: u32 = 150;

    pub const INITIAL_LIVES: u32 = 3;
    pub const INITIAL_BOMBS: u32 = 3;
    pub const MAX_BOMBS: u32 = 10;
    pub const INITIAL_RADIUS: u32 = 1;
    pub const MAX_RADIUS: u32 = 6;

    /// Movement speeds in pixels per tick
    pub const NORMAL_SPEED: i32 = 2;
    pub const FAST_SPEED: i32 = 3;

    /// Highest level an account can unlock
    pub const MAX_LEVEL: u32 = 60;
    /// Points awarded for walking through the door
    pub const STAGE_CLEAR_BONUS: u64 = 1000;
}
