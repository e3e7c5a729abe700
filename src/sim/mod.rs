//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-counted timers only
//! - Seeded RNG only
//! - Stable iteration order (insertion order for bombs and pickups)
//! - No rendering, audio or storage dependencies

pub mod bomb;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod hostiles;
pub mod player;
pub mod powerup;
pub mod stage;
pub mod state;
pub mod tick;

pub use bomb::{Bomb, BombState};
pub use collision::Aabb;
pub use entity::{Entity, SpriteHandle, SpriteId};
pub use grid::{Cell, Direction, Grid, Ignition, Tile, TileKind};
pub use hostiles::{Hostiles, NoHostiles};
pub use player::{Capabilities, GamePhase, Key, LifeState, Player};
pub use powerup::{PowerUp, PowerUpKind};
pub use stage::generate_stage;
pub use state::{GameEvent, GameState, LevelPlan};
pub use tick::{KeyEvent, TickInput, tick};
