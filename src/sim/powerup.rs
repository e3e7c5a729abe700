//! Passive pickups revealed by destroyed tiles

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, SpriteId};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerUpKind {
    BombPass,
    ExtraBomb,
    Detonator,
    FlamePass,
    ExtraFlame,
    Invincibility,
    Speed,
    WallPass,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 8] = [
        PowerUpKind::BombPass,
        PowerUpKind::ExtraBomb,
        PowerUpKind::Detonator,
        PowerUpKind::FlamePass,
        PowerUpKind::ExtraFlame,
        PowerUpKind::Invincibility,
        PowerUpKind::Speed,
        PowerUpKind::WallPass,
    ];

    /// Whether the effect is a capability flag lost on death
    pub fn is_capability(self) -> bool {
        matches!(
            self,
            PowerUpKind::BombPass
                | PowerUpKind::Detonator
                | PowerUpKind::FlamePass
                | PowerUpKind::WallPass
        )
    }
}

/// A pickup entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub entity: Entity,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: IVec2) -> Self {
        Self {
            entity: Entity::new(SpriteId::PowerUp(kind), pos),
            kind,
        }
    }
}
