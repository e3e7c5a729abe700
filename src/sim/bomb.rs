//! Bomb fuse and one-shot explosion
//!
//! A bomb only knows its own timer. Turning an exploded bomb into flame is
//! the owning player's job, since the blast radius is a player capability.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::entity::{Entity, SpriteId};
use super::grid::Cell;
use super::state::GameEvent;
use crate::audio::SoundEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombState {
    Armed,
    Exploded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub entity: Entity,
    /// Ticks since placement
    pub fuse_frames: u32,
    /// Set until the placing player first steps off the bomb
    pub first_collision: bool,
    state: BombState,
}

impl Bomb {
    /// Create an armed bomb at a tile origin
    pub fn new(pos: IVec2) -> Self {
        Self {
            entity: Entity::new(SpriteId::Bomb, pos),
            fuse_frames: 0,
            first_collision: true,
            state: BombState::Armed,
        }
    }

    pub fn state(&self) -> BombState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == BombState::Armed
    }

    pub fn cell(&self) -> Cell {
        self.entity.cell()
    }

    /// Advance the fuse. Explodes on the tick the counter passes `fuse_limit`.
    /// Returns true if the bomb exploded on this tick.
    pub fn tick(&mut self, fuse_limit: u32, events: &mut Vec<GameEvent>) -> bool {
        if !self.is_armed() {
            return false;
        }
        self.fuse_frames = self.fuse_frames.saturating_add(1);
        if self.fuse_frames > fuse_limit {
            return self.explode(events);
        }
        false
    }

    /// Armed -> Exploded, at most once.
    ///
    /// Both the fuse and manual detonation land here; the second caller is a
    /// no-op. Returns whether this call performed the transition.
    pub fn explode(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.state == BombState::Exploded {
            return false;
        }
        self.state = BombState::Exploded;
        self.entity.visible = false;
        events.push(GameEvent::Sound(SoundEffect::BombExplode));
        true
    }

    /// Whether the bomb stops a mover occupying `bounds`
    pub fn is_solid_to(&self, bounds: &Aabb) -> bool {
        self.is_armed() && !self.first_collision && self.entity.bounds().intersects(bounds)
    }

    /// Drop the walk-off grace once the placer no longer overlaps the bomb
    pub fn release_if_clear(&mut self, bounds: &Aabb) {
        if self.first_collision && !self.entity.bounds().intersects(bounds) {
            self.first_collision = false;
        }
    }
}
