//! Shared state for movable and static objects on the grid

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::grid::Cell;
use super::powerup::PowerUpKind;
use crate::consts::{PLAYER_SIZE, TILE_SIZE};

/// Persisted sprite identity; the renderer maps it to an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteId {
    Player,
    Bomb,
    PowerUp(PowerUpKind),
}

impl SpriteId {
    /// Collision size for entities using this sprite
    pub fn size(self) -> IVec2 {
        match self {
            SpriteId::Player => IVec2::splat(PLAYER_SIZE),
            SpriteId::Bomb | SpriteId::PowerUp(_) => IVec2::splat(TILE_SIZE),
        }
    }
}

/// Renderer-owned image reference. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub pos: IVec2,
    pub prev_pos: IVec2,
    pub vel: IVec2,
    pub visible: bool,
    pub size: IVec2,
    pub sprite_id: SpriteId,
    /// Dropped on deserialize and reacquired on first draw
    #[serde(skip)]
    pub sprite: Option<SpriteHandle>,
}

impl Entity {
    pub fn new(sprite_id: SpriteId, pos: IVec2) -> Self {
        Self {
            pos,
            prev_pos: pos,
            vel: IVec2::ZERO,
            visible: true,
            size: sprite_id.size(),
            sprite_id,
            sprite: None,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn overlaps(&self, other: &Entity) -> bool {
        self.bounds().intersects(&other.bounds())
    }

    /// Tile under the entity's center
    pub fn cell(&self) -> Cell {
        Cell::containing(self.bounds().center())
    }

    /// Place the entity, forgetting its previous position
    pub fn teleport(&mut self, pos: IVec2) {
        self.pos = pos;
        self.prev_pos = pos;
    }

    /// Return the sprite handle, loading it first if it was never attached
    pub fn ensure_sprite_loaded(
        &mut self,
        load: impl FnOnce(SpriteId) -> SpriteHandle,
    ) -> SpriteHandle {
        let id = self.sprite_id;
        *self.sprite.get_or_insert_with(|| load(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_handle_not_persisted() {
        let mut entity = Entity::new(SpriteId::Bomb, IVec2::new(30, 60));
        entity.ensure_sprite_loaded(|_| SpriteHandle(7));
        assert_eq!(entity.sprite, Some(SpriteHandle(7)));

        let json = serde_json::to_string(&entity).unwrap();
        let mut restored: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.sprite, None);
        assert_eq!(restored.pos, IVec2::new(30, 60));

        let mut loads = 0;
        let handle = restored.ensure_sprite_loaded(|id| {
            loads += 1;
            assert_eq!(id, SpriteId::Bomb);
            SpriteHandle(9)
        });
        assert_eq!(handle, SpriteHandle(9));
        restored.ensure_sprite_loaded(|_| SpriteHandle(10));
        assert_eq!(restored.sprite, Some(SpriteHandle(9)));
        assert_eq!(loads, 1);
    }

    #[test]
    fn test_cell_uses_center() {
        let entity = Entity::new(SpriteId::Player, IVec2::new(32, 32));
        assert_eq!(entity.cell(), Cell::new(1, 1));
        let entity = Entity::new(SpriteId::Player, IVec2::new(50, 32));
        assert_eq!(entity.cell(), Cell::new(2, 1));
    }
}
