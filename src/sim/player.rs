//! Player state machine, input mapping and bomb inventory
//!
//! Life cycle: `Alive -> Dead(countdown) -> Alive`, or `-> GameOver` once a
//! death arrives with no lives left. Invincibility is an orthogonal flag
//! with its own countdown.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bomb::Bomb;
use super::collision::{self, Aabb};
use super::entity::{Entity, SpriteId};
use super::grid::Grid;
use super::powerup::PowerUpKind;
use super::state::GameEvent;
use crate::audio::SoundEffect;
use crate::consts::{PLAYER_SPAWN, SNAP_THRESHOLD, TILE_SIZE};
use crate::tuning::Tuning;

/// Discrete input keys understood by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Pause,
    Detonate,
    PlaceBomb,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    InGame,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead { respawn_frames_remaining: u32 },
    GameOver,
}

/// Power-up flags lost on death
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub bomb_pass: bool,
    pub flame_pass: bool,
    pub wall_pass: bool,
    pub detonator_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub entity: Entity,
    pub lives: u32,
    pub caps: Capabilities,
    pub bombs_allowed: u32,
    /// Active bombs, oldest first
    pub bombs: Vec<Bomb>,
    /// Pixels per tick applied by directional keys
    pub speed: i32,
    pub invincible: bool,
    pub invincibility_frames_remaining: u32,
    pub life: LifeState,
    pub phase: GamePhase,
}

/// Round a pixel position to the tile origin a bomb should occupy.
///
/// Per axis: at least `SNAP_THRESHOLD` pixels into a tile rounds up to the
/// next tile, otherwise down to the current one.
pub fn snap_to_tile(pos: IVec2) -> IVec2 {
    let snap = |v: i32| {
        let into = v.rem_euclid(TILE_SIZE);
        if into >= SNAP_THRESHOLD {
            v - into + TILE_SIZE
        } else {
            v - into
        }
    };
    IVec2::new(snap(pos.x), snap(pos.y))
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            entity: Entity::new(SpriteId::Player, Self::spawn_point()),
            lives: tuning.initial_lives,
            caps: Capabilities::default(),
            bombs_allowed: tuning.initial_bombs,
            bombs: Vec::new(),
            speed: tuning.normal_speed,
            invincible: false,
            invincibility_frames_remaining: 0,
            life: LifeState::Alive,
            phase: GamePhase::InGame,
        }
    }

    pub fn spawn_point() -> IVec2 {
        IVec2::splat(PLAYER_SPAWN)
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn bounds(&self) -> Aabb {
        self.entity.bounds()
    }

    /// Whether a burning tile under the player kills it
    pub fn is_vulnerable_to_flame(&self) -> bool {
        self.is_alive() && !self.invincible && !self.caps.flame_pass
    }

    /// Whether touching a hostile kills the player
    pub fn is_vulnerable_to_hostiles(&self) -> bool {
        self.is_alive() && !self.invincible
    }

    /// Handle a key press. Ignored unless alive and in game.
    ///
    /// A directional key overwrites its axis, so the latest press wins.
    pub fn key_pressed(&mut self, key: Key, events: &mut Vec<GameEvent>) {
        if !self.is_alive() || self.phase != GamePhase::InGame {
            return;
        }
        match key {
            Key::Up => self.entity.vel.y = -self.speed,
            Key::Down => self.entity.vel.y = self.speed,
            Key::Left => self.entity.vel.x = -self.speed,
            Key::Right => self.entity.vel.x = self.speed,
            Key::Pause => {
                self.phase = GamePhase::Paused;
                events.push(GameEvent::Sound(SoundEffect::Pause));
                events.push(GameEvent::Paused);
            }
            Key::Detonate => {
                if self.caps.detonator_enabled && !self.bombs.is_empty() {
                    self.detonate_last_bomb(events);
                }
            }
            Key::PlaceBomb => {
                self.place_bomb(events);
            }
        }
    }

    /// Releasing either key of an axis stops that axis
    pub fn key_released(&mut self, key: Key) {
        if !self.is_alive() {
            return;
        }
        match key {
            Key::Left | Key::Right => self.entity.vel.x = 0,
            Key::Up | Key::Down => self.entity.vel.y = 0,
            Key::Pause | Key::Detonate | Key::PlaceBomb => {}
        }
    }

    /// Drop a bomb on the tile under the player.
    ///
    /// Silently rejected at the bomb cap or when an armed bomb already sits
    /// on that tile.
    pub fn place_bomb(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.bombs.len() >= self.bombs_allowed as usize {
            log::debug!("Bomb rejected: {} of {} placed", self.bombs.len(), self.bombs_allowed);
            return false;
        }
        let pos = snap_to_tile(self.entity.pos);
        if self.bombs.iter().any(|b| b.is_armed() && b.entity.pos == pos) {
            log::debug!("Bomb rejected: tile at {:?} occupied", pos);
            return false;
        }

        let bomb = Bomb::new(pos);
        events.push(GameEvent::BombPlaced { cell: bomb.cell() });
        self.bombs.push(bomb);
        true
    }

    /// Detonate the oldest bomb that is still armed
    pub fn detonate_last_bomb(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.caps.detonator_enabled {
            return false;
        }
        self.bombs
            .iter_mut()
            .find(|b| b.is_armed())
            .is_some_and(|bomb| bomb.explode(events))
    }

    /// Apply a pickup. Flag pickups are idempotent; counters stop at their caps.
    pub fn enable_power_up(&mut self, kind: PowerUpKind, grid: &mut Grid, tuning: &Tuning) {
        match kind {
            PowerUpKind::BombPass => self.caps.bomb_pass = true,
            PowerUpKind::ExtraBomb => self.increment_bombs_allowed(tuning),
            PowerUpKind::Detonator => self.caps.detonator_enabled = true,
            PowerUpKind::FlamePass => self.caps.flame_pass = true,
            PowerUpKind::ExtraFlame => {
                grid.increment_explosion_radius(tuning.max_radius);
            }
            PowerUpKind::Invincibility => {
                if !self.invincible {
                    self.invincible = true;
                    self.invincibility_frames_remaining = tuning.invincibility_frames;
                }
            }
            PowerUpKind::Speed => self.increment_speed(tuning),
            PowerUpKind::WallPass => self.caps.wall_pass = true,
        }
    }

    pub fn increment_bombs_allowed(&mut self, tuning: &Tuning) {
        if self.bombs_allowed < tuning.max_bombs {
            self.bombs_allowed += 1;
        }
    }

    /// Normal speed steps up to fast; fast is the ceiling
    pub fn increment_speed(&mut self, tuning: &Tuning) {
        if self.speed < tuning.fast_speed {
            self.speed = tuning.fast_speed;
        }
    }

    /// Lethal hit: lose capabilities, stop, hide and spend a life
    pub fn death(&mut self, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if !self.is_alive() {
            return;
        }
        self.caps = Capabilities::default();
        self.entity.visible = false;
        self.entity.vel = IVec2::ZERO;
        self.decrement_lives_remaining(tuning, events);
    }

    /// Spend a life, or end the game if none are left
    pub fn decrement_lives_remaining(&mut self, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if self.life == LifeState::GameOver {
            return;
        }
        if self.lives == 0 {
            self.life = LifeState::GameOver;
            self.phase = GamePhase::GameOver;
            self.entity.visible = false;
            events.push(GameEvent::Sound(SoundEffect::ThemeStop));
            events.push(GameEvent::Sound(SoundEffect::GameOver));
            events.push(GameEvent::GameOver);
            log::info!("Game over");
            return;
        }

        self.lives -= 1;
        self.life = LifeState::Dead {
            respawn_frames_remaining: tuning.respawn_frames,
        };
        events.push(GameEvent::Sound(SoundEffect::Death));
        events.push(GameEvent::PlayerDied {
            lives_remaining: self.lives,
        });
    }

    /// Count down a pending respawn. Returns true on the tick the player reappears.
    pub fn update_respawn(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let LifeState::Dead {
            respawn_frames_remaining,
        } = &mut self.life
        else {
            return false;
        };
        *respawn_frames_remaining = respawn_frames_remaining.saturating_sub(1);
        if *respawn_frames_remaining > 0 {
            return false;
        }

        self.life = LifeState::Alive;
        self.entity.visible = true;
        self.entity.vel = IVec2::ZERO;
        self.entity.teleport(Self::spawn_point());
        events.push(GameEvent::PlayerRespawned);
        true
    }

    pub fn update_invincibility(&mut self, events: &mut Vec<GameEvent>) {
        if !self.invincible {
            return;
        }
        self.invincibility_frames_remaining = self.invincibility_frames_remaining.saturating_sub(1);
        if self.invincibility_frames_remaining == 0 {
            self.invincible = false;
            events.push(GameEvent::InvincibilityEnded);
        }
    }

    fn is_blocked(&self, grid: &Grid, bounds: &Aabb) -> bool {
        collision::blocked_by_tiles(grid, bounds, self.caps.wall_pass)
            || (!self.caps.bomb_pass && self.bombs.iter().any(|b| b.is_solid_to(bounds)))
    }

    /// Apply velocity one axis at a time, reverting any axis that collides
    pub fn move_and_collide(&mut self, grid: &Grid) {
        self.entity.prev_pos = self.entity.pos;
        if !self.is_alive() {
            return;
        }

        let vel = self.entity.vel;
        for step in [IVec2::new(vel.x, 0), IVec2::new(0, vel.y)] {
            if step == IVec2::ZERO {
                continue;
            }
            let candidate = self.bounds().translated(step);
            if !self.is_blocked(grid, &candidate) {
                self.entity.pos += step;
            }
        }

        let bounds = self.bounds();
        for bomb in &mut self.bombs {
            bomb.release_if_clear(&bounds);
        }
    }

    /// Back to spawn with no bombs on the field
    pub fn next_stage(&mut self) {
        self.entity.teleport(Self::spawn_point());
        self.bombs.clear();
    }
}
