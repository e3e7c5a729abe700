//! Game state and core simulation types
//!
//! Everything needed to continue a run lives in `GameState` and round-trips
//! through serde. The per-tick event buffer is transient.

use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};
use super::player::{GamePhase, Player};
use super::powerup::{PowerUp, PowerUpKind};
use super::stage::generate_stage;
use crate::audio::SoundEffect;
use crate::tuning::Tuning;

/// Things that happened during a tick, in the order they happened.
///
/// The session forwards `Sound` cues to audio; the rest is for hosts that
/// want to react (HUD, logs, tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    BombPlaced { cell: Cell },
    BombExploded { cell: Cell },
    TileDestroyed { cell: Cell },
    PowerUpRevealed { cell: Cell, kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    PlayerDied { lives_remaining: u32 },
    PlayerRespawned,
    InvincibilityEnded,
    GameOver,
    Paused,
    Resumed,
    StageCleared { stage: u32 },
}

/// Where stage layouts come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LevelPlan {
    /// Seeded layouts from [`generate_stage`]
    Generated,
    /// Pre-built layouts, one per stage, cycling when exhausted
    Fixed(Vec<Grid>),
}

impl LevelPlan {
    /// Layout for a 1-based stage number
    pub fn grid_for(&self, stage: u32, seed: u64, tuning: &Tuning) -> Grid {
        match self {
            LevelPlan::Fixed(layouts) if !layouts.is_empty() => {
                let index = (stage.saturating_sub(1) as usize) % layouts.len();
                let mut grid = layouts[index].clone();
                grid.clear_flames();
                grid
            }
            _ => generate_stage(stage, seed, tuning),
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducible stage layouts
    pub seed: u64,
    /// Current stage, 1-based
    pub stage: u32,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub tuning: Tuning,
    pub plan: LevelPlan,
    pub grid: Grid,
    pub player: Player,
    /// Revealed pickups, in reveal order
    pub power_ups: Vec<PowerUp>,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a run on generated stages
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_plan(LevelPlan::Generated, seed, 1, tuning)
    }

    /// Start a run on a single hand-built layout
    pub fn with_grid(grid: Grid, tuning: Tuning) -> Self {
        Self::with_plan(LevelPlan::Fixed(vec![grid]), 0, 1, tuning)
    }

    pub fn with_plan(plan: LevelPlan, seed: u64, stage: u32, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let stage = stage.max(1);
        let mut grid = plan.grid_for(stage, seed, &tuning);
        grid.set_explosion_radius(tuning.initial_radius);
        Self {
            seed,
            stage,
            score: 0,
            time_ticks: 0,
            player: Player::new(&tuning),
            tuning,
            plan,
            grid,
            power_ups: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.player.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase() == GamePhase::GameOver
    }

    /// Leave the pause menu. Returns false if the game was not paused.
    pub fn resume(&mut self) -> bool {
        if self.player.phase != GamePhase::Paused {
            return false;
        }
        self.player.phase = GamePhase::InGame;
        self.events.push(GameEvent::Resumed);
        true
    }

    /// Advance to the next layout: player back at spawn, no bombs or
    /// pickups on the field. The blast radius carries over.
    pub fn next_stage(&mut self) {
        let radius = self.grid.explosion_radius();
        self.stage += 1;
        self.grid = self.plan.grid_for(self.stage, self.seed, &self.tuning);
        self.grid.set_explosion_radius(radius);
        self.player.next_stage();
        self.power_ups.clear();
        log::info!("Entering stage {}", self.stage);
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::powerup::PowerUpKind;

    #[test]
    fn test_new_state() {
        let state = GameState::new(7, Tuning::default());
        assert_eq!(state.stage, 1);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.phase(), GamePhase::InGame);
        assert_eq!(state.grid.explosion_radius(), 1);
    }

    #[test]
    fn test_next_stage_resets_field_and_keeps_radius() {
        let mut state = GameState::new(7, Tuning::default());
        let tuning = state.tuning.clone();
        state.player.enable_power_up(PowerUpKind::ExtraFlame, &mut state.grid, &tuning);
        state.player.entity.teleport(glam::IVec2::new(90, 90));
        state.player.place_bomb(&mut state.events);
        state
            .power_ups
            .push(PowerUp::new(PowerUpKind::Speed, glam::IVec2::new(120, 30)));

        state.next_stage();
        assert_eq!(state.stage, 2);
        assert_eq!(state.grid.explosion_radius(), 2);
        assert!(state.player.bombs.is_empty());
        assert!(state.power_ups.is_empty());
        assert_eq!(state.player.entity.pos, Player::spawn_point());
    }

    #[test]
    fn test_fixed_plan_cycles() {
        let a = Grid::from_ascii("###\n#.#\n###");
        let b = Grid::from_ascii("####\n#..#\n####");
        let plan = LevelPlan::Fixed(vec![a, b]);
        let tuning = Tuning::default();
        assert_eq!(plan.grid_for(1, 0, &tuning).width(), 3);
        assert_eq!(plan.grid_for(2, 0, &tuning).width(), 4);
        assert_eq!(plan.grid_for(3, 0, &tuning).width(), 3);
    }

    #[test]
    fn test_resume_only_from_pause() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(!state.resume());
        state.player.phase = GamePhase::Paused;
        assert!(state.resume());
        assert_eq!(state.phase(), GamePhase::InGame);
        assert_eq!(state.drain_events(), vec![GameEvent::Resumed]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_state_round_trips_without_events() {
        let mut state = GameState::new(3, Tuning::default());
        state.events.push(GameEvent::Paused);
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert!(restored.events.is_empty());
        assert_eq!(restored.grid.width(), state.grid.width());
        assert_eq!(restored.player.entity.pos, state.player.entity.pos);
    }
}
