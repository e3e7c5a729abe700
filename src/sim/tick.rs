//! Fixed timestep simulation tick
//!
//! One call advances the game by exactly one frame. Stages run in a fixed
//! order: input, movement, bombs, flames, hazards, pickups, door.

use serde::{Deserialize, Serialize};

use super::bomb::Bomb;
use super::collision;
use super::grid::{Cell, TileKind};
use super::hostiles::Hostiles;
use super::player::{GamePhase, Key};
use super::powerup::PowerUp;
use super::state::{GameEvent, GameState};
use crate::audio::SoundEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// Input events collected since the previous tick, in arrival order
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: Vec<KeyEvent>,
}

impl TickInput {
    pub fn press(key: Key) -> Self {
        Self {
            keys: vec![KeyEvent::Down(key)],
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            keys: vec![KeyEvent::Up(key)],
        }
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, hostiles: &mut dyn Hostiles) {
    for event in &input.keys {
        match *event {
            KeyEvent::Down(key) => state.player.key_pressed(key, &mut state.events),
            KeyEvent::Up(key) => state.player.key_released(key),
        }
    }

    // Paused frames are skipped whole; game over is frozen
    if state.phase() != GamePhase::InGame {
        return;
    }
    state.time_ticks += 1;

    state.player.update_respawn(&mut state.events);
    state.player.update_invincibility(&mut state.events);
    state.player.move_and_collide(&state.grid);

    update_bombs(state);

    state.grid.tick_flames();
    state.score += hostiles.burn(&state.grid);

    resolve_hazards(state, &*hostiles);
    collect_power_ups(state);
    check_door(state, &*hostiles);
}

/// Run fuses, then turn every exploded bomb into flame and drop it.
///
/// Bombs going off on the same tick ignite together. Bombs inside a blast
/// are not set off by it.
fn update_bombs(state: &mut GameState) {
    let fuse_limit = state.tuning.fuse_frames;
    let flame_ticks = state.tuning.flame_frames;
    let GameState {
        player,
        grid,
        power_ups,
        events,
        ..
    } = state;

    for bomb in &mut player.bombs {
        bomb.tick(fuse_limit, events);
    }

    let origins: Vec<Cell> = player
        .bombs
        .iter()
        .filter(|b| !b.is_armed())
        .map(Bomb::cell)
        .collect();
    if origins.is_empty() {
        return;
    }
    for &cell in &origins {
        events.push(GameEvent::BombExploded { cell });
    }

    let radius = grid.explosion_radius();
    let ignition = grid.ignite_from_bombs(&origins, radius, flame_ticks);
    for &cell in &ignition.destroyed {
        events.push(GameEvent::TileDestroyed { cell });
    }
    for &(cell, kind) in &ignition.revealed {
        events.push(GameEvent::PowerUpRevealed { cell, kind });
        power_ups.push(PowerUp::new(kind, cell.origin()));
    }
    player.bombs.retain(Bomb::is_armed);
}

fn resolve_hazards(state: &mut GameState, hostiles: &dyn Hostiles) {
    let player = &state.player;
    let bounds = player.bounds();
    let burned = player.is_vulnerable_to_flame() && collision::touches_flame(&state.grid, &bounds);
    let caught = player.is_vulnerable_to_hostiles() && hostiles.touches(&bounds);
    if burned || caught {
        log::debug!(
            "Player hit at {:?} ({})",
            player.entity.pos,
            if burned { "flame" } else { "hostile" }
        );
        state.player.death(&state.tuning, &mut state.events);
    }
}

fn collect_power_ups(state: &mut GameState) {
    if !state.player.is_alive() {
        return;
    }
    let GameState {
        player,
        grid,
        power_ups,
        tuning,
        events,
        ..
    } = state;

    let bounds = player.bounds();
    power_ups.retain(|power_up| {
        if !power_up.entity.bounds().intersects(&bounds) {
            return true;
        }
        player.enable_power_up(power_up.kind, grid, tuning);
        events.push(GameEvent::Sound(SoundEffect::PowerUpCollect));
        events.push(GameEvent::PowerUpCollected {
            kind: power_up.kind,
        });
        false
    });
}

/// Standing on the door with every hostile gone clears the stage
fn check_door(state: &mut GameState, hostiles: &dyn Hostiles) {
    if !state.player.is_alive() || !hostiles.all_cleared() {
        return;
    }
    if state.grid.tile_at(state.player.entity.cell()) != TileKind::Door {
        return;
    }

    let cleared = state.stage;
    state.score += state.tuning.stage_clear_bonus;
    state.events.push(GameEvent::Sound(SoundEffect::StageClear));
    state.events.push(GameEvent::StageCleared { stage: cleared });
    log::info!("Stage {} cleared, score {}", cleared, state.score);
    state.next_stage();
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;
    use crate::sim::grid::{Cell, Grid};
    use crate::sim::hostiles::NoHostiles;
    use crate::sim::hostiles::tests::StaticHostiles;
    use crate::sim::player::LifeState;
    use crate::sim::powerup::PowerUpKind;
    use crate::tuning::Tuning;

    const SMALL_ROOM: &str = "\
        #####\n\
        #.f.#\n\
        #...#\n\
        #####";

    fn room(layout: &str) -> GameState {
        GameState::with_grid(Grid::from_ascii(layout), Tuning::default())
    }

    fn idle(state: &mut GameState, ticks: u32) {
        for _ in 0..ticks {
            tick(state, &TickInput::default(), &mut NoHostiles);
        }
    }

    #[test]
    fn test_bomb_ignites_on_tick_91() {
        let mut state = room(SMALL_ROOM);
        state.player.caps.flame_pass = true;

        tick(&mut state, &TickInput::press(Key::PlaceBomb), &mut NoHostiles);
        idle(&mut state, 89);
        assert_eq!(state.player.bombs.len(), 1);
        assert_eq!(state.grid.flame_cells().count(), 0);

        idle(&mut state, 1);
        assert!(state.player.bombs.is_empty());
        let mut burning: Vec<Cell> = state.grid.flame_cells().map(|(c, _)| c).collect();
        burning.sort();
        assert_eq!(burning, vec![Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 1)]);

        // Destructible gone, its pickup on the field
        assert_eq!(state.grid.tile_at(Cell::new(2, 1)), TileKind::Floor);
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.power_ups[0].kind, PowerUpKind::ExtraFlame);
        assert_eq!(state.power_ups[0].entity.pos, IVec2::new(60, 30));

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::BombExploded {
            cell: Cell::new(1, 1)
        }));
        assert!(events.contains(&GameEvent::Sound(SoundEffect::BombExplode)));
        assert!(state.player.is_alive());

        // One lethal window, then the flames are gone
        idle(&mut state, 1);
        assert_eq!(state.grid.flame_cells().count(), 0);
    }

    #[test]
    fn test_bombs_exploding_together_share_the_old_tiles() {
        let mut state = room(
            "#######\n\
             #.....#\n\
             #..*..#\n\
             #######",
        );
        state.player.caps.flame_pass = true;
        state.grid.set_explosion_radius(3);
        for cell in [Cell::new(3, 1), Cell::new(5, 2)] {
            let mut bomb = Bomb::new(cell.origin());
            bomb.fuse_frames = state.tuning.fuse_frames;
            state.player.bombs.push(bomb);
        }

        idle(&mut state, 1);
        assert!(state.player.bombs.is_empty());
        assert_eq!(state.grid.tile_at(Cell::new(3, 2)), TileKind::Floor);
        assert!(state.grid.has_flame(Cell::new(4, 2)));
        assert!(!state.grid.has_flame(Cell::new(2, 2)));

        let events = state.drain_events();
        let exploded = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BombExploded { .. }))
            .count();
        let destroyed: Vec<&GameEvent> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::TileDestroyed { .. }))
            .collect();
        assert_eq!(exploded, 2);
        assert_eq!(destroyed, vec![&GameEvent::TileDestroyed {
            cell: Cell::new(3, 2)
        }]);
    }

    #[test]
    fn test_own_bomb_kills_then_respawn() {
        let mut state = room(SMALL_ROOM);
        tick(&mut state, &TickInput::press(Key::PlaceBomb), &mut NoHostiles);
        idle(&mut state, 90);

        assert!(matches!(state.player.life, LifeState::Dead { .. }));
        assert_eq!(state.player.lives, 2);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Sound(SoundEffect::Death))
        );

        idle(&mut state, 59);
        assert!(!state.player.is_alive());
        idle(&mut state, 1);
        assert!(state.player.is_alive());
        assert_eq!(state.player.entity.pos, IVec2::splat(32));
    }

    #[test]
    fn test_invincible_player_survives_flame() {
        let mut state = room(SMALL_ROOM);
        let tuning = state.tuning.clone();
        state
            .player
            .enable_power_up(PowerUpKind::Invincibility, &mut state.grid, &tuning);
        tick(&mut state, &TickInput::press(Key::PlaceBomb), &mut NoHostiles);
        idle(&mut state, 91);
        assert!(state.player.is_alive());
        assert_eq!(state.player.lives, 3);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut state = room(SMALL_ROOM);
        state.player.lives = 0;
        tick(&mut state, &TickInput::press(Key::PlaceBomb), &mut NoHostiles);
        idle(&mut state, 90);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert!(state.is_over());

        let frozen_at = state.time_ticks;
        idle(&mut state, 100);
        tick(&mut state, &TickInput::press(Key::Right), &mut NoHostiles);
        assert_eq!(state.time_ticks, frozen_at);
        assert_eq!(state.player.life, LifeState::GameOver);
    }

    #[test]
    fn test_pause_skips_ticks_but_applies_releases() {
        let mut state = room(SMALL_ROOM);
        tick(&mut state, &TickInput::press(Key::PlaceBomb), &mut NoHostiles);
        let input = TickInput {
            keys: vec![KeyEvent::Down(Key::Down), KeyEvent::Down(Key::Pause)],
        };
        tick(&mut state, &input, &mut NoHostiles);
        assert_eq!(state.phase(), GamePhase::Paused);
        assert_eq!(state.player.entity.vel.y, 2);

        tick(&mut state, &TickInput::release(Key::Down), &mut NoHostiles);
        idle(&mut state, 200);
        assert_eq!(state.player.bombs[0].fuse_frames, 1);
        assert_eq!(state.player.entity.vel, IVec2::ZERO);
        assert_eq!(state.player.entity.pos, IVec2::splat(32));

        assert!(state.resume());
        idle(&mut state, 1);
        assert_eq!(state.player.bombs[0].fuse_frames, 2);
    }

    #[test]
    fn test_walking_into_power_up_collects_it() {
        let mut state = room("#####\n#...#\n#####");
        state
            .power_ups
            .push(PowerUp::new(PowerUpKind::Speed, IVec2::new(60, 30)));

        tick(&mut state, &TickInput::press(Key::Right), &mut NoHostiles);
        idle(&mut state, 4);
        assert!(state.power_ups.is_empty());
        assert_eq!(state.player.speed, state.tuning.fast_speed);
        assert!(state.drain_events().contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::Speed
        }));
    }

    #[test]
    fn test_door_clears_stage() {
        let mut state = room("#####\n#.D.#\n#####");
        tick(&mut state, &TickInput::press(Key::Right), &mut NoHostiles);
        for _ in 0..20 {
            if state.stage == 2 {
                break;
            }
            idle(&mut state, 1);
        }
        assert_eq!(state.stage, 2);
        assert_eq!(state.score, 1000);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::StageCleared { stage: 1 })
        );
        assert_eq!(state.player.entity.pos, IVec2::splat(32));
    }

    #[test]
    fn test_door_stays_shut_while_hostiles_remain() {
        let mut state = room("#######\n#.D...#\n#######");
        let mut hostiles = StaticHostiles::at(&[IVec2::new(150, 30)], 100);
        tick(&mut state, &TickInput::press(Key::Right), &mut hostiles);
        for _ in 0..12 {
            tick(&mut state, &TickInput::default(), &mut hostiles);
        }
        assert_eq!(state.stage, 1);
        assert_eq!(state.grid.tile_at(state.player.entity.cell()), TileKind::Door);
    }

    #[test]
    fn test_hostile_contact_kills() {
        let mut state = room("#####\n#...#\n#####");
        let mut hostiles = StaticHostiles::at(&[IVec2::new(60, 30)], 100);
        tick(&mut state, &TickInput::press(Key::Right), &mut hostiles);
        for _ in 0..4 {
            tick(&mut state, &TickInput::default(), &mut hostiles);
        }
        assert_eq!(state.player.lives, 2);
        assert!(!state.player.is_alive());
    }

    #[test]
    fn test_burned_hostiles_score() {
        let mut state = room("#######\n#.....#\n#######");
        let mut hostiles = StaticHostiles::at(&[IVec2::new(90, 30)], 100);
        state.player.caps.flame_pass = true;
        state.grid.set_explosion_radius(3);
        tick(&mut state, &TickInput::press(Key::PlaceBomb), &mut hostiles);
        for _ in 0..90 {
            tick(&mut state, &TickInput::default(), &mut hostiles);
        }
        assert_eq!(state.score, 100);
        assert!(hostiles.all_cleared());
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());

        let inputs = [
            TickInput::press(Key::Right),
            TickInput::press(Key::PlaceBomb),
            TickInput::release(Key::Right),
            TickInput::press(Key::Down),
            TickInput::default(),
        ];

        for _ in 0..30 {
            for input in &inputs {
                tick(&mut state1, input, &mut NoHostiles);
                tick(&mut state2, input, &mut NoHostiles);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(
            serde_json::to_string(&state1).unwrap(),
            serde_json::to_string(&state2).unwrap()
        );
    }
}
