//! Seeded stage layouts
//!
//! Border and pillar walls are fixed; destructibles, the hidden door and the
//! hidden pickups come from a `Pcg32` seeded by (run seed, stage), so a seed
//! always reproduces the same run.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::{Cell, Grid, Tile, TileKind};
use super::powerup::PowerUpKind;
use crate::tuning::Tuning;

pub const STAGE_WIDTH: usize = 31;
pub const STAGE_HEIGHT: usize = 13;

/// Pickup hidden on each stage, indexed by stage number and cycling
pub const DROP_TABLE: [PowerUpKind; 10] = [
    PowerUpKind::ExtraFlame,
    PowerUpKind::ExtraBomb,
    PowerUpKind::Detonator,
    PowerUpKind::Speed,
    PowerUpKind::BombPass,
    PowerUpKind::WallPass,
    PowerUpKind::FlamePass,
    PowerUpKind::ExtraBomb,
    PowerUpKind::Invincibility,
    PowerUpKind::ExtraFlame,
];

/// Tiles next to the spawn point that never get a destructible
const SPAWN_CLEAR: [Cell; 3] = [Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 1)];

pub fn stage_seed(seed: u64, stage: u32) -> u64 {
    seed ^ u64::from(stage).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Pickups for a 1-based stage: the stage's table entry first, then the
/// following entries
pub fn drops_for_stage(stage: u32, count: u32) -> impl Iterator<Item = PowerUpKind> {
    let start = stage.saturating_sub(1) as usize;
    (0..count as usize).map(move |i| DROP_TABLE[(start + i) % DROP_TABLE.len()])
}

fn is_pillar(col: usize, row: usize) -> bool {
    col.is_multiple_of(2) && row.is_multiple_of(2)
}

/// Build the layout for a 1-based stage number
pub fn generate_stage(stage: u32, seed: u64, tuning: &Tuning) -> Grid {
    let mut rng = Pcg32::seed_from_u64(stage_seed(seed, stage));
    let density = tuning.destructible_density.clamp(0.0, 1.0);

    let mut grid = Grid::filled(STAGE_WIDTH, STAGE_HEIGHT);
    let mut open = Vec::new();
    for row in 0..STAGE_HEIGHT {
        for col in 0..STAGE_WIDTH {
            let cell = Cell::new(col as i32, row as i32);
            let border = row == 0 || col == 0 || row == STAGE_HEIGHT - 1 || col == STAGE_WIDTH - 1;
            if border || is_pillar(col, row) {
                grid.set_tile(cell, Tile::WALL);
            } else if !SPAWN_CLEAR.contains(&cell) {
                open.push(cell);
            }
        }
    }

    let mut destructibles: Vec<Cell> = open
        .into_iter()
        .filter(|_| rng.random_bool(density))
        .collect();
    // Always leave somewhere to hide the door
    if destructibles.is_empty() {
        destructibles.push(Cell::new(3, 1));
    }
    for &cell in &destructibles {
        grid.set_tile(cell, Tile::DESTRUCTIBLE);
    }

    destructibles.shuffle(&mut rng);
    let mut hiding_spots = destructibles.into_iter();
    if let Some(door) = hiding_spots.next() {
        grid.set_tile(door, Tile::hiding_door());
    }
    for (cell, kind) in hiding_spots.zip(drops_for_stage(stage, tuning.power_ups_per_stage)) {
        grid.set_tile(cell, Tile::hiding(kind));
    }

    log::debug!(
        "Generated stage {}: {} destructibles",
        stage,
        grid.count(TileKind::Destructible)
    );
    grid
}
