//! Tile grid and active flame cells
//!
//! The grid is a fixed-size tile array plus a sparse map of burning cells,
//! each with its remaining lifetime in ticks. Out-of-bounds reads are
//! treated as Wall by every caller.

use std::collections::BTreeMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::powerup::PowerUpKind;
use crate::consts::{INITIAL_RADIUS, TILE_SIZE};

/// Tile coordinate (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The tile containing a pixel
    pub fn containing(pos: IVec2) -> Self {
        Self::new(pos.x.div_euclid(TILE_SIZE), pos.y.div_euclid(TILE_SIZE))
    }

    /// Top-left pixel of the tile
    pub fn origin(self) -> IVec2 {
        IVec2::new(self.col * TILE_SIZE, self.row * TILE_SIZE)
    }

    pub fn offset(self, dir: Direction, steps: i32) -> Self {
        let delta = dir.delta() * steps;
        Self::new(self.col + delta.x, self.row + delta.y)
    }

    /// Cardinal distance along a shared row or column, None if unaligned
    pub fn cardinal_distance(self, other: Cell) -> Option<i32> {
        if self.col == other.col {
            Some((self.row - other.row).abs())
        } else if self.row == other.row {
            Some((self.col - other.col).abs())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Destructible,
    Floor,
    Door,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Pickup revealed when this tile is destroyed
    pub power_up: Option<PowerUpKind>,
    /// Destroying this tile uncovers the stage door
    #[serde(default)]
    pub door_beneath: bool,
}

impl Tile {
    pub const WALL: Tile = Tile::of(TileKind::Wall);
    pub const FLOOR: Tile = Tile::of(TileKind::Floor);
    pub const DESTRUCTIBLE: Tile = Tile::of(TileKind::Destructible);
    pub const DOOR: Tile = Tile::of(TileKind::Door);

    pub const fn of(kind: TileKind) -> Self {
        Self {
            kind,
            power_up: None,
            door_beneath: false,
        }
    }

    pub fn hiding(power_up: PowerUpKind) -> Self {
        Self {
            power_up: Some(power_up),
            ..Self::DESTRUCTIBLE
        }
    }

    pub fn hiding_door() -> Self {
        Self {
            door_beneath: true,
            ..Self::DESTRUCTIBLE
        }
    }
}

/// Everything a single ignition changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ignition {
    /// Cells that received flame, origin first
    pub burned: Vec<Cell>,
    /// Destructible tiles converted to floor or door
    pub destroyed: Vec<Cell>,
    /// Pickups uncovered by destroyed tiles
    pub revealed: Vec<(Cell, PowerUpKind)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    /// Burning tiles keyed by tile index, value is ticks remaining
    flames: BTreeMap<usize, u32>,
    /// Blast radius of the player's bombs on this grid
    explosion_radius: u32,
}

impl Grid {
    pub fn new(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        assert_eq!(tiles.len(), width * height, "tile count must match dimensions");
        Self {
            width,
            height,
            tiles,
            flames: BTreeMap::new(),
            explosion_radius: INITIAL_RADIUS,
        }
    }

    /// An open grid of floor tiles
    pub fn filled(width: usize, height: usize) -> Self {
        Self::new(width, height, vec![Tile::FLOOR; width * height])
    }

    /// Build a grid from a text fixture, one row per line.
    ///
    /// `#` wall, `*` destructible, `.` floor, `D` door, `+` destructible over
    /// the door. Lowercase letters are destructibles hiding a pickup:
    /// `p` bomb pass, `b` extra bomb, `x` detonator, `q` flame pass,
    /// `f` extra flame, `i` invincibility, `s` speed, `w` wall pass.
    pub fn from_ascii(text: &str) -> Self {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

        let mut tiles = Vec::with_capacity(width * height);
        for row in &rows {
            let mut chars = row.chars();
            for _ in 0..width {
                let tile = match chars.next() {
                    Some('#') => Tile::WALL,
                    Some('*') => Tile::DESTRUCTIBLE,
                    Some('D') => Tile::DOOR,
                    Some('+') => Tile::hiding_door(),
                    Some('p') => Tile::hiding(PowerUpKind::BombPass),
                    Some('b') => Tile::hiding(PowerUpKind::ExtraBomb),
                    Some('x') => Tile::hiding(PowerUpKind::Detonator),
                    Some('q') => Tile::hiding(PowerUpKind::FlamePass),
                    Some('f') => Tile::hiding(PowerUpKind::ExtraFlame),
                    Some('i') => Tile::hiding(PowerUpKind::Invincibility),
                    Some('s') => Tile::hiding(PowerUpKind::Speed),
                    Some('w') => Tile::hiding(PowerUpKind::WallPass),
                    _ => Tile::FLOOR,
                };
                tiles.push(tile);
            }
        }
        Self::new(width, height, tiles)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let col = usize::try_from(cell.col).ok()?;
        let row = usize::try_from(cell.row).ok()?;
        (col < self.width && row < self.height).then(|| row * self.width + col)
    }

    fn cell_at_index(&self, index: usize) -> Cell {
        Cell::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        self.index(cell).map_or(Tile::WALL, |i| self.tiles[i])
    }

    pub fn tile_at(&self, cell: Cell) -> TileKind {
        self.tile(cell).kind
    }

    /// Overwrite a tile. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, cell: Cell, tile: Tile) {
        if let Some(i) = self.index(cell) {
            self.tiles[i] = tile;
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (Cell, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, &tile)| (self.cell_at_index(i), tile))
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    pub fn explosion_radius(&self) -> u32 {
        self.explosion_radius
    }

    pub fn set_explosion_radius(&mut self, radius: u32) {
        self.explosion_radius = radius.max(1);
    }

    /// Grow the blast radius by one, up to `cap`. Returns whether it grew.
    pub fn increment_explosion_radius(&mut self, cap: u32) -> bool {
        if self.explosion_radius < cap {
            self.explosion_radius += 1;
            true
        } else {
            false
        }
    }

    pub fn has_flame(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.flames.contains_key(&i))
    }

    pub fn flame_at(&self, cell: Cell) -> Option<u32> {
        self.index(cell).and_then(|i| self.flames.get(&i).copied())
    }

    /// Burning cells with their remaining lifetime, row-major
    pub fn flame_cells(&self) -> impl Iterator<Item = (Cell, u32)> + '_ {
        self.flames
            .iter()
            .map(|(&i, &ticks)| (self.cell_at_index(i), ticks))
    }

    pub fn clear_flames(&mut self) {
        self.flames.clear();
    }

    fn set_flame(&mut self, cell: Cell, ticks: u32, ignition: &mut Ignition) {
        let Some(i) = self.index(cell) else { return };
        if ticks == 0 {
            return;
        }
        let entry = self.flames.entry(i).or_insert(0);
        *entry = (*entry).max(ticks);
        ignition.burned.push(cell);
    }

    fn destroy(&mut self, cell: Cell, ignition: &mut Ignition) {
        let Some(i) = self.index(cell) else { return };
        let tile = self.tiles[i];
        self.tiles[i] = if tile.door_beneath {
            Tile::DOOR
        } else {
            Tile::FLOOR
        };
        ignition.destroyed.push(cell);
        if let Some(kind) = tile.power_up {
            ignition.revealed.push((cell, kind));
        }
    }

    /// Spread flame from a detonated bomb in a "+" shape.
    ///
    /// The origin always burns. Each cardinal ray walks up to `radius` cells,
    /// stops before the first wall, and stops on (after burning and
    /// destroying) the first destructible.
    pub fn ignite_from_bomb(&mut self, origin: Cell, radius: u32, flame_ticks: u32) -> Ignition {
        self.ignite_from_bombs(&[origin], radius, flame_ticks)
    }

    /// Ignite every bomb that goes off on the same tick.
    ///
    /// All rays are walked against the tiles as they stood before the first
    /// blast, so a destructible cleared by one bomb still stops another.
    pub fn ignite_from_bombs(&mut self, origins: &[Cell], radius: u32, flame_ticks: u32) -> Ignition {
        let mut burning = Vec::new();
        let mut struck = Vec::new();
        for &origin in origins {
            self.blast_shape(origin, radius, &mut burning, &mut struck);
        }

        let mut ignition = Ignition::default();
        for cell in burning {
            self.set_flame(cell, flame_ticks, &mut ignition);
        }
        for cell in struck {
            // Two rays may end on the same tile
            if self.tile_at(cell) == TileKind::Destructible {
                self.destroy(cell, &mut ignition);
            }
        }
        ignition
    }

    /// Cells one blast reaches, without touching the grid
    fn blast_shape(&self, origin: Cell, radius: u32, burning: &mut Vec<Cell>, struck: &mut Vec<Cell>) {
        burning.push(origin);
        let reach = i32::try_from(radius).unwrap_or(i32::MAX);
        for dir in Direction::ALL {
            for step in 1..=reach {
                let cell = origin.offset(dir, step);
                match self.tile_at(cell) {
                    TileKind::Wall => break,
                    TileKind::Destructible => {
                        burning.push(cell);
                        struck.push(cell);
                        break;
                    }
                    TileKind::Floor | TileKind::Door => burning.push(cell),
                }
            }
        }
    }

    /// Age every flame by one tick, dropping the ones that burn out
    pub fn tick_flames(&mut self) {
        self.flames.retain(|_, ticks| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });
    }
}
