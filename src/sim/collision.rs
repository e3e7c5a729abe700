//! Axis-aligned collision queries against entities and the tile grid
//!
//! All geometry is integer pixel space. Boxes are half-open: a box at x=0
//! with width 30 covers pixels 0..30 and does not touch a box starting at 30.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid, TileKind};

/// Axis-aligned bounding box in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: IVec2,
    pub size: IVec2,
}

impl Aabb {
    pub fn new(min: IVec2, size: IVec2) -> Self {
        Self { min, size }
    }

    /// The box covering a whole tile
    pub fn from_cell(cell: Cell) -> Self {
        Self::new(cell.origin(), IVec2::splat(crate::consts::TILE_SIZE))
    }

    /// Exclusive far corner
    pub fn max(&self) -> IVec2 {
        self.min + self.size
    }

    pub fn center(&self) -> IVec2 {
        self.min + self.size / 2
    }

    pub fn translated(&self, delta: IVec2) -> Self {
        Self::new(self.min + delta, self.size)
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && other.min.x < a_max.x && self.min.y < b_max.y && other.min.y < a_max.y
    }

    /// Every tile the box overlaps, row-major
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let first = Cell::containing(self.min);
        let last = Cell::containing(self.max() - IVec2::ONE);
        (first.row..=last.row)
            .flat_map(move |row| (first.col..=last.col).map(move |col| Cell::new(col, row)))
    }
}

/// Whether the tiles under `bounds` stop a mover.
///
/// Walls block unless `wall_pass` is set; destructibles always block. Anything
/// outside the grid blocks regardless of capabilities.
pub fn blocked_by_tiles(grid: &Grid, bounds: &Aabb, wall_pass: bool) -> bool {
    bounds.cells().any(|cell| {
        if !grid.in_bounds(cell) {
            return true;
        }
        match grid.tile_at(cell) {
            TileKind::Wall => !wall_pass,
            TileKind::Destructible => true,
            TileKind::Floor | TileKind::Door => false,
        }
    })
}

/// Whether any burning tile overlaps `bounds`
pub fn touches_flame(grid: &Grid, bounds: &Aabb) -> bool {
    bounds.cells().any(|cell| grid.has_flame(cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Aabb::new(IVec2::new(0, 0), IVec2::splat(30));
        let b = Aabb::new(IVec2::new(30, 0), IVec2::splat(30));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&b.translated(IVec2::new(-1, 0))));
    }

    #[test]
    fn test_cells_covered() {
        let bounds = Aabb::new(IVec2::new(32, 32), IVec2::splat(26));
        let cells: Vec<_> = bounds.cells().collect();
        assert_eq!(cells, vec![Cell::new(1, 1)]);

        let straddling = bounds.translated(IVec2::new(10, 0));
        let cells: Vec<_> = straddling.cells().collect();
        assert_eq!(cells, vec![Cell::new(1, 1), Cell::new(2, 1)]);
    }

    #[test]
    fn test_walls_block_unless_wall_pass() {
        let grid = Grid::from_ascii(
            "###\n\
             #.#\n\
             ###",
        );
        let inside = Aabb::from_cell(Cell::new(1, 1));
        assert!(!blocked_by_tiles(&grid, &inside, false));

        let into_wall = inside.translated(IVec2::new(2, 0));
        assert!(blocked_by_tiles(&grid, &into_wall, false));
        assert!(!blocked_by_tiles(&grid, &into_wall, true));
    }

    #[test]
    fn test_destructible_and_out_of_bounds_always_block() {
        let grid = Grid::from_ascii(".*");
        let on_destructible = Aabb::from_cell(Cell::new(1, 0));
        assert!(blocked_by_tiles(&grid, &on_destructible, true));

        let off_grid = Aabb::from_cell(Cell::new(-1, 0));
        assert!(blocked_by_tiles(&grid, &off_grid, true));
    }
}
