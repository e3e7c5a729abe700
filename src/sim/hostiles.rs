//! Contract between the core and whatever enemies a host adds
//!
//! Enemies themselves are not simulated here. The tick asks the host three
//! questions each frame and applies the answers.

use super::collision::Aabb;
use super::grid::Grid;

pub trait Hostiles {
    /// Whether any hostile overlaps `bounds`
    fn touches(&self, bounds: &Aabb) -> bool;

    /// Kill hostiles standing in flame. Returns points earned.
    fn burn(&mut self, grid: &Grid) -> u64;

    /// Whether the door may open
    fn all_cleared(&self) -> bool;
}

/// A stage without enemies: harmless and always cleared
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHostiles;

impl Hostiles for NoHostiles {
    fn touches(&self, _bounds: &Aabb) -> bool {
        false
    }

    fn burn(&mut self, _grid: &Grid) -> u64 {
        0
    }

    fn all_cleared(&self) -> bool {
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use glam::IVec2;

    use super::*;
    use crate::sim::collision;

    /// Stationary one-tile hostiles worth a fixed score each
    #[derive(Debug, Default)]
    pub(crate) struct StaticHostiles {
        pub boxes: Vec<Aabb>,
        pub points: u64,
    }

    impl StaticHostiles {
        pub fn at(positions: &[IVec2], points: u64) -> Self {
            Self {
                boxes: positions
                    .iter()
                    .map(|&p| Aabb::new(p, IVec2::splat(crate::consts::TILE_SIZE)))
                    .collect(),
                points,
            }
        }
    }

    impl Hostiles for StaticHostiles {
        fn touches(&self, bounds: &Aabb) -> bool {
            self.boxes.iter().any(|b| b.intersects(bounds))
        }

        fn burn(&mut self, grid: &Grid) -> u64 {
            let before = self.boxes.len();
            self.boxes.retain(|b| !collision::touches_flame(grid, b));
            (before - self.boxes.len()) as u64 * self.points
        }

        fn all_cleared(&self) -> bool {
            self.boxes.is_empty()
        }
    }

    #[test]
    fn test_no_hostiles_is_cleared() {
        let mut hostiles = NoHostiles;
        let grid = Grid::filled(3, 3);
        assert!(hostiles.all_cleared());
        assert_eq!(hostiles.burn(&grid), 0);
        assert!(!hostiles.touches(&Aabb::new(IVec2::ZERO, IVec2::ONE)));
    }

    #[test]
    fn test_static_hostiles_burn() {
        let mut grid = Grid::filled(5, 5);
        let mut hostiles = StaticHostiles::at(&[IVec2::new(60, 30), IVec2::new(120, 120)], 100);
        grid.ignite_from_bomb(crate::sim::grid::Cell::new(1, 1), 1, 2);
        assert_eq!(hostiles.burn(&grid), 100);
        assert!(!hostiles.all_cleared());
    }
}
