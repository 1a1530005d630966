use crate::mac::StaggeredGrid2;
use crate::Vec2;

/// Cell-centered sample space (pressure, smoke). The unit domain is `width`
/// cells across, so `dx = 1 / width`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid2 {
    width: usize,
    height: usize,
    dx: f32,
}

impl Grid2 {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "width must be > 0");
        assert!(height > 0, "height must be > 0");
        Self {
            width,
            height,
            dx: 1.0 / width as f32,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// True when `(x, y)` names a cell of this grid. Total over `i32`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Lower-left corner of cell `(x, y)`.
    pub fn cell_corner(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(x as f32 * self.dx, y as f32 * self.dx)
    }

    /// The same samples viewed as a staggered space offset half a cell on
    /// both axes, so cell data shares the face sampler.
    pub fn sample_space(&self) -> StaggeredGrid2 {
        StaggeredGrid2::new(self.width, self.height, self.width, Vec2::splat(0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idx_is_row_major() {
        let grid = Grid2::new(4, 3);
        assert_eq!(grid.idx(0, 0), 0);
        assert_eq!(grid.idx(3, 0), 3);
        assert_eq!(grid.idx(1, 2), 9);
        assert_eq!(grid.size(), 12);
    }

    #[test]
    fn contains_treats_outside_as_absent() {
        let grid = Grid2::new(3, 3);
        assert!(grid.contains(0, 0));
        assert!(grid.contains(2, 2));
        assert!(!grid.contains(-1, 1));
        assert!(!grid.contains(1, 3));
        assert!(!grid.contains(3, 0));
    }

    #[test]
    fn sample_space_offsets_half_cell() {
        let grid = Grid2::new(4, 4);
        let space = grid.sample_space();
        assert_eq!(space.index_position(1, 2), Vec2::new(0.375, 0.625));
        assert_eq!(space.trace(3, 0, Vec2::zero()), Vec2::new(3.0, 0.0));
        assert_eq!(grid.cell_corner(1, 2), Vec2::new(0.25, 0.5));
    }
}
