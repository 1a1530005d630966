use crate::{Grid2, Vec2};

/// Staggered (MAC) layout over the unit-width domain: `width` x `height`
/// cells of side `1 / width`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacGrid2 {
    width: usize,
    height: usize,
    dx: f32,
}

impl MacGrid2 {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width >= 2, "width must be >= 2");
        assert!(height >= 2, "height must be >= 2");
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

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn cell_grid(&self) -> Grid2 {
        Grid2::new(self.width, self.height)
    }

    /// Horizontal velocity lives on vertical faces: `(w + 1) x h`, half a cell up.
    pub fn u_grid(&self) -> StaggeredGrid2 {
        StaggeredGrid2::new(
            self.width + 1,
            self.height,
            self.width,
            Vec2::new(0.0, 0.5),
        )
    }

    /// Vertical velocity lives on horizontal faces: `w x (h + 1)`, half a cell right.
    pub fn v_grid(&self) -> StaggeredGrid2 {
        StaggeredGrid2::new(
            self.width,
            self.height + 1,
            self.width,
            Vec2::new(0.5, 0.0),
        )
    }
}

/// One sample space of the MAC layout over the unit domain.
///
/// `cells` is the number of cells spanning the unit length on either axis,
/// and `offset` is the position of sample `(0, 0)` in cells. Traces run in
/// these cell units so an untouched sample lands exactly on its own index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaggeredGrid2 {
    width: usize,
    height: usize,
    cells: usize,
    dx: f32,
    offset: Vec2,
}

impl StaggeredGrid2 {
    pub fn new(width: usize, height: usize, cells: usize, offset: Vec2) -> Self {
        assert!(width > 0, "width must be > 0");
        assert!(height > 0, "height must be > 0");
        assert!(cells > 0, "cells must be > 0");
        Self {
            width,
            height,
            cells,
            dx: 1.0 / cells as f32,
            offset,
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

    /// Physical position of sample `(x, y)`.
    pub fn index_position(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + self.offset.x) * self.dx,
            (y as f32 + self.offset.y) * self.dx,
        )
    }

    /// Traces sample `(x, y)` back by a physical `displacement` and returns
    /// the foot point in this space's sample coordinates.
    ///
    /// The foot point is clamped to the unit domain before the offset is
    /// removed, so it may sit up to half a cell outside the sample range.
    pub fn trace(&self, x: usize, y: usize, displacement: Vec2) -> Vec2 {
        let extent = self.cells as f32;
        let gx = (x as f32 + self.offset.x - displacement.x / self.dx).clamp(0.0, extent);
        let gy = (y as f32 + self.offset.y - displacement.y / self.dx).clamp(0.0, extent);
        Vec2::new(gx - self.offset.x, gy - self.offset.y)
    }

    /// Bilinear resample of `data` at sample coordinates `g`.
    ///
    /// The lower-left stencil index is clamped to
    /// `[0, width - 2] x [0, height - 2]` so the 2x2 stencil never leaves the
    /// array; weights keep the unclamped fractional offset, which extrapolates
    /// slightly within the outermost half cell.
    pub fn bilinear(&self, data: &[f32], g: Vec2) -> f32 {
        debug_assert_eq!(data.len(), self.size(), "sample data mismatch");
        debug_assert!(self.width >= 2 && self.height >= 2);
        let ix = (g.x.floor() as i32).clamp(0, self.width as i32 - 2) as usize;
        let iy = (g.y.floor() as i32).clamp(0, self.height as i32 - 2) as usize;
        let sx = g.x - ix as f32;
        let sy = g.y - iy as f32;
        let tx = 1.0 - sx;
        let ty = 1.0 - sy;
        sx * sy * data[self.idx(ix + 1, iy + 1)]
            + tx * sy * data[self.idx(ix, iy + 1)]
            + sx * ty * data[self.idx(ix + 1, iy)]
            + tx * ty * data[self.idx(ix, iy)]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StaggeredField2 {
    grid: StaggeredGrid2,
    data: Vec<f32>,
}

impl StaggeredField2 {
    pub fn new(grid: StaggeredGrid2, fill: f32) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn from_fn(grid: StaggeredGrid2, f: impl Fn(usize, usize) -> f32) -> Self {
        let width = grid.width();
        let data = (0..grid.size())
            .map(|i| {
                let x = i % width;
                let y = i / width;
                f(x, y)
            })
            .collect();
        Self { grid, data }
    }

    pub fn grid(&self) -> StaggeredGrid2 {
        self.grid
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.grid.idx(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let i = self.grid.idx(x, y);
        self.data[i] = value;
    }

    /// Resamples at sample coordinates `g`, see [`StaggeredGrid2::trace`].
    pub fn sample_bilinear(&self, g: Vec2) -> f32 {
        self.grid.bilinear(&self.data, g)
    }

    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> f32) {
        let width = self.grid.width();
        for (i, value) in self.data.iter_mut().enumerate() {
            let x = i % width;
            let y = i / width;
            *value = f(x, y);
        }
    }

    pub fn max_abs(&self) -> f32 {
        self.data
            .iter()
            .map(|value| value.abs())
            .fold(0.0_f32, f32::max)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellType {
    Fluid,
    Solid,
}

/// Per-cell fluid/solid classification. Built once, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleMask {
    grid: Grid2,
    data: Vec<CellType>,
}

impl ObstacleMask {
    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> CellType) -> Self {
        let width = grid.width();
        let data = (0..grid.size())
            .map(|i| {
                let x = i % width;
                let y = i / width;
                f(x, y)
            })
            .collect();
        Self { grid, data }
    }

    /// Solid outer ring, fluid interior.
    pub fn walled(grid: Grid2) -> Self {
        let w = grid.width();
        let h = grid.height();
        Self::from_fn(grid, |x, y| {
            if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                CellType::Solid
            } else {
                CellType::Fluid
            }
        })
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn get(&self, x: usize, y: usize) -> CellType {
        self.data[self.grid.idx(x, y)]
    }

    /// Out-of-grid coordinates are solid.
    pub fn is_fluid(&self, x: i32, y: i32) -> bool {
        self.grid.contains(x, y) && self.get(x as usize, y as usize) == CellType::Fluid
    }

    /// Openness weight of a neighbor: 1 for fluid, 0 for solid or outside.
    pub fn openness(&self, x: i32, y: i32) -> f32 {
        if self.is_fluid(x, y) {
            1.0
        } else {
            0.0
        }
    }

    pub fn fluid_count(&self) -> usize {
        self.data
            .iter()
            .filter(|cell| **cell == CellType::Fluid)
            .count()
    }
}

/// A front buffer readers see and a back buffer a transport pass writes.
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleBuffered<T> {
    front: T,
    back: T,
}

impl<T: Clone> DoubleBuffered<T> {
    pub fn new(value: T) -> Self {
        Self {
            back: value.clone(),
            front: value,
        }
    }
}

impl<T> DoubleBuffered<T> {
    pub fn front(&self) -> &T {
        &self.front
    }

    pub fn front_mut(&mut self) -> &mut T {
        &mut self.front
    }

    /// Read the front while writing the back.
    pub fn split(&mut self) -> (&T, &mut T) {
        (&self.front, &mut self.back)
    }

    /// Publishes the back buffer. The old front becomes scratch.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MacVelocity2 {
    grid: MacGrid2,
    u: DoubleBuffered<StaggeredField2>,
    v: DoubleBuffered<StaggeredField2>,
}

/// Disjoint borrows for an advection pass: current components to read,
/// next components to fill.
pub struct VelocityBuffers<'a> {
    pub u: &'a StaggeredField2,
    pub v: &'a StaggeredField2,
    pub u_next: &'a mut StaggeredField2,
    pub v_next: &'a mut StaggeredField2,
}

impl MacVelocity2 {
    pub fn new(grid: MacGrid2, fill: Vec2) -> Self {
        let u = StaggeredField2::new(grid.u_grid(), fill.x);
        let v = StaggeredField2::new(grid.v_grid(), fill.y);
        Self::from_components(grid, u, v)
    }

    pub fn from_components(grid: MacGrid2, u: StaggeredField2, v: StaggeredField2) -> Self {
        assert_eq!(u.grid(), grid.u_grid(), "u grid mismatch");
        assert_eq!(v.grid(), grid.v_grid(), "v grid mismatch");
        Self {
            grid,
            u: DoubleBuffered::new(u),
            v: DoubleBuffered::new(v),
        }
    }

    pub fn grid(&self) -> MacGrid2 {
        self.grid
    }

    pub fn u(&self) -> &StaggeredField2 {
        self.u.front()
    }

    pub fn v(&self) -> &StaggeredField2 {
        self.v.front()
    }

    pub fn u_mut(&mut self) -> &mut StaggeredField2 {
        self.u.front_mut()
    }

    pub fn v_mut(&mut self) -> &mut StaggeredField2 {
        self.v.front_mut()
    }

    /// Both current components mutably, for in-place projection sweeps.
    pub fn components_mut(&mut self) -> (&mut StaggeredField2, &mut StaggeredField2) {
        (self.u.front_mut(), self.v.front_mut())
    }

    pub fn buffers_mut(&mut self) -> VelocityBuffers<'_> {
        let (u, u_next) = self.u.split();
        let (v, v_next) = self.v.split();
        VelocityBuffers {
            u,
            v,
            u_next,
            v_next,
        }
    }

    /// Publishes both next components together.
    pub fn swap_buffers(&mut self) {
        self.u.swap();
        self.v.swap();
    }

    pub fn max_abs(&self) -> f32 {
        self.u().max_abs().max(self.v().max_abs())
    }

    pub fn is_finite(&self) -> bool {
        self.u().is_finite() && self.v().is_finite()
    }
}
