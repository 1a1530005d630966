use crate::grid::Grid2;
use crate::Vec2;

/// Cell-centered scalar samples (pressure, smoke).
#[derive(Clone, Debug, PartialEq)]
pub struct Field2 {
    grid: Grid2,
    data: Vec<f32>,
}

impl Field2 {
    pub fn new(grid: Grid2, fill: f32) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> f32) -> Self {
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

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.grid.idx(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let i = self.grid.idx(x, y);
        self.data[i] = value;
    }

    pub fn add(&mut self, x: usize, y: usize, delta: f32) {
        let i = self.grid.idx(x, y);
        self.data[i] += delta;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Bilinear resample at cell coordinates `g`, with the staggered
    /// sampler's clamp rules.
    pub fn sample_bilinear(&self, g: Vec2) -> f32 {
        self.grid.sample_space().bilinear(&self.data, g)
    }

    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> f32) {
        let width = self.grid.width();
        for (i, value) in self.data.iter_mut().enumerate() {
            let x = i % width;
            let y = i / width;
            *value = f(x, y);
        }
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        let mut min_value = *first;
        let mut max_value = *first;
        for value in iter {
            if *value < min_value {
                min_value = *value;
            }
            if *value > max_value {
                max_value = *value;
            }
        }
        (min_value, max_value)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }
}
