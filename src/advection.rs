//! Semi-Lagrangian transport on the staggered grid.
//!
//! Every sample is traced backward from its own position by one step of the
//! local velocity, in cell units, and the source field is resampled there. All
//! reads go to the current buffers and all writes to the next buffers; the
//! swap happens once the whole pass is done.

use crate::mac::DoubleBuffered;
use crate::{Field2, MacVelocity2, StaggeredField2, Vec2};

/// Horizontal velocity at vertical-velocity face `(x, y)`.
///
/// Interior faces average the four surrounding `u` samples. On the bottom
/// (`y == 0`) and top (`y == height`) faces only one row of `u` exists, and
/// the result is the mean of those two samples.
pub fn avg_u(u: &StaggeredField2, x: usize, y: usize) -> f32 {
    let height = u.grid().height();
    if y == 0 {
        0.5 * (u.get(x, 0) + u.get(x + 1, 0))
    } else if y == height {
        0.5 * (u.get(x, height - 1) + u.get(x + 1, height - 1))
    } else {
        0.25 * (u.get(x, y) + u.get(x + 1, y) + u.get(x, y - 1) + u.get(x + 1, y - 1))
    }
}

/// Vertical velocity at horizontal-velocity face `(x, y)`; the mirror of
/// [`avg_u`] with the left (`x == 0`) and right (`x == width`) edge cases.
pub fn avg_v(v: &StaggeredField2, x: usize, y: usize) -> f32 {
    let width = v.grid().width();
    if x == 0 {
        0.5 * (v.get(0, y) + v.get(0, y + 1))
    } else if x == width {
        0.5 * (v.get(width - 1, y) + v.get(width - 1, y + 1))
    } else {
        0.25 * (v.get(x, y) + v.get(x, y + 1) + v.get(x - 1, y) + v.get(x - 1, y + 1))
    }
}

/// Velocity at the center of cell `(x, y)` from its four faces.
pub fn cell_velocity(velocity: &MacVelocity2, x: usize, y: usize) -> Vec2 {
    let u = velocity.u();
    let v = velocity.v();
    Vec2::new(
        0.5 * (u.get(x, y) + u.get(x + 1, y)),
        0.5 * (v.get(x, y) + v.get(x, y + 1)),
    )
}

/// Transports both velocity components along the current velocity, then
/// publishes the result.
pub fn advect_velocity(velocity: &mut MacVelocity2, dt: f32) {
    {
        let buffers = velocity.buffers_mut();
        let (u, v) = (buffers.u, buffers.v);
        let u_grid = u.grid();
        let v_grid = v.grid();

        buffers.u_next.fill_with_index(|x, y| {
            let vel = Vec2::new(u.get(x, y), avg_v(v, x, y));
            u.sample_bilinear(u_grid.trace(x, y, vel.scale(dt)))
        });

        buffers.v_next.fill_with_index(|x, y| {
            let vel = Vec2::new(avg_u(u, x, y), v.get(x, y));
            v.sample_bilinear(v_grid.trace(x, y, vel.scale(dt)))
        });
    }
    velocity.swap_buffers();
}

/// Transports a cell-centered scalar along `velocity`, then publishes it.
///
/// Only cells holding a positive value are resampled; the rest carry their
/// current value over unchanged, so an empty cell never picks up scalar from
/// upstream.
pub fn advect_scalar(field: &mut DoubleBuffered<Field2>, velocity: &MacVelocity2, dt: f32) {
    {
        let (current, next) = field.split();
        let grid = current.grid();
        assert_eq!(grid, velocity.grid().cell_grid(), "scalar grid mismatch");
        let space = grid.sample_space();
        next.fill_with_index(|x, y| {
            let value = current.get(x, y);
            if value > 0.0 {
                let vel = cell_velocity(velocity, x, y);
                current.sample_bilinear(space.trace(x, y, vel.scale(dt)))
            } else {
                value
            }
        });
    }
    field.swap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MacGrid2, StaggeredGrid2};
    use proptest::prelude::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn distinct(grid: StaggeredGrid2) -> StaggeredField2 {
        StaggeredField2::from_fn(grid, |x, y| 1.0 + x as f32 * 3.0 + y as f32 * 17.0)
    }

    #[test]
    fn avg_v_on_side_faces_is_two_sample_mean() {
        let grid = MacGrid2::new(5, 4);
        let v = distinct(grid.v_grid());
        for y in 0..grid.height() {
            let left = avg_v(&v, 0, y);
            assert_close(left, 0.5 * (v.get(0, y) + v.get(0, y + 1)), 1e-5);
            let right = avg_v(&v, grid.width(), y);
            let last = grid.width() - 1;
            assert_close(right, 0.5 * (v.get(last, y) + v.get(last, y + 1)), 1e-5);
        }
    }

    #[test]
    fn avg_u_on_floor_and_ceiling_is_two_sample_mean() {
        let grid = MacGrid2::new(4, 5);
        let u = distinct(grid.u_grid());
        for x in 0..grid.width() {
            let bottom = avg_u(&u, x, 0);
            assert_close(bottom, 0.5 * (u.get(x, 0) + u.get(x + 1, 0)), 1e-5);
            let top = avg_u(&u, x, grid.height());
            let last = grid.height() - 1;
            assert_close(top, 0.5 * (u.get(x, last) + u.get(x + 1, last)), 1e-5);
        }
    }

    #[test]
    fn interior_averages_use_four_samples() {
        let grid = MacGrid2::new(4, 4);
        let u = distinct(grid.u_grid());
        let v = distinct(grid.v_grid());
        let expected_u = 0.25 * (u.get(1, 2) + u.get(2, 2) + u.get(1, 1) + u.get(2, 1));
        assert_close(avg_u(&u, 1, 2), expected_u, 1e-5);
        let expected_v = 0.25 * (v.get(2, 1) + v.get(2, 2) + v.get(1, 1) + v.get(1, 2));
        assert_close(avg_v(&v, 2, 1), expected_v, 1e-5);
    }

    #[test]
    fn uniform_velocity_survives_advection() {
        let grid = MacGrid2::new(8, 8);
        let mut velocity = MacVelocity2::new(grid, Vec2::new(0.3, -0.2));
        advect_velocity(&mut velocity, 0.05);
        for y in 0..8 {
            for x in 0..9 {
                assert_close(velocity.u().get(x, y), 0.3, 1e-5);
            }
        }
        for y in 0..9 {
            for x in 0..8 {
                assert_close(velocity.v().get(x, y), -0.2, 1e-5);
            }
        }
    }

    #[test]
    fn velocity_reads_only_pre_pass_values() {
        // A shear profile: u grows with y. Advecting by the pre-pass field
        // shifts samples by exactly one cell per dt when v is uniform.
        let grid = MacGrid2::new(8, 8);
        let dx = grid.dx();
        let u = StaggeredField2::from_fn(grid.u_grid(), |_, y| y as f32);
        let v = StaggeredField2::new(grid.v_grid(), dx);
        let mut velocity = MacVelocity2::from_components(grid, u, v);
        advect_velocity(&mut velocity, 1.0);
        // Interior u sample traced one cell down: value y - 1.
        for y in 2..6 {
            for x in 1..grid.width() {
                assert_close(velocity.u().get(x, y), (y - 1) as f32, 1e-3);
            }
        }
    }

    #[test]
    fn scalar_moves_downstream() {
        let grid = MacGrid2::new(8, 8);
        let dx = grid.dx();
        let velocity = MacVelocity2::new(grid, Vec2::new(dx, 0.0));
        let mut smoke = DoubleBuffered::new(Field2::from_fn(grid.cell_grid(), |x, _| {
            0.1 + x as f32 * 0.1
        }));
        advect_scalar(&mut smoke, &velocity, 1.0);
        for x in 1..7 {
            assert_close(smoke.front().get(x, 3), 0.1 + (x - 1) as f32 * 0.1, 1e-4);
        }
    }

    #[test]
    fn empty_cells_stay_empty() {
        let grid = MacGrid2::new(6, 6);
        let dx = grid.dx();
        let velocity = MacVelocity2::new(grid, Vec2::new(dx, dx));
        let mut smoke = DoubleBuffered::new(Field2::from_fn(grid.cell_grid(), |x, y| {
            if x == 3 && y == 3 {
                0.0
            } else {
                1.0
            }
        }));
        for _ in 0..3 {
            advect_scalar(&mut smoke, &velocity, 1.0);
            assert_eq!(smoke.front().get(3, 3), 0.0);
        }
    }

    #[test]
    fn skipped_cells_do_not_resurface_stale_values() {
        let grid = MacGrid2::new(4, 4);
        let velocity = MacVelocity2::new(grid, Vec2::zero());
        let mut smoke = DoubleBuffered::new(Field2::new(grid.cell_grid(), 1.0));
        smoke.front_mut().set(1, 1, 0.0);
        advect_scalar(&mut smoke, &velocity, 0.1);
        advect_scalar(&mut smoke, &velocity, 0.1);
        assert_eq!(smoke.front().get(1, 1), 0.0);
        assert_eq!(smoke.front().get(2, 2), 1.0);
    }

    #[test]
    fn zero_velocity_is_a_fixed_point_for_velocity() {
        let grid = MacGrid2::new(6, 5);
        let mut velocity = MacVelocity2::new(grid, Vec2::zero());
        advect_velocity(&mut velocity, 0.5);
        advect_velocity(&mut velocity, 0.5);
        assert_eq!(velocity.max_abs(), 0.0);
    }

    #[test]
    fn still_impulse_comes_back_exactly() {
        let cases: Vec<(usize, Vec<(usize, usize)>)> = vec![
            (7, (0..7).flat_map(|y| (0..7).map(move |x| (x, y))).collect()),
            (10, (0..10).flat_map(|y| (0..10).map(move |x| (x, y))).collect()),
            (13, (0..13).flat_map(|y| (0..13).map(move |x| (x, y))).collect()),
            (128, vec![(0, 0), (1, 1), (64, 64), (97, 3), (127, 127)]),
        ];
        for (n, cells) in cases {
            let grid = MacGrid2::new(n, n);
            let velocity = MacVelocity2::new(grid, Vec2::zero());
            for (cx, cy) in cells {
                let mut smoke = DoubleBuffered::new(Field2::new(grid.cell_grid(), 0.0));
                smoke.front_mut().set(cx, cy, 1.0);
                advect_scalar(&mut smoke, &velocity, 0.1);
                assert_eq!(smoke.front().get(cx, cy), 1.0, "n = {n}, cell ({cx}, {cy})");
                assert_eq!(smoke.front().sum(), 1.0, "n = {n}, cell ({cx}, {cy})");
            }
        }
    }

    proptest! {
        #[test]
        fn zero_velocity_scalar_advection_is_identity(
            cx in 0usize..7,
            cy in 0usize..7,
            passes in 1usize..3,
            dt in 0.001f32..1.0,
        ) {
            let grid = MacGrid2::new(7, 7);
            let velocity = MacVelocity2::new(grid, Vec2::zero());
            let impulse = Field2::from_fn(grid.cell_grid(), |x, y| {
                if x == cx && y == cy { 1.0 } else { 0.0 }
            });
            let mut smoke = DoubleBuffered::new(impulse.clone());
            for _ in 0..passes {
                advect_scalar(&mut smoke, &velocity, dt);
            }
            for y in 0..7 {
                for x in 0..7 {
                    let got = smoke.front().get(x, y);
                    let want = impulse.get(x, y);
                    prop_assert_eq!(got, want, "({}, {})", x, y);
                }
            }
        }
    }
}
