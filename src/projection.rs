//! Obstacle-aware pressure projection.
//!
//! Each sweep visits cells in row-major order (`y` outer, `x` inner) and
//! pushes the cell's divergence out through its open faces in place, so later
//! cells in the same sweep see the corrected faces (Gauss-Seidel with
//! over-relaxation). The visiting order is part of the numerical result.

use crate::{CellType, Field2, MacVelocity2, ObstacleMask};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionParams {
    pub over_relaxation: f32,
    pub iterations: usize,
    /// Converts a per-face correction into pressure units,
    /// see [`pressure_scale`].
    pub pressure_scale: f32,
}

/// `density * dx / dt`.
pub fn pressure_scale(density: f32, dx: f32, dt: f32) -> f32 {
    density * dx / dt
}

/// Clears `pressure`, then runs `params.iterations` sweeps.
pub fn project(
    velocity: &mut MacVelocity2,
    mask: &ObstacleMask,
    pressure: &mut Field2,
    params: ProjectionParams,
) {
    assert_eq!(mask.grid(), velocity.grid().cell_grid(), "mask grid mismatch");
    assert_eq!(pressure.grid(), mask.grid(), "pressure grid mismatch");
    pressure.clear();
    for _ in 0..params.iterations {
        sweep(
            velocity,
            mask,
            pressure,
            params.over_relaxation,
            params.pressure_scale,
        );
    }
}

/// One in-place pass over every fluid cell. Pressure accumulates; it is not
/// cleared here.
pub fn sweep(
    velocity: &mut MacVelocity2,
    mask: &ObstacleMask,
    pressure: &mut Field2,
    over_relaxation: f32,
    pressure_scale: f32,
) {
    let grid = mask.grid();
    let (u, v) = velocity.components_mut();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if mask.get(x, y) == CellType::Solid {
                continue;
            }
            let (xi, yi) = (x as i32, y as i32);
            let s_left = mask.openness(xi - 1, yi);
            let s_right = mask.openness(xi + 1, yi);
            let s_bottom = mask.openness(xi, yi - 1);
            let s_top = mask.openness(xi, yi + 1);
            let s = s_left + s_right + s_bottom + s_top;
            // Enclosed cell: nowhere to push the divergence.
            if s <= 0.0 {
                continue;
            }

            let u_left = u.get(x, y);
            let u_right = u.get(x + 1, y);
            let v_bottom = v.get(x, y);
            let v_top = v.get(x, y + 1);

            let div = over_relaxation * 0.5 * (u_right - u_left + v_top - v_bottom);

            u.set(x, y, u_left + div * s_left / s);
            u.set(x + 1, y, u_right - div * s_right / s);
            v.set(x, y, v_bottom + div * s_bottom / s);
            v.set(x, y + 1, v_top - div * s_top / s);

            pressure.add(x, y, div / s * pressure_scale);
        }
    }
}

/// Net face outflow per cell, `(u_r - u_l) + (v_t - v_b)`, in the same
/// unscaled form the solver drives to zero.
pub fn divergence(velocity: &MacVelocity2) -> Field2 {
    let u = velocity.u();
    let v = velocity.v();
    Field2::from_fn(velocity.grid().cell_grid(), |x, y| {
        u.get(x + 1, y) - u.get(x, y) + v.get(x, y + 1) - v.get(x, y)
    })
}

/// Sum of `|divergence|` over fluid cells.
pub fn divergence_abs_sum(velocity: &MacVelocity2, mask: &ObstacleMask) -> f32 {
    let div = divergence(velocity);
    let grid = mask.grid();
    let mut total = 0.0;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if mask.get(x, y) == CellType::Fluid {
                total += div.get(x, y).abs();
            }
        }
    }
    total
}
