//! The tick pipeline: inlet, projection, velocity transport, smoke transport.

use log::{debug, info, log_enabled, Level};

use crate::advection::{advect_scalar, advect_velocity};
use crate::config::{SimConfig, SolverParams};
use crate::error::SimError;
use crate::mac::DoubleBuffered;
use crate::projection::{divergence_abs_sum, pressure_scale, project, ProjectionParams};
use crate::{Field2, MacGrid2, MacVelocity2, ObstacleMask, Vec2};

/// Smoke is cleared within this distance of the domain center at startup.
const HOLE_RADIUS: f32 = 0.01;
const MAX_INFLOW: f32 = 1000.0;

/// Per-tick summary for logs and hosts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub max_speed: f32,
    pub divergence: f32,
    pub smoke_range: (f32, f32),
    pub pressure_range: (f32, f32),
}

#[derive(Clone, Debug)]
pub struct SmokeSim {
    config: SimConfig,
    grid: MacGrid2,
    mask: ObstacleMask,
    velocity: MacVelocity2,
    pressure: Field2,
    smoke: DoubleBuffered<Field2>,
    ticks: u64,
}

impl SmokeSim {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let n = config.domain_length;
        let grid = MacGrid2::new(n, n);
        let cell_grid = grid.cell_grid();
        let center = Vec2::splat(0.5);
        let smoke = Field2::from_fn(cell_grid, |x, y| {
            if cell_grid.cell_corner(x, y).sub(center).length() <= HOLE_RADIUS {
                0.0
            } else {
                1.0
            }
        });
        info!(
            "smoke sim {n}x{n}, dx {:.5}, density {}, omega {}, {} sweeps, inflow {}",
            grid.dx(),
            config.density,
            config.solver.over_relaxation,
            config.solver.iterations,
            config.solver.inflow_velocity,
        );
        Ok(Self {
            config,
            grid,
            mask: ObstacleMask::walled(cell_grid),
            velocity: MacVelocity2::new(grid, Vec2::zero()),
            pressure: Field2::new(cell_grid, 0.0),
            smoke: DoubleBuffered::new(smoke),
            ticks: 0,
        })
    }

    /// Default solver parameters with the given physical setup.
    pub fn init(density: f32, domain_length: usize, time_hint: f32) -> Result<Self, SimError> {
        Self::new(SimConfig {
            domain_length,
            density,
            time_hint,
            solver: SolverParams::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> MacGrid2 {
        self.grid
    }

    pub fn mask(&self) -> &ObstacleMask {
        &self.mask
    }

    pub fn velocity(&self) -> &MacVelocity2 {
        &self.velocity
    }

    pub fn pressure(&self) -> &Field2 {
        &self.pressure
    }

    pub fn smoke(&self) -> &Field2 {
        self.smoke.front()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn solver_params(&self) -> SolverParams {
        self.config.solver
    }

    /// Takes effect from the next tick.
    pub fn set_solver_params(&mut self, params: SolverParams) -> Result<(), SimError> {
        params.validate()?;
        self.config.solver = params;
        Ok(())
    }

    /// Maps a `[0, 1]` control onto the inlet range `[0, 1000]`.
    pub fn set_inflow_fraction(&mut self, fraction: f32) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.config.solver.inflow_velocity = fraction * MAX_INFLOW;
    }

    /// `u` faces driven by the inlet: three rows around mid-height, three
    /// quarters of the way across.
    pub fn inlet_faces(&self) -> [(usize, usize); 3] {
        let column = self.grid.width() * 3 / 4;
        let row = self.grid.height() / 2;
        [(column, row - 1), (column, row), (column, row + 1)]
    }

    pub fn apply_inlet(&mut self) {
        let inflow = self.config.solver.inflow_velocity;
        for (x, y) in self.inlet_faces() {
            self.velocity.u_mut().set(x, y, inflow);
        }
    }

    pub fn project(&mut self, dt: f32) {
        let params = ProjectionParams {
            over_relaxation: self.config.solver.over_relaxation,
            iterations: self.config.solver.iterations,
            pressure_scale: pressure_scale(self.config.density, self.grid.dx(), dt),
        };
        project(&mut self.velocity, &self.mask, &mut self.pressure, params);
    }

    pub fn advect(&mut self, dt: f32) {
        advect_velocity(&mut self.velocity, dt);
        advect_scalar(&mut self.smoke, &self.velocity, dt);
    }

    /// Advances one tick of length `dt`. A non-positive or non-finite `dt`
    /// leaves the state untouched.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            debug!("skipping tick with dt {dt}");
            return;
        }
        self.apply_inlet();
        self.project(dt);
        self.advect(dt);
        self.ticks += 1;
        if log_enabled!(Level::Debug) {
            let stats = self.stats();
            debug!(
                "tick {}: max |vel| {:.4}, sum |div| {:.4e}, smoke [{:.3}, {:.3}], pressure [{:.3e}, {:.3e}]",
                stats.tick,
                stats.max_speed,
                stats.divergence,
                stats.smoke_range.0,
                stats.smoke_range.1,
                stats.pressure_range.0,
                stats.pressure_range.1,
            );
        }
    }

    /// Advances by the configured `time_hint`.
    pub fn step_nominal(&mut self) {
        self.step(self.config.time_hint);
    }

    pub fn stats(&self) -> TickStats {
        TickStats {
            tick: self.ticks,
            max_speed: self.velocity.max_abs(),
            divergence: divergence_abs_sum(&self.velocity, &self.mask),
            smoke_range: self.smoke().min_max(),
            pressure_range: self.pressure.min_max(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.velocity.is_finite() && self.pressure.is_finite() && self.smoke().is_finite()
    }
}
