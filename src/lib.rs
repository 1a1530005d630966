mod advection;
mod config;
mod error;
mod field;
mod frame;
mod grid;
mod mac;
mod palette;
mod projection;
mod sim;
mod vec2;

pub use advection::{advect_scalar, advect_velocity, avg_u, avg_v, cell_velocity};
pub use config::{load, load_from, Config, RunConfig, SimConfig, SolverParams};
pub use error::SimError;
pub use field::Field2;
pub use frame::{flip_rows, frame_path, write_png};
pub use grid::Grid2;
pub use mac::{
    CellType, DoubleBuffered, MacGrid2, MacVelocity2, ObstacleMask, StaggeredField2,
    StaggeredGrid2, VelocityBuffers,
};
pub use palette::{pressure_to_rgba, sci_color, smoke_gray, smoke_to_rgba, FrameField};
pub use projection::{
    divergence, divergence_abs_sum, pressure_scale, project, sweep, ProjectionParams,
};
pub use sim::{SmokeSim, TickStats};
pub use vec2::Vec2;
