use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::SimError;
use crate::palette::FrameField;

/// Parameters that may change between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// SOR factor in `[1, 2]`. Values near 2 converge faster but can
    /// oscillate; this is a tuning outcome, not an error.
    pub over_relaxation: f32,
    /// Projection sweeps per tick, `[1, 20]`. Too few leaves visible residual
    /// divergence.
    pub iterations: usize,
    /// Inlet magnitude, `[0, 1000]`.
    pub inflow_velocity: f32,
}

/// Parameters fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Cells per side of the square domain.
    pub domain_length: usize,
    /// Scales the diagnostic pressure only.
    pub density: f32,
    /// Nominal tick length for hosts without their own clock.
    pub time_hint: f32,
    pub solver: SolverParams,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub ticks: usize,
    /// Write a frame every this many ticks; 0 disables frame output.
    pub frame_every: usize,
    pub output_dir: PathBuf,
    pub field: FrameField,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sim: SimConfig,
    pub run: RunConfig,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            over_relaxation: 1.9,
            iterations: 10,
            inflow_velocity: 10.0,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            domain_length: 128,
            density: 1000.0,
            time_hint: 1.0 / 60.0,
            solver: SolverParams::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            frame_every: 30,
            output_dir: PathBuf::from("frames"),
            field: FrameField::Smoke,
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(SimError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::OutOfRange {
            name,
            value: value as f64,
            min: 0.0,
            max: f64::INFINITY,
        })
    }
}

impl SolverParams {
    pub fn validate(&self) -> Result<(), SimError> {
        check_range("over_relaxation", self.over_relaxation as f64, 1.0, 2.0)?;
        check_range("iterations", self.iterations as f64, 1.0, 20.0)?;
        check_range("inflow_velocity", self.inflow_velocity as f64, 0.0, 1000.0)?;
        Ok(())
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.domain_length < 3 {
            return Err(SimError::InvalidDomainLength(self.domain_length));
        }
        check_positive("density", self.density)?;
        check_positive("time_hint", self.time_hint)?;
        self.solver.validate()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), SimError> {
        self.sim.validate()
    }
}

/// Reads and validates a YAML config. Absent keys take their defaults.
pub fn load_from(path: &Path) -> Result<Config, SimError> {
    let contents = std::fs::read_to_string(path).map_err(|err| SimError::io(path, err))?;
    let config: Config = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Like [`load_from`], but a missing or broken file yields defaults.
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        debug!("no config at {}; using defaults", path.display());
        return Config::default();
    }
    match load_from(path) {
        Ok(config) => config,
        Err(err) => {
            warn!("{err}; using defaults");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.sim.solver.over_relaxation, 1.9);
        assert_eq!(cfg.sim.solver.iterations, 10);
        assert_eq!(cfg.sim.solver.inflow_velocity, 10.0);
        assert_eq!(cfg.sim.domain_length, 128);
        assert_eq!(cfg.run.field, FrameField::Smoke);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "sim:\n  domain_length: 64\n  solver:\n    iterations: 20\nrun:\n  ticks: 10\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.sim.domain_length, 64);
        assert_eq!(cfg.sim.solver.iterations, 20);
        assert_eq!(cfg.sim.solver.over_relaxation, 1.9);
        assert_eq!(cfg.sim.density, 1000.0);
        assert_eq!(cfg.run.ticks, 10);
        assert_eq!(cfg.run.frame_every, 30);
    }

    #[test]
    fn full_yaml() {
        let yaml = r#"
sim:
  domain_length: 10
  density: 1.0
  time_hint: 0.016
  solver:
    over_relaxation: 1.5
    iterations: 4
    inflow_velocity: 250.0
run:
  ticks: 5
  frame_every: 1
  output_dir: out
  field: pressure
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.sim.domain_length, 10);
        assert_eq!(cfg.sim.density, 1.0);
        assert_eq!(cfg.sim.time_hint, 0.016);
        assert_eq!(cfg.sim.solver.over_relaxation, 1.5);
        assert_eq!(cfg.sim.solver.iterations, 4);
        assert_eq!(cfg.sim.solver.inflow_velocity, 250.0);
        assert_eq!(cfg.run.ticks, 5);
        assert_eq!(cfg.run.frame_every, 1);
        assert_eq!(cfg.run.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.run.field, FrameField::Pressure);
    }

    #[test]
    fn rejects_degenerate_domain() {
        for length in [0, 1, 2] {
            let cfg = SimConfig {
                domain_length: length,
                ..SimConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(SimError::InvalidDomainLength(n)) if n == length
            ));
        }
    }

    #[test]
    fn rejects_out_of_range_solver_params() {
        let cases = [
            SolverParams {
                over_relaxation: 2.5,
                ..SolverParams::default()
            },
            SolverParams {
                over_relaxation: 0.5,
                ..SolverParams::default()
            },
            SolverParams {
                iterations: 0,
                ..SolverParams::default()
            },
            SolverParams {
                iterations: 21,
                ..SolverParams::default()
            },
            SolverParams {
                inflow_velocity: -1.0,
                ..SolverParams::default()
            },
            SolverParams {
                inflow_velocity: f32::NAN,
                ..SolverParams::default()
            },
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(SimError::OutOfRange { .. })),
                "{params:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_positive_density_and_time_hint() {
        let cfg = SimConfig {
            density: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimError::OutOfRange { name: "density", .. })
        ));
        let cfg = SimConfig {
            time_hint: -0.1,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimError::OutOfRange { name: "time_hint", .. })
        ));
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let cfg = load(Path::new("definitely/not/here/mac_smoke.yaml"));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let err = load_from(Path::new("definitely/not/here/mac_smoke.yaml")).unwrap_err();
        assert!(matches!(err, SimError::Io { .. }));
    }
}
