use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use mac_smoke::{
    frame_path, pressure_to_rgba, smoke_to_rgba, write_png, Config, FrameField, SmokeSim,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FieldArg {
    Smoke,
    Pressure,
}

impl From<FieldArg> for FrameField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Smoke => FrameField::Smoke,
            FieldArg::Pressure => FrameField::Pressure,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "mac_smoke")]
#[command(about = "Headless staggered-grid smoke tunnel, dumped as PNG frames", long_about = None)]
struct Args {
    /// YAML config; missing file means defaults
    #[arg(long, default_value = "mac_smoke.yaml")]
    config: PathBuf,

    /// Ticks to run
    #[arg(long)]
    ticks: Option<usize>,

    /// Frame output directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write a frame every N ticks (0 disables)
    #[arg(long)]
    every: Option<usize>,

    #[arg(long, value_enum)]
    field: Option<FieldArg>,

    /// Inlet strength as a fraction of the maximum
    #[arg(long)]
    inflow: Option<f32>,
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(out) = &args.out {
        config.run.output_dir = out.clone();
    }
    if let Some(every) = args.every {
        config.run.frame_every = every;
    }
    if let Some(field) = args.field {
        config.run.field = field.into();
    }
}

fn write_frame(sim: &SmokeSim, config: &Config, rgba: &mut Vec<u8>) -> Result<()> {
    let field = config.run.field;
    let grid = sim.grid();
    match field {
        FrameField::Smoke => smoke_to_rgba(sim.smoke(), rgba),
        FrameField::Pressure => pressure_to_rgba(sim.pressure(), rgba),
    }
    let path = frame_path(&config.run.output_dir, field, sim.ticks());
    write_png(&path, rgba, grid.width(), grid.height())
        .with_context(|| format!("writing frame {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = mac_smoke::load(&args.config);
    apply_overrides(&mut config, &args);

    let mut sim = SmokeSim::new(config.sim).context("invalid simulation config")?;
    if let Some(fraction) = args.inflow {
        sim.set_inflow_fraction(fraction);
    }

    let every = config.run.frame_every;
    if every > 0 {
        std::fs::create_dir_all(&config.run.output_dir).with_context(|| {
            format!("creating output dir {}", config.run.output_dir.display())
        })?;
    }

    let mut rgba = Vec::new();
    let mut frames = 0usize;
    let start = Instant::now();
    for _ in 0..config.run.ticks {
        sim.step_nominal();
        if every > 0 && sim.ticks() % every as u64 == 0 {
            write_frame(&sim, &config, &mut rgba)?;
            frames += 1;
        }
    }

    let stats = sim.stats();
    info!(
        "{} ticks of {:.4}s in {:.2?}, {frames} frames; max |vel| {:.3}, sum |div| {:.3e}",
        stats.tick,
        sim.config().time_hint,
        start.elapsed(),
        stats.max_speed,
        stats.divergence,
    );
    if !sim.is_finite() {
        anyhow::bail!("simulation blew up after {} ticks", stats.tick);
    }
    Ok(())
}
