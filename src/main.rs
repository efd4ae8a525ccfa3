//! `timetable` command: load a config, generate grids, print or export them.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use timetable_core::export::export_timetables;
use timetable_core::model::diagnose_infeasibility;
use timetable_core::{GenerationPolicy, MultiSolutionGenerator, ScheduleSpec, TimetableConfig};

/// Generate candidate weekly timetables for one section.
#[derive(Debug, Parser)]
#[command(name = "timetable", version)]
struct Cli {
    /// JSON or TOML config file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of timetables to generate.
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Write timetable_<n>.xlsx files under <OUT>/<SESSION>.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Session directory name for exported files.
    #[arg(long, default_value = "default")]
    session: String,

    /// Master seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the generated grids as JSON instead of text tables.
    #[arg(long)]
    json: bool,

    /// When nothing is found, re-solve with each rule group disabled.
    #[arg(long)]
    diagnose: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TimetableConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TimetableConfig::default(),
    };
    if let Some(n) = cli.count {
        config.num_timetables = n;
    }
    let policy = GenerationPolicy::from(&config.solver);
    let spec = ScheduleSpec::from_config(&config).context("invalid configuration")?;

    let generator = MultiSolutionGenerator::new(&spec, policy.clone());
    let report = match cli.seed {
        Some(seed) => generator.generate_with_seed(seed)?,
        None => generator.generate()?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.timetables)?);
    } else {
        for (i, grid) in report.timetables.iter().enumerate() {
            println!("TIMETABLE VERSION {}\n", i + 1);
            println!("{}", grid.render_text(spec.timeslots()));
        }
    }
    info!(
        generated = report.timetables.len(),
        target = spec.num_timetables(),
        attempts = report.attempts,
        "generation finished"
    );

    if report.timetables.is_empty() {
        error!("no feasible timetable found; try adjusting the constraints");
        if cli.diagnose {
            for row in diagnose_infeasibility(&spec, &policy.solve, 1) {
                println!("{:?} => {:?}", row.groups, row.status);
            }
        }
    }

    if let Some(out) = &cli.out {
        let written = export_timetables(&report.timetables, &spec, out, &cli.session)
            .context("exporting timetables")?;
        for path in written {
            println!("saved {}", path.display());
        }
    }

    Ok(())
}
