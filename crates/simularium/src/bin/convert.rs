// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! simularium-convert - Filter and rewrite `.simularium` trajectories.
//!
//! Usage:
//!   simularium-convert --input run.simularium --output run_small
//!   simularium-convert --input run.simularium --output run_small --config filters.json
//!   simularium-convert --input old_v1.simularium --output upgraded --every-nth-timestep 10

use clap::Parser;
use simularium::{config::ConvertConfig, filter::FilterSpec, TrajectoryConverter};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "simularium-convert")]
#[command(about = "Filter and rewrite .simularium trajectories")]
#[command(version)]
struct Args {
    /// Input .simularium file (any supported version)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path (".simularium" is appended unless present)
    #[arg(short, long)]
    output: PathBuf,

    /// JSON conversion config (filter chain and options)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep every Nth frame (appended after configured filters)
    #[arg(long)]
    every_nth_timestep: Option<usize>,

    /// Multiply spatial values (appended after configured filters)
    #[arg(long)]
    multiply_space: Option<f64>,

    /// Add a per-type agent count plot
    #[arg(long)]
    agents_plot: bool,

    /// Check agent IDs before writing
    #[arg(long)]
    validate_ids: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging; RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = match &args.config {
        Some(path) => ConvertConfig::from_file(path)?,
        None => ConvertConfig::default(),
    };
    if let Some(n) = args.every_nth_timestep {
        config.filters.push(FilterSpec::EveryNthTimestep { n });
    }
    if let Some(multiplier) = args.multiply_space {
        config.filters.push(FilterSpec::MultiplySpace { multiplier });
    }
    config.validate_ids |= args.validate_ids;
    config.number_of_agents_plot |= args.agents_plot;

    info!("Simularium converter v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {}", args.input.display());

    let filters = config.build_filters()?;
    let mut converter =
        TrajectoryConverter::from_simularium_file(&args.input)?.validate_ids(config.validate_ids);
    info!(
        "Loaded {} frames, {} types",
        converter.data().agent_data.n_timesteps(),
        converter.data().agent_data.get_type_names().len()
    );

    converter.apply_filters(&filters)?;
    if config.number_of_agents_plot {
        converter.add_number_of_agents_plot()?;
    }

    let written = converter.write_json(&args.output)?;
    info!("Done: {}", written.display());
    Ok(())
}
