use std::{
    io::{ self, Write },
    path::PathBuf,
};
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use free_fermion_sim::config::Config;

/// Evaluate a free-fermion correlation function over a parameter grid.
///
/// Output is one line per grid point: the swept value followed by the real
/// and imaginary parts of the result (or only the real part with --real).
#[derive(Parser, Debug)]
#[command(name = "correlate")]
struct Args {
    /// Path to the TOML run configuration
    config: PathBuf,

    /// Number of worker threads; overrides the configuration file
    #[arg(short, long)]
    threads: Option<usize>,

    /// Print the single-particle spectrum before the results
    #[arg(long)]
    spectrum: bool,

    /// Print only real parts, failing on any non-negligible imaginary part
    #[arg(long)]
    real: bool,

    /// Tolerance on imaginary parts for --real
    #[arg(long, default_value = "1e-10")]
    tol: f64,
}

fn main() -> anyhow::Result<()> {
    let filter
        = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config
        = Config::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let basis = config.basis().context("failed to diagonalize hopping matrix")?;
    info!(
        modes = basis.len(),
        flavors = basis.flavors(),
        counts = ?config.particles.counts,
        "built single-particle basis",
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.spectrum {
        for (m, e) in basis.energies().iter().enumerate() {
            writeln!(out, "# mode {:>4} {:+.10e}", m, e)?;
        }
    }

    let grid = config.sweep.grid()?;
    let threads = args.threads.or(config.sweep.threads);
    let rows = grid.run(
        &basis,
        &config.particles.counts,
        &config.observable,
        &config.sweep.base_probe(),
        config.sweep.strategy,
        threads,
    )?;
    for row in rows.iter() {
        if args.real {
            let value = row.real(args.tol)
                .with_context(|| format!("at grid point {}", row.x))?;
            writeln!(out, "{:+.10e} {:+.10e}", row.x, value)?;
        } else {
            writeln!(out, "{}", row)?;
        }
    }
    Ok(())
}
