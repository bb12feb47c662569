//! Offline/online 2D Burgers run: full-order solve, snapshot file, POD-Galerkin
//! training and a reduced solve compared against the full-order final state.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use navier_rom::utils::relative_error;
use navier_rom::{
    write_snapshot_matrix, BurgersResidual, FullOrderSolver, GalerkinProjector,
    ReducedOnlineSolver, ReducedOrderModel, SimulationConfig,
};
use navier_rom_cli::{init_logging, parse_or_exit, write_output};

/// 2D Burgers offline/online reduced-order run
#[derive(Parser)]
#[command(name = "navier2d")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Full-order Burgers solve followed by a POD-Galerkin reduced solve", long_about = None)]
struct Cli {
    /// Simulation configuration file
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli: Cli = parse_or_exit();
    init_logging(&cli.log_level)?;

    let cfg = SimulationConfig::from_file(&cli.config)
        .with_context(|| format!("reading configuration {}", cli.config.display()))?;
    let grid = cfg.grid()?;
    info!(
        nx = cfg.nx,
        ny = cfg.ny,
        dt = cfg.dt,
        final_time = cfg.final_time,
        steps = cfg.n_steps(),
        "configuration loaded"
    );

    // Offline
    let start = Instant::now();
    let mut solver = FullOrderSolver::from_config(&cfg)?;
    let snapshots = solver.run().clone();
    let x = snapshots.to_matrix()?;
    info!(
        snapshots = snapshots.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "offline solve complete"
    );

    // Failure to write the snapshot file does not stop the online stage
    match write_snapshot_matrix(&cfg.snapshot_file, &x) {
        Ok(()) => info!(path = %cfg.snapshot_file.display(), "snapshots written"),
        Err(e) => tracing::error!(error = %e, "cannot write snapshot file"),
    }

    // Online
    let integration = cfg.time_integration()?;
    let mut rom = GalerkinProjector::new(
        cfg.num_pod_modes,
        BurgersResidual::new(grid, cfg.viscosity),
        integration,
    );
    rom.train(&x).context("training POD-Galerkin model")?;

    let start = Instant::now();
    let online = ReducedOnlineSolver::from_config(&cfg, &rom)?;
    let initial = &snapshots.states[0];
    let reduced = online.run(initial)?;
    let reference = snapshots
        .states
        .last()
        .context("offline solve produced no snapshots")?;
    info!(
        modes = rom.pod().trained_basis()?.rank(),
        relative_error = relative_error(&reduced, reference),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "online solve complete"
    );

    let mut out = cfg.snapshot_file.clone();
    out.set_file_name("rom_final.txt");
    write_output(&out, &reduced);
    Ok(())
}
