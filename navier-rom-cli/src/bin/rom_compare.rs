//! Train POD, Galerkin, DEIM and DMD models on a snapshot file and write each
//! model's prediction from the first snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use navier_rom::{
    read_snapshot_matrix, DeimEvaluator, Dmd, GalerkinProjector, GreedyDeim, LinearDecay, Pod,
    ReducedOrderModel, SimulationConfig, TimeIntegration,
};
use navier_rom_cli::{init_logging, parse_or_exit, write_output};

/// DEIM interpolation row selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Selection {
    /// First kf rows
    Leading,
    /// Greedy residual maximisation
    Greedy,
}

/// Compare reduced-order models trained on a snapshot matrix
#[derive(Parser)]
#[command(name = "rom-compare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train POD/Galerkin/DEIM/DMD on snapshots and write predictions", long_about = None)]
struct Cli {
    /// Snapshot matrix file (`n m` header, then n rows of m values)
    snapshot_file: PathBuf,

    /// Number of POD modes
    #[arg(default_value_t = 5)]
    num_modes: usize,

    /// Number of DEIM modes
    #[arg(long, default_value_t = 3)]
    deim_modes: usize,

    /// Reduced time step (ignored with --config)
    #[arg(long, default_value_t = 0.01)]
    dt: f64,

    /// Reduced step count (ignored with --config)
    #[arg(long, default_value_t = 100)]
    steps: usize,

    /// Simulation configuration providing dt and final time
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// DEIM interpolation index selection
    #[arg(long, value_enum, default_value_t = Selection::Leading)]
    deim_selection: Selection,

    /// Directory for results_*.txt
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli: Cli = parse_or_exit();
    init_logging(&cli.log_level)?;

    let x = read_snapshot_matrix(&cli.snapshot_file)
        .with_context(|| format!("loading {}", cli.snapshot_file.display()))?;
    info!(rows = x.nrows(), cols = x.ncols(), "loaded snapshots");
    let initial: Vec<f64> = (0..x.nrows()).map(|i| x[(i, 0)]).collect();

    let integration = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)
            .and_then(|cfg| cfg.time_integration())
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => TimeIntegration::new(cli.dt, cli.steps)?,
    };
    info!(
        dt = integration.dt,
        steps = integration.n_steps,
        "reduced time integration"
    );

    let deim_rhs = match cli.deim_selection {
        Selection::Leading => DeimEvaluator::new(cli.deim_modes),
        Selection::Greedy => DeimEvaluator::new(cli.deim_modes).with_selection(GreedyDeim),
    };

    let mut models: Vec<Box<dyn ReducedOrderModel>> = vec![
        Box::new(Pod::new(cli.num_modes)),
        Box::new(GalerkinProjector::new(cli.num_modes, LinearDecay, integration)),
        Box::new(GalerkinProjector::new(cli.num_modes, deim_rhs, integration)),
        Box::new(Dmd::new()),
    ];

    // Write each result as soon as it is predicted
    let mut failed = 0;
    if !write_output(&cli.output_dir.join("results_initial.txt"), &initial) {
        failed += 1;
    }
    for model in models.iter_mut() {
        model
            .train(&x)
            .with_context(|| format!("training {}", model.name()))?;
        let prediction = model
            .predict(&initial)
            .with_context(|| format!("predicting with {}", model.name()))?;
        let path = cli.output_dir.join(format!("results_{}.txt", model.name()));
        if !write_output(&path, &prediction) {
            failed += 1;
        }
    }

    if failed > 0 {
        warn!(failed, "some outputs could not be written");
    }
    info!("done; plot results_*.txt for comparison");
    Ok(())
}
