//! # navier-rom
//!
//! Reduced-order models for a 2D viscous Burgers velocity field, trained on
//! snapshots from an explicit full-order finite-difference solver.
//!
//! - **POD** ([`Pod`]): truncated SVD basis of a snapshot matrix
//! - **Galerkin projection** ([`GalerkinProjector`]): dynamics `Φᵀ f(Φa)` with an
//!   injectable right-hand side ([`RhsOperator`]) and explicit Euler stepping
//! - **DEIM** ([`Deim`]): Galerkin projector whose nonlinear term is
//!   interpolated from a few sampled rows
//! - **DMD** ([`Dmd`]): linear one-step propagator `A = X₂ X₁⁺`
//! - **Full-order solver** ([`FullOrderSolver`]): explicit central differences
//!   with Dirichlet boundaries, producing the training snapshots
//! - **Online solver** ([`ReducedOnlineSolver`]): reduced integration over an
//!   externally configured horizon
//!
//! ## Quick Start
//!
//! ```rust
//! use navier_rom::{
//!     BurgersResidual, FullOrderSolver, GalerkinProjector, Grid2D, ReducedOnlineSolver,
//!     ReducedOrderModel, TimeIntegration,
//! };
//!
//! let grid = Grid2D::new(12, 12, 1.0, 1.0).unwrap();
//! let mut solver = FullOrderSolver::new(grid, 0.05, 0.002, 0.05, 5).unwrap();
//! let snapshots = solver.run().to_matrix().unwrap();
//!
//! let integration = TimeIntegration::to_final_time(0.002, 0.05).unwrap();
//! let mut rom = GalerkinProjector::new(4, BurgersResidual::new(grid, 0.05), integration);
//! rom.train(&snapshots).unwrap();
//!
//! let x0: Vec<f64> = (0..snapshots.nrows()).map(|i| snapshots[(i, 0)]).collect();
//! let online = ReducedOnlineSolver::new(&rom, 0.002, 0.05).unwrap();
//! let approx = online.run(&x0).unwrap();
//! assert_eq!(approx.len(), x0.len());
//! ```

pub mod config;
pub mod io;
pub mod model;
pub mod stencil;
pub mod types;

pub mod burgers;
pub mod deim;
pub mod dmd;
pub mod galerkin;
pub mod pod;
pub mod solver;
pub mod utils;

pub use burgers::BurgersResidual;
pub use config::SimulationConfig;
pub use deim::{
    Deim, DeimEvaluator, DeimSelection, EvaluatedSnapshots, GreedyDeim, IndexSelection,
    LeadingIndices, NonlinearSnapshotSource, NonlinearTerm, Square, StateSnapshots,
};
pub use dmd::Dmd;
pub use galerkin::{GalerkinProjector, LinearDecay, RhsOperator};
pub use io::{parse_snapshot_matrix, read_snapshot_matrix, write_snapshot_matrix, write_vector};
pub use model::ReducedOrderModel;
pub use pod::Pod;
pub use solver::offline::CflEstimate;
pub use solver::{FullOrderSolver, ReducedOnlineSolver, SwirlInitialCondition};
pub use stencil::Grid2D;
pub use types::{Basis, RomError, SnapshotSet, TimeIntegration};
