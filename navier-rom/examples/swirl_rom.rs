//! Swirl example: full-order Burgers snapshots compressed with POD, DMD and a
//! Galerkin model.

use navier_rom::utils::relative_error;
use navier_rom::{
    BurgersResidual, Dmd, FullOrderSolver, GalerkinProjector, Grid2D, ReducedOnlineSolver,
    ReducedOrderModel, TimeIntegration,
};

fn main() {
    let grid = Grid2D::new(24, 24, 1.0, 1.0).unwrap();
    let (nu, dt, final_time) = (0.02, 0.002, 0.2);

    let mut solver = FullOrderSolver::new(grid, nu, dt, final_time, 5).unwrap();
    let snapshots = solver.run().clone();
    let x = snapshots.to_matrix().unwrap();

    println!("Full-order solve");
    println!("  Grid: {} x {}", grid.nx, grid.ny);
    println!("  Snapshots: {} of dimension {}", x.ncols(), x.nrows());

    let integration = TimeIntegration::to_final_time(dt, final_time).unwrap();
    let mut rom = GalerkinProjector::new(6, BurgersResidual::new(grid, nu), integration);
    rom.train(&x).unwrap();

    let basis = rom.pod().basis().unwrap();
    println!("\nPOD basis");
    for (k, s) in basis.singular_values.iter().enumerate() {
        println!("  Mode {k}: sigma = {s:.4e}");
    }
    println!("  Energy captured: {:.6}", basis.energy_fraction());

    let online = ReducedOnlineSolver::new(&rom, dt, final_time).unwrap();
    let reduced = online.run(&snapshots.states[0]).unwrap();
    let truth = snapshots.states.last().unwrap();
    println!("\nGalerkin online solve");
    println!("  Relative error at t = {final_time}: {:.4e}", relative_error(&reduced, truth));

    let mut dmd = Dmd::new();
    dmd.train(&x).unwrap();
    let n = snapshots.len();
    let one_step = dmd.predict(&snapshots.states[n - 2]).unwrap();
    println!("\nDMD");
    println!(
        "  One-step error on last pair: {:.4e}",
        relative_error(&one_step, &snapshots.states[n - 1])
    );
}
