use std::mem;

use crate::config::SimulationConfig;
use crate::stencil::{burgers_rhs, Grid2D};
use crate::types::{RomError, SnapshotSet};
use crate::utils::step_count;

/// Disc of uniform velocity centred in the domain, zero elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwirlInitialCondition {
    /// Squared radius of the disc in physical units.
    pub radius_sq: f64,
    /// Velocity (u, v) inside the disc.
    pub velocity: (f64, f64),
}

impl Default for SwirlInitialCondition {
    fn default() -> Self {
        Self {
            radius_sq: 0.05,
            velocity: (1.0, 1.0),
        }
    }
}

/// Explicit-stability indicators for a time step. Informational only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CflEstimate {
    /// ν dt (1/dx² + 1/dy²); the explicit diffusion limit is 1/2.
    pub diffusion_number: f64,
    /// max|u| dt/dx + max|v| dt/dy.
    pub courant_number: f64,
}

/// Explicit finite-difference solver for the 2D viscous Burgers equations
/// with homogeneous Dirichlet boundaries.
///
/// The state lives in two current buffers (`u`, `v`); each step writes the
/// staging buffers (`u_next`, `v_next`) and then swaps them in, so a stencil
/// never reads a value written during the same step. No stability check is
/// made: `dt` must satisfy the explicit CFL limits.
#[derive(Debug, Clone)]
pub struct FullOrderSolver {
    grid: Grid2D,
    viscosity: f64,
    dt: f64,
    final_time: f64,
    snapshot_interval: usize,
    initial: SwirlInitialCondition,
    u: Vec<f64>,
    v: Vec<f64>,
    u_next: Vec<f64>,
    v_next: Vec<f64>,
    time: f64,
    step: usize,
    snapshots: SnapshotSet,
}

impl FullOrderSolver {
    pub fn new(
        grid: Grid2D,
        viscosity: f64,
        dt: f64,
        final_time: f64,
        snapshot_interval: usize,
    ) -> Result<Self, RomError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(RomError::InvalidInput(format!("dt must be positive, got {dt}")));
        }
        if !(final_time.is_finite() && final_time > 0.0) {
            return Err(RomError::InvalidInput(format!(
                "final time must be positive, got {final_time}"
            )));
        }
        if snapshot_interval == 0 {
            return Err(RomError::InvalidInput(
                "snapshot interval must be at least 1".into(),
            ));
        }
        let len = grid.len();
        Ok(Self {
            grid,
            viscosity,
            dt,
            final_time,
            snapshot_interval,
            initial: SwirlInitialCondition::default(),
            u: vec![0.0; len],
            v: vec![0.0; len],
            u_next: vec![0.0; len],
            v_next: vec![0.0; len],
            time: 0.0,
            step: 0,
            snapshots: SnapshotSet::default(),
        })
    }

    pub fn from_config(cfg: &SimulationConfig) -> Result<Self, RomError> {
        Self::new(
            cfg.grid()?,
            cfg.viscosity,
            cfg.dt,
            cfg.final_time,
            cfg.snapshot_interval,
        )
    }

    pub fn with_initial_condition(mut self, initial: SwirlInitialCondition) -> Self {
        self.initial = initial;
        self
    }

    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    pub fn u(&self) -> &[f64] {
        &self.u
    }

    pub fn v(&self) -> &[f64] {
        &self.v
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    /// Number of steps `ceil(final_time / dt)` performed by [`run`](Self::run).
    pub fn n_steps(&self) -> usize {
        step_count(self.final_time, self.dt)
    }

    pub fn snapshots(&self) -> &SnapshotSet {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> SnapshotSet {
        self.snapshots
    }

    /// Stacked full state `[u; v]`.
    pub fn state(&self) -> Vec<f64> {
        let mut state = Vec::with_capacity(2 * self.grid.len());
        state.extend_from_slice(&self.u);
        state.extend_from_slice(&self.v);
        state
    }

    /// Set the swirl initial condition and reset time and stored snapshots.
    pub fn initialize(&mut self) {
        let grid = self.grid;
        let (cx, cy) = grid.coords(grid.nx - 1, grid.ny - 1);
        let (cx, cy) = (0.5 * cx, 0.5 * cy);

        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let id = grid.idx(i, j);
                let (x, y) = grid.coords(i, j);
                let r2 = (x - cx) * (x - cx) + (y - cy) * (y - cy);
                let inside = r2 < self.initial.radius_sq && !grid.is_boundary(i, j);
                (self.u[id], self.v[id]) = if inside {
                    self.initial.velocity
                } else {
                    (0.0, 0.0)
                };
            }
        }
        self.u_next.fill(0.0);
        self.v_next.fill(0.0);
        self.time = 0.0;
        self.step = 0;
        self.snapshots = SnapshotSet::default();
    }

    /// Advance one explicit step: central-difference convection and diffusion
    /// on interior nodes, zero on the boundary, then swap buffers.
    pub fn step_explicit(&mut self) {
        let grid = self.grid;
        for j in 1..grid.ny - 1 {
            for i in 1..grid.nx - 1 {
                let id = grid.idx(i, j);
                let (ru, rv) = burgers_rhs(&self.u, &self.v, &grid, self.viscosity, i, j);
                self.u_next[id] = self.u[id] + self.dt * ru;
                self.v_next[id] = self.v[id] + self.dt * rv;
            }
        }
        for id in grid.boundary_indices() {
            self.u_next[id] = 0.0;
            self.v_next[id] = 0.0;
        }

        mem::swap(&mut self.u, &mut self.u_next);
        mem::swap(&mut self.v, &mut self.v_next);
        self.step += 1;
        self.time = self.step as f64 * self.dt;
    }

    /// Record the current `[u; v]` as a snapshot at `time`.
    pub fn store_snapshot(&mut self, time: f64) {
        let state = self.state();
        self.snapshots.push(time, state);
        tracing::debug!(step = self.step, time, "snapshot stored");
    }

    /// Initialize, integrate to the final time and collect snapshots.
    ///
    /// Snapshots are taken at t = 0, after every `snapshot_interval` steps and
    /// at the final time; the final one is skipped when the last step already
    /// produced an interval snapshot.
    pub fn run(&mut self) -> &SnapshotSet {
        self.initialize();
        self.store_snapshot(0.0);

        let steps = self.n_steps();
        tracing::debug!(
            steps,
            dt = self.dt,
            cfl = ?self.cfl_estimate(),
            "starting full-order solve"
        );

        let mut last_stored = 0;
        for s in 1..=steps {
            self.step_explicit();
            if s % self.snapshot_interval == 0 {
                self.store_snapshot(s as f64 * self.dt);
                last_stored = s;
            }
        }
        if last_stored != steps {
            self.store_snapshot(self.final_time);
        }

        tracing::info!(
            steps,
            snapshots = self.snapshots.len(),
            dim = 2 * self.grid.len(),
            "full-order solve finished"
        );
        &self.snapshots
    }

    /// Stability indicators for the current state and `dt`.
    pub fn cfl_estimate(&self) -> CflEstimate {
        let max_abs = |f: &[f64]| f.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        let (dx, dy) = (self.grid.dx, self.grid.dy);
        CflEstimate {
            diffusion_number: self.viscosity * self.dt * (1.0 / (dx * dx) + 1.0 / (dy * dy)),
            courant_number: max_abs(&self.u) * self.dt / dx + max_abs(&self.v) * self.dt / dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f64, b: f64, eps: f64) {
        assert!(
            (a - b).abs() < eps,
            "expected {a} ≈ {b} (diff = {})",
            (a - b).abs()
        );
    }

    fn solver(final_time: f64, interval: usize) -> FullOrderSolver {
        let grid = Grid2D::new(10, 10, 1.0, 1.0).unwrap();
        FullOrderSolver::new(grid, 0.01, 0.01, final_time, interval).unwrap()
    }

    #[test]
    fn test_initial_swirl() {
        let mut s = solver(0.1, 5);
        s.initialize();
        let grid = *s.grid();
        let center = grid.idx(4, 4);
        assert_eq!(s.u()[center], 1.0);
        assert_eq!(s.v()[center], 1.0);
        assert_eq!(s.u()[grid.idx(1, 1)], 0.0);
        for id in grid.boundary_indices() {
            assert_eq!(s.u()[id], 0.0);
        }
    }

    #[test]
    fn test_boundary_zero_after_every_step() {
        let mut s = solver(0.1, 5);
        s.initialize();
        let grid = *s.grid();
        for _ in 0..10 {
            s.step_explicit();
            for id in grid.boundary_indices() {
                assert_eq!(s.u()[id], 0.0);
                assert_eq!(s.v()[id], 0.0);
            }
        }
        assert_eq!(s.step_index(), 10);
        assert_near(s.time(), 0.1, 1e-12);
    }

    #[test]
    fn test_snapshot_schedule_dedups_final() {
        let mut s = solver(0.1, 5);
        let snaps = s.run();
        assert_eq!(snaps.len(), 3);
        assert_near(snaps.times[0], 0.0, 1e-15);
        assert_near(snaps.times[1], 0.05, 1e-12);
        assert_near(snaps.times[2], 0.1, 1e-12);
    }

    #[test]
    fn test_snapshot_schedule_adds_final() {
        let mut s = solver(0.1, 4);
        let snaps = s.run();
        // t = 0, steps 4 and 8, final at step 10
        assert_eq!(snaps.len(), 4);
        assert_near(*snaps.times.last().unwrap(), 0.1, 1e-12);
    }

    #[test]
    fn test_flow_decays_under_diffusion() {
        let grid = Grid2D::new(10, 10, 1.0, 1.0).unwrap();
        let mut s = FullOrderSolver::new(grid, 0.2, 0.01, 0.1, 1).unwrap();
        let snaps = s.run().clone();
        let energy = |state: &Vec<f64>| state.iter().map(|x| x * x).sum::<f64>();
        let first = energy(&snaps.states[0]);
        let last = energy(snaps.states.last().unwrap());
        assert!(last < first, "energy grew: {first} -> {last}");
        assert_eq!(snaps.states[0].len(), 200);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let grid = Grid2D::new(5, 5, 1.0, 1.0).unwrap();
        assert!(FullOrderSolver::new(grid, 0.1, 0.0, 1.0, 1).is_err());
        assert!(FullOrderSolver::new(grid, 0.1, 0.1, 1.0, 0).is_err());
        assert!(FullOrderSolver::new(grid, 0.1, 0.1, -1.0, 1).is_err());
    }

    #[test]
    fn test_cfl_estimate() {
        let mut s = solver(0.1, 5);
        s.initialize();
        let cfl = s.cfl_estimate();
        let dx = 1.0 / 9.0;
        assert_near(cfl.diffusion_number, 0.01 * 0.01 * 2.0 / (dx * dx), 1e-12);
        assert_near(cfl.courant_number, 2.0 * 0.01 / dx, 1e-12);
    }
}
