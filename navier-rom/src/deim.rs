//! Discrete Empirical Interpolation Method.
//!
//! A nonlinear term `N(u)` is approximated as `Uf (PᵀUf)⁻¹ PᵀN(u)`, where `Uf`
//! is a POD basis of nonlinear snapshots and `P` selects `kf` rows of the
//! state. The approximation reproduces `N(u)` exactly at the selected rows.
//!
//! The snapshot source, the nonlinear term and the row selection are all
//! pluggable. The defaults reuse the state snapshots as nonlinear snapshots and
//! select the leading `kf` rows.

use std::collections::HashSet;
use std::fmt::Debug;

use faer::Mat;

use crate::galerkin::{GalerkinProjector, RhsOperator};
use crate::pod::extract_basis;
use crate::types::{RomError, TimeIntegration};
use crate::utils::{check_length, mat_vec, norm2, thin_svd, DenseLu};

/// Smallest admissible singular value of PᵀUf relative to the largest column
/// norm of Uf (1 for an orthonormal basis).
const SAMPLED_RCOND: f64 = 1e-10;

/// Pointwise nonlinearity `N(u)`.
pub trait NonlinearTerm: Debug {
    fn apply(&self, u: &[f64]) -> Vec<f64>;
}

/// `N(u) = u²` elementwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Square;

impl NonlinearTerm for Square {
    fn apply(&self, u: &[f64]) -> Vec<f64> {
        u.iter().map(|v| v * v).collect()
    }
}

/// Where the nonlinear snapshots used to build `Uf` come from.
pub trait NonlinearSnapshotSource: Debug {
    fn snapshots(&self, states: &Mat<f64>, term: &dyn NonlinearTerm)
        -> Result<Mat<f64>, RomError>;
}

/// Use the state snapshots themselves as stand-in nonlinear snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateSnapshots;

impl NonlinearSnapshotSource for StateSnapshots {
    fn snapshots(
        &self,
        states: &Mat<f64>,
        _term: &dyn NonlinearTerm,
    ) -> Result<Mat<f64>, RomError> {
        Ok(states.clone())
    }
}

/// Apply the nonlinear term to every state snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluatedSnapshots;

impl NonlinearSnapshotSource for EvaluatedSnapshots {
    fn snapshots(
        &self,
        states: &Mat<f64>,
        term: &dyn NonlinearTerm,
    ) -> Result<Mat<f64>, RomError> {
        let (n, m) = (states.nrows(), states.ncols());
        let mut out = Mat::<f64>::zeros(n, m);
        for j in 0..m {
            let col: Vec<f64> = (0..n).map(|i| states[(i, j)]).collect();
            let nl = term.apply(&col);
            check_length(&nl, n)?;
            for (i, v) in nl.into_iter().enumerate() {
                out[(i, j)] = v;
            }
        }
        Ok(out)
    }
}

/// Strategy choosing the interpolation rows for a DEIM basis.
pub trait IndexSelection: Debug {
    /// Return `basis.ncols()` distinct row indices.
    fn select(&self, basis: &Mat<f64>) -> Result<Vec<usize>, RomError>;
}

/// Rows `0..kf`, regardless of the basis.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingIndices;

impl IndexSelection for LeadingIndices {
    fn select(&self, basis: &Mat<f64>) -> Result<Vec<usize>, RomError> {
        Ok((0..basis.ncols()).collect())
    }
}

/// Greedy selection: each new row maximises the interpolation residual of the
/// next basis vector against the rows chosen so far.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyDeim;

impl IndexSelection for GreedyDeim {
    fn select(&self, basis: &Mat<f64>) -> Result<Vec<usize>, RomError> {
        let (n, k) = (basis.nrows(), basis.ncols());
        let mut indices = Vec::with_capacity(k);
        if k == 0 {
            return Ok(indices);
        }

        let first: Vec<f64> = (0..n).map(|i| basis[(i, 0)]).collect();
        indices.push(argmax_abs(&first));

        for l in 1..k {
            // Interpolate column l from the first l columns at the chosen rows
            let mut sampled = Mat::<f64>::zeros(l, l);
            for (r, &row) in indices.iter().enumerate() {
                for c in 0..l {
                    sampled[(r, c)] = basis[(row, c)];
                }
            }
            let rhs: Vec<f64> = indices.iter().map(|&row| basis[(row, l)]).collect();
            let coeffs = DenseLu::factor(&sampled)?.solve(&rhs)?;

            let residual: Vec<f64> = (0..n)
                .map(|i| {
                    let fit: f64 = (0..l).map(|c| basis[(i, c)] * coeffs[c]).sum();
                    basis[(i, l)] - fit
                })
                .collect();
            indices.push(argmax_abs(&residual));
        }

        Ok(indices)
    }
}

fn argmax_abs(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, x) in v.iter().enumerate() {
        if x.abs() > v[best].abs() {
            best = i;
        }
    }
    best
}

/// Trained DEIM data: the nonlinear basis, the sampled rows and the factored
/// `PᵀUf` system.
#[derive(Debug, Clone)]
pub struct DeimSelection {
    basis: Mat<f64>,
    indices: Vec<usize>,
    sampled_lu: DenseLu,
}

impl DeimSelection {
    /// Validate the indices and factor `PᵀUf`.
    ///
    /// PᵀUf is rejected as `SingularSystem` when its smallest singular value
    /// is below `SAMPLED_RCOND` times the scale of Uf, so rows of Uf that are
    /// zero up to round-off never yield an interpolant.
    pub fn new(basis: Mat<f64>, indices: Vec<usize>) -> Result<Self, RomError> {
        let (n, k) = (basis.nrows(), basis.ncols());
        if k == 0 {
            return Err(RomError::InvalidInput("DEIM basis has no columns".into()));
        }
        if indices.len() != k {
            return Err(RomError::InvalidInput(format!(
                "expected {k} interpolation indices, got {}",
                indices.len()
            )));
        }
        let mut seen = HashSet::with_capacity(k);
        for &idx in &indices {
            if idx >= n {
                return Err(RomError::InvalidInput(format!(
                    "interpolation index {idx} out of range for dimension {n}"
                )));
            }
            if !seen.insert(idx) {
                return Err(RomError::InvalidInput(format!(
                    "duplicate interpolation index {idx}"
                )));
            }
        }

        let mut sampled = Mat::<f64>::zeros(k, k);
        for (r, &row) in indices.iter().enumerate() {
            for c in 0..k {
                sampled[(r, c)] = basis[(row, c)];
            }
        }
        let scale = (0..k)
            .map(|c| norm2(&(0..n).map(|i| basis[(i, c)]).collect::<Vec<_>>()))
            .fold(0.0_f64, f64::max);
        let (_, sigma) = thin_svd(&sampled)?;
        let sigma_min = sigma.iter().copied().fold(f64::INFINITY, f64::min);
        if !(sigma_min > scale * SAMPLED_RCOND) {
            return Err(RomError::SingularSystem(format!(
                "PᵀUf is numerically singular for indices {indices:?}: \
                 smallest singular value {sigma_min:.3e}"
            )));
        }
        let sampled_lu =
            DenseLu::factor_with_tolerance(&sampled, scale * k as f64 * f64::EPSILON)?;

        Ok(Self {
            basis,
            indices,
            sampled_lu,
        })
    }

    /// Nonlinear basis Uf (n × kf).
    pub fn basis(&self) -> &Mat<f64> {
        &self.basis
    }

    /// Interpolation row indices.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Explicit selection matrix P (n × kf), one unit entry per column.
    pub fn selection_matrix(&self) -> Mat<f64> {
        let mut p = Mat::<f64>::zeros(self.basis.nrows(), self.indices.len());
        for (c, &row) in self.indices.iter().enumerate() {
            p[(row, c)] = 1.0;
        }
        p
    }

    /// `Uf (PᵀUf)⁻¹ Pᵀ values`.
    pub fn interpolate(&self, values: &[f64]) -> Result<Vec<f64>, RomError> {
        check_length(values, self.basis.nrows())?;
        let sampled: Vec<f64> = self.indices.iter().map(|&i| values[i]).collect();
        let alpha = self.sampled_lu.solve(&sampled)?;
        Ok(mat_vec(&self.basis, &alpha))
    }
}

/// Right-hand side that replaces `N(u)` by its DEIM approximation.
#[derive(Debug)]
pub struct DeimEvaluator {
    n_modes: usize,
    term: Box<dyn NonlinearTerm>,
    source: Box<dyn NonlinearSnapshotSource>,
    selection: Box<dyn IndexSelection>,
    trained: Option<DeimSelection>,
}

impl DeimEvaluator {
    /// `N(u) = u²`, state snapshots as nonlinear snapshots, leading indices.
    pub fn new(n_modes: usize) -> Self {
        Self {
            n_modes,
            term: Box::new(Square),
            source: Box::new(StateSnapshots),
            selection: Box::new(LeadingIndices),
            trained: None,
        }
    }

    pub fn with_term(mut self, term: impl NonlinearTerm + 'static) -> Self {
        self.term = Box::new(term);
        self
    }

    pub fn with_source(mut self, source: impl NonlinearSnapshotSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn with_selection(mut self, selection: impl IndexSelection + 'static) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Requested number of DEIM modes kf.
    pub fn requested_modes(&self) -> usize {
        self.n_modes
    }

    /// Trained selection, if any.
    pub fn selection(&self) -> Option<&DeimSelection> {
        self.trained.as_ref()
    }

    /// Exact nonlinear term `N(u)`.
    pub fn exact(&self, u: &[f64]) -> Vec<f64> {
        self.term.apply(u)
    }

    /// Build Uf and the interpolation indices from `states`.
    ///
    /// Any previous selection is discarded first, so a failed fit leaves the
    /// evaluator untrained.
    pub fn fit(&mut self, states: &Mat<f64>) -> Result<&DeimSelection, RomError> {
        self.trained = None;
        let nonlinear = self.source.snapshots(states, self.term.as_ref())?;
        let basis = extract_basis(&nonlinear, self.n_modes)?;
        let indices = self.selection.select(&basis.modes)?;
        let selection = DeimSelection::new(basis.modes, indices)?;
        tracing::info!(
            modes = selection.indices().len(),
            requested = self.n_modes,
            indices = ?selection.indices(),
            "DEIM interpolation built"
        );
        Ok(&*self.trained.insert(selection))
    }
}

impl RhsOperator for DeimEvaluator {
    fn label(&self) -> &'static str {
        "deim"
    }

    fn prepare(&mut self, snapshots: &Mat<f64>) -> Result<(), RomError> {
        self.fit(snapshots).map(|_| ())
    }

    fn evaluate(&self, u: &[f64]) -> Result<Vec<f64>, RomError> {
        let selection = self
            .trained
            .as_ref()
            .ok_or(RomError::NotTrained("DEIM interpolator"))?;
        check_length(u, selection.basis().nrows())?;
        selection.interpolate(&self.term.apply(u))
    }
}

/// Galerkin projector whose right-hand side is a DEIM approximation.
pub type Deim = GalerkinProjector<DeimEvaluator>;

impl GalerkinProjector<DeimEvaluator> {
    /// DEIM model with `n_modes` state modes and `n_nonlinear_modes` DEIM modes.
    pub fn deim(n_modes: usize, n_nonlinear_modes: usize, integration: TimeIntegration) -> Self {
        Self::new(n_modes, DeimEvaluator::new(n_nonlinear_modes), integration)
    }
}
