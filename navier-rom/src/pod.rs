use faer::Mat;

use crate::model::ReducedOrderModel;
use crate::types::{Basis, RomError};
use crate::utils::{check_length, mat_t_vec, mat_vec, numerical_rank, thin_svd, validate_matrix};

/// Proper Orthogonal Decomposition: a truncated left-singular basis.
#[derive(Debug, Clone)]
pub struct Pod {
    n_modes: usize,
    basis: Option<Basis>,
}

impl Pod {
    /// Create an untrained POD that will keep at most `n_modes` modes.
    pub fn new(n_modes: usize) -> Self {
        Self {
            n_modes,
            basis: None,
        }
    }

    /// Requested number of modes.
    pub fn requested_modes(&self) -> usize {
        self.n_modes
    }

    /// Trained basis, if any.
    pub fn basis(&self) -> Option<&Basis> {
        self.basis.as_ref()
    }

    /// Trained basis, or `NotTrained`.
    pub fn trained_basis(&self) -> Result<&Basis, RomError> {
        self.basis.as_ref().ok_or(RomError::NotTrained("POD basis"))
    }

    /// Number of retained modes (0 before training).
    pub fn n_modes(&self) -> usize {
        self.basis.as_ref().map_or(0, Basis::rank)
    }

    /// Singular values of the retained modes.
    pub fn singular_values(&self) -> Result<&[f64], RomError> {
        Ok(&self.trained_basis()?.singular_values)
    }

    /// Captured energy fraction of the retained modes.
    pub fn energy_fraction(&self) -> Result<f64, RomError> {
        Ok(self.trained_basis()?.energy_fraction())
    }

    /// Compute the basis from snapshots `x` (n × m).
    ///
    /// Keeps `min(n_modes, numerical rank)` left singular vectors. No energy
    /// criterion is applied. On error the previous basis is discarded.
    pub fn fit(&mut self, x: &Mat<f64>) -> Result<&Basis, RomError> {
        self.basis = None;
        self.basis = Some(extract_basis(x, self.n_modes)?);
        self.trained_basis()
    }

    /// Reduced coordinates a = Φᵀx.
    pub fn project(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
        let basis = self.trained_basis()?;
        check_length(x, basis.dim())?;
        Ok(mat_t_vec(&basis.modes, x))
    }

    /// Full state x = Φa.
    pub fn reconstruct(&self, a: &[f64]) -> Result<Vec<f64>, RomError> {
        let basis = self.trained_basis()?;
        check_length(a, basis.rank())?;
        Ok(mat_vec(&basis.modes, a))
    }
}

/// Truncated SVD basis of `x` with at most `n_modes` columns.
pub fn extract_basis(x: &Mat<f64>, n_modes: usize) -> Result<Basis, RomError> {
    validate_matrix(x, 1, 1)?;
    if n_modes == 0 {
        return Err(RomError::InvalidInput(
            "number of modes must be positive".into(),
        ));
    }

    let (u, s) = thin_svd(x)?;
    let rank = numerical_rank(&s, x.nrows(), x.ncols()).min(n_modes);
    if rank == 0 {
        return Err(RomError::InvalidInput(
            "snapshot matrix has zero numerical rank".into(),
        ));
    }

    let total_energy = s.iter().map(|v| v * v).sum();
    Ok(Basis {
        modes: u.subcols(0, rank).to_owned(),
        singular_values: s[..rank].to_vec(),
        total_energy,
    })
}

impl ReducedOrderModel for Pod {
    fn name(&self) -> &'static str {
        "pod"
    }

    fn train(&mut self, x: &Mat<f64>) -> Result<(), RomError> {
        let requested = self.n_modes;
        let basis = self.fit(x)?;
        tracing::info!(
            modes = basis.rank(),
            requested,
            energy = basis.energy_fraction(),
            "POD basis computed"
        );
        Ok(())
    }

    /// Orthogonal projection Φ(Φᵀx) onto the basis span.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
        let a = self.project(x)?;
        self.reconstruct(&a)
    }
}
