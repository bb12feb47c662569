use faer::Mat;

use crate::model::ReducedOrderModel;
use crate::types::RomError;
use crate::utils::{check_length, mat_vec, pinv, validate_matrix};

/// Linear one-step propagator learned from consecutive snapshot pairs.
///
/// # Algorithm
/// 1. Split X into X₁ = X[:, 0..m-1] and X₂ = X[:, 1..m]
/// 2. A = X₂ X₁⁺ with an SVD pseudo-inverse, so rank-deficient X₁ is tolerated
///
/// `predict` applies A once. There is no mode or eigenvalue analysis; a
/// multi-step forecast is obtained by calling `predict` repeatedly.
#[derive(Debug, Clone, Default)]
pub struct Dmd {
    operator: Option<Mat<f64>>,
}

impl Dmd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learned operator A (n × n), if trained.
    pub fn operator(&self) -> Option<&Mat<f64>> {
        self.operator.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.operator.is_some()
    }
}

/// Fit A = X₂ X₁⁺ from the snapshot matrix `x` (n × m, m ≥ 2).
pub fn fit_operator(x: &Mat<f64>) -> Result<Mat<f64>, RomError> {
    validate_matrix(x, 1, 2)?;
    let n_time = x.ncols();

    let x1 = x.subcols(0, n_time - 1).to_owned();
    let x2 = x.subcols(1, n_time - 1).to_owned();

    let x1_pinv = pinv(&x1, None)?;
    Ok(&x2 * &x1_pinv)
}

impl ReducedOrderModel for Dmd {
    fn name(&self) -> &'static str {
        "dmd"
    }

    /// Fewer than two snapshots leaves the model untrained with a warning.
    /// Any previously learned operator is discarded.
    fn train(&mut self, x: &Mat<f64>) -> Result<(), RomError> {
        self.operator = None;
        if x.ncols() < 2 {
            tracing::warn!(
                snapshots = x.ncols(),
                "DMD needs at least 2 snapshots; training skipped"
            );
            return Ok(());
        }

        let a = fit_operator(x)?;
        tracing::info!(rows = a.nrows(), cols = a.ncols(), "DMD operator computed");
        self.operator = Some(a);
        Ok(())
    }

    /// One forward step A·x.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
        let a = self
            .operator
            .as_ref()
            .ok_or(RomError::NotTrained("DMD operator"))?;
        check_length(x, a.ncols())?;
        Ok(mat_vec(a, x))
    }
}
