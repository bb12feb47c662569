use faer::Mat;

use crate::types::RomError;

/// Common capability shared by every reduced-order model.
///
/// Each implementation owns its trained state (basis, operator, ...) and is
/// trained once from a snapshot matrix whose columns are full states.
pub trait ReducedOrderModel {
    /// Short identifier used in logs and output file names.
    fn name(&self) -> &'static str;

    /// Train on a snapshot matrix (state dimension × snapshot count).
    fn train(&mut self, x: &Mat<f64>) -> Result<(), RomError>;

    /// Map a full state to the model's full-state prediction.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, RomError>;
}
