use crate::config::SimulationConfig;
use crate::galerkin::{GalerkinProjector, RhsOperator};
use crate::types::{RomError, TimeIntegration};

/// Time integration of a trained Galerkin projector with externally supplied
/// step size and horizon.
#[derive(Debug)]
pub struct ReducedOnlineSolver<'a, F> {
    projector: &'a GalerkinProjector<F>,
    integration: TimeIntegration,
}

impl<'a, F: RhsOperator> ReducedOnlineSolver<'a, F> {
    /// Integrate to `final_time` with steps of `dt` (`ceil(final_time / dt)` steps).
    pub fn new(
        projector: &'a GalerkinProjector<F>,
        dt: f64,
        final_time: f64,
    ) -> Result<Self, RomError> {
        Ok(Self {
            projector,
            integration: TimeIntegration::to_final_time(dt, final_time)?,
        })
    }

    /// Step size and horizon taken from a simulation configuration.
    pub fn from_config(
        cfg: &SimulationConfig,
        projector: &'a GalerkinProjector<F>,
    ) -> Result<Self, RomError> {
        Self::new(projector, cfg.dt, cfg.final_time)
    }

    pub fn integration(&self) -> TimeIntegration {
        self.integration
    }

    /// a = Φᵀx
    pub fn to_reduced(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
        self.projector.project(x)
    }

    /// x = Φa
    pub fn to_full(&self, a: &[f64]) -> Result<Vec<f64>, RomError> {
        self.projector.reconstruct(a)
    }

    /// Project `initial`, integrate in reduced coordinates, reconstruct.
    pub fn run(&self, initial: &[f64]) -> Result<Vec<f64>, RomError> {
        let a0 = self.to_reduced(initial)?;
        let a = self.projector.integrate(&a0, &self.integration)?;
        tracing::debug!(
            steps = self.integration.n_steps,
            dt = self.integration.dt,
            "reduced solve finished"
        );
        self.to_full(&a)
    }
}
