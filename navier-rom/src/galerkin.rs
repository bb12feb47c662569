use faer::Mat;

use crate::model::ReducedOrderModel;
use crate::pod::Pod;
use crate::types::{RomError, TimeIntegration};
use crate::utils::check_length;

/// Spatial right-hand side `f: FullState → FullState` driven by a Galerkin projector.
pub trait RhsOperator {
    /// Model name reported by a projector using this operator.
    fn label(&self) -> &'static str {
        "galerkin"
    }

    /// Hook invoked with the training snapshots after the state basis is built.
    fn prepare(&mut self, _snapshots: &Mat<f64>) -> Result<(), RomError> {
        Ok(())
    }

    /// Evaluate `f(x)` for a full state `x`.
    fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, RomError>;
}

/// Linear damping `f(x) = −x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDecay;

impl RhsOperator for LinearDecay {
    fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
        Ok(x.iter().map(|v| -v).collect())
    }
}

/// Galerkin reduced-order model: PDE dynamics restricted to a POD basis.
///
/// The reduced right-hand side is `Φᵀ f(Φa)`, integrated with explicit Euler
/// using the projector's [`TimeIntegration`].
#[derive(Debug, Clone)]
pub struct GalerkinProjector<F> {
    pod: Pod,
    rhs: F,
    integration: TimeIntegration,
}

impl<F: RhsOperator> GalerkinProjector<F> {
    pub fn new(n_modes: usize, rhs: F, integration: TimeIntegration) -> Self {
        Self {
            pod: Pod::new(n_modes),
            rhs,
            integration,
        }
    }

    pub fn pod(&self) -> &Pod {
        &self.pod
    }

    pub fn rhs(&self) -> &F {
        &self.rhs
    }

    pub fn integration(&self) -> TimeIntegration {
        self.integration
    }

    pub fn set_integration(&mut self, integration: TimeIntegration) {
        self.integration = integration;
    }

    /// Reduced coordinates a = Φᵀx.
    pub fn project(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
        self.pod.project(x)
    }

    /// Full state x = Φa.
    pub fn reconstruct(&self, a: &[f64]) -> Result<Vec<f64>, RomError> {
        self.pod.reconstruct(a)
    }

    /// da/dt = Φᵀ f(Φa).
    pub fn compute_reduced_rhs(&self, a: &[f64]) -> Result<Vec<f64>, RomError> {
        let full = self.pod.reconstruct(a)?;
        let f = self.rhs.evaluate(&full)?;
        check_length(&f, full.len())?;
        self.pod.project(&f)
    }

    /// One explicit Euler step: a + dt · Φᵀ f(Φa).
    pub fn step_explicit_euler(&self, a: &[f64], dt: f64) -> Result<Vec<f64>, RomError> {
        let rhs = self.compute_reduced_rhs(a)?;
        Ok(a.iter().zip(&rhs).map(|(ai, ri)| ai + dt * ri).collect())
    }

    /// Integrate reduced coordinates `a0` for `integration.n_steps` steps.
    pub fn integrate(
        &self,
        a0: &[f64],
        integration: &TimeIntegration,
    ) -> Result<Vec<f64>, RomError> {
        let mut a = a0.to_vec();
        for _ in 0..integration.n_steps {
            a = self.step_explicit_euler(&a, integration.dt)?;
        }
        Ok(a)
    }
}

impl<F: RhsOperator> ReducedOrderModel for GalerkinProjector<F> {
    fn name(&self) -> &'static str {
        self.rhs.label()
    }

    /// A failed training leaves the projector untrained, never with a state
    /// basis from one call next to evaluator data from another.
    fn train(&mut self, x: &Mat<f64>) -> Result<(), RomError> {
        let result = self.pod.train(x).and_then(|()| self.rhs.prepare(x));
        if let Err(e) = result {
            self.pod = Pod::new(self.pod.requested_modes());
            return Err(e);
        }
        tracing::info!(model = self.rhs.label(), "Galerkin projector trained");
        Ok(())
    }

    /// Project `x`, integrate over the configured horizon, reconstruct.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
        let a0 = self.project(x)?;
        let a = self.integrate(&a0, &self.integration)?;
        self.reconstruct(&a)
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

    fn make_snapshots() -> Mat<f64> {
        Mat::from_fn(12, 5, |i, j| {
            let x = i as f64 / 11.0;
            (1.0 + j as f64) * (std::f64::consts::PI * x).sin() + 0.2 * j as f64 * x
        })
    }

    fn trained(integration: TimeIntegration) -> GalerkinProjector<LinearDecay> {
        let mut rom = GalerkinProjector::new(2, LinearDecay, integration);
        rom.train(&make_snapshots()).unwrap();
        rom
    }

    #[test]
    fn test_reduced_rhs_of_linear_decay() {
        let rom = trained(TimeIntegration::new(0.01, 1).unwrap());
        let a = vec![0.3, -1.2];
        let rhs = rom.compute_reduced_rhs(&a).unwrap();
        // Φᵀ(−Φa) = −a for an orthonormal basis
        assert_near(rhs[0], -0.3, 1e-10);
        assert_near(rhs[1], 1.2, 1e-10);
    }

    #[test]
    fn test_step_explicit_euler() {
        let rom = trained(TimeIntegration::new(0.01, 1).unwrap());
        let a = vec![1.0, 2.0];
        let next = rom.step_explicit_euler(&a, 0.1).unwrap();
        assert_near(next[0], 0.9, 1e-10);
        assert_near(next[1], 1.8, 1e-10);
    }

    #[test]
    fn test_predict_uses_configured_integration() {
        let x = make_snapshots();
        let x0: Vec<f64> = (0..12).map(|i| x[(i, 0)]).collect();

        let short = trained(TimeIntegration::new(0.01, 10).unwrap());
        let long = trained(TimeIntegration::new(0.01, 100).unwrap());

        let recon = short.pod().predict(&x0).unwrap();
        let p_short = short.predict(&x0).unwrap();
        let p_long = long.predict(&x0).unwrap();

        let expected_short = 0.99_f64.powi(10);
        let expected_long = 0.99_f64.powi(100);
        for i in 0..12 {
            assert_near(p_short[i], expected_short * recon[i], 1e-10);
            assert_near(p_long[i], expected_long * recon[i], 1e-10);
        }
    }

    #[test]
    fn test_zero_steps_is_projection() {
        let x = make_snapshots();
        let rom = trained(TimeIntegration::new(0.5, 0).unwrap());
        let probe: Vec<f64> = (0..12).map(|i| x[(i, 3)] + 0.01 * i as f64).collect();
        let once = rom.predict(&probe).unwrap();
        let twice = rom.predict(&once).unwrap();
        for i in 0..12 {
            assert_near(once[i], twice[i], 1e-10);
        }
    }

    /// Evaluator whose preparation needs at least `min_snapshots` columns.
    #[derive(Debug)]
    struct NeedsSnapshots {
        min_snapshots: usize,
        prepared: bool,
    }

    impl RhsOperator for NeedsSnapshots {
        fn prepare(&mut self, snapshots: &Mat<f64>) -> Result<(), RomError> {
            self.prepared = false;
            if snapshots.ncols() < self.min_snapshots {
                return Err(RomError::InvalidInput("too few snapshots".into()));
            }
            self.prepared = true;
            Ok(())
        }

        fn evaluate(&self, x: &[f64]) -> Result<Vec<f64>, RomError> {
            if !self.prepared {
                return Err(RomError::NotTrained("test evaluator"));
            }
            Ok(x.iter().map(|v| -v).collect())
        }
    }

    #[test]
    fn test_failed_prepare_leaves_projector_untrained() {
        let x = make_snapshots();
        let rhs = NeedsSnapshots {
            min_snapshots: 4,
            prepared: false,
        };
        let mut rom = GalerkinProjector::new(2, rhs, TimeIntegration::new(0.01, 3).unwrap());
        rom.train(&x).unwrap();
        let x0: Vec<f64> = (0..12).map(|i| x[(i, 0)]).collect();
        assert!(rom.predict(&x0).is_ok());

        let short = x.subcols(0, 3).to_owned();
        assert!(rom.train(&short).is_err());
        assert!(rom.pod().basis().is_none());
        assert!(matches!(rom.predict(&x0), Err(RomError::NotTrained(_))));
    }

    #[test]
    fn test_untrained_and_mismatch() {
        let rom = GalerkinProjector::new(2, LinearDecay, TimeIntegration::new(0.1, 1).unwrap());
        assert!(matches!(
            rom.predict(&[1.0; 12]),
            Err(RomError::NotTrained(_))
        ));
        let rom = trained(TimeIntegration::new(0.1, 1).unwrap());
        assert!(rom.predict(&[1.0; 5]).is_err());
        assert!(rom.compute_reduced_rhs(&[1.0; 3]).is_err());
        assert_eq!(rom.name(), "galerkin");
    }
}
