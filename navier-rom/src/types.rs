use std::path::PathBuf;

use faer::Mat;

/// Error types for reduced-order modeling operations.
#[derive(Debug, thiserror::Error)]
pub enum RomError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("dimension mismatch: expected length {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("SVD computation failed: {0}")]
    SvdFailed(String),

    #[error("singular system: {0}")]
    SingularSystem(String),

    #[error("{0} has not been trained")]
    NotTrained(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Explicit time-stepping parameters for reduced dynamics.
///
/// Step size and step count always come from the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeIntegration {
    /// Step size.
    pub dt: f64,
    /// Number of explicit Euler steps.
    pub n_steps: usize,
}

impl TimeIntegration {
    /// Create a new integration setting, rejecting non-positive or non-finite `dt`.
    pub fn new(dt: f64, n_steps: usize) -> Result<Self, RomError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(RomError::InvalidInput(format!(
                "time step must be positive and finite, got {dt}"
            )));
        }
        Ok(Self { dt, n_steps })
    }

    /// Steps of size `dt` needed to reach `final_time` (rounded up).
    pub fn to_final_time(dt: f64, final_time: f64) -> Result<Self, RomError> {
        if !(final_time.is_finite() && final_time >= 0.0) {
            return Err(RomError::InvalidInput(format!(
                "final time must be non-negative and finite, got {final_time}"
            )));
        }
        let probe = Self::new(dt, 0)?;
        Ok(Self {
            n_steps: crate::utils::step_count(final_time, dt),
            ..probe
        })
    }

    /// Total integrated time `dt * n_steps`.
    pub fn horizon(&self) -> f64 {
        self.dt * self.n_steps as f64
    }
}

/// Truncated orthonormal basis and its singular values.
#[derive(Debug, Clone)]
pub struct Basis {
    /// Basis vectors (n × k), columns ordered by decreasing singular value.
    pub modes: Mat<f64>,
    /// Singular values (k), descending.
    pub singular_values: Vec<f64>,
    /// Sum of squares of all singular values of the training matrix.
    pub total_energy: f64,
}

impl Basis {
    /// State dimension n.
    pub fn dim(&self) -> usize {
        self.modes.nrows()
    }

    /// Number of retained modes k.
    pub fn rank(&self) -> usize {
        self.modes.ncols()
    }

    /// Fraction of the snapshot energy captured by the retained modes.
    pub fn energy_fraction(&self) -> f64 {
        if self.total_energy == 0.0 {
            return 0.0;
        }
        let captured: f64 = self.singular_values.iter().map(|s| s * s).sum();
        captured / self.total_energy
    }
}

/// Ordered full-order snapshots with the physical time at which each was taken.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    /// Snapshot times, strictly increasing.
    pub times: Vec<f64>,
    /// Full states, one per time.
    pub states: Vec<Vec<f64>>,
}

impl SnapshotSet {
    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no snapshot has been stored.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Append a snapshot.
    pub fn push(&mut self, time: f64, state: Vec<f64>) {
        self.times.push(time);
        self.states.push(state);
    }

    /// Assemble the snapshot matrix (state dimension × snapshot count).
    pub fn to_matrix(&self) -> Result<Mat<f64>, RomError> {
        let first = self
            .states
            .first()
            .ok_or_else(|| RomError::InvalidInput("snapshot set is empty".into()))?;
        let n = first.len();
        if let Some(bad) = self.states.iter().find(|s| s.len() != n) {
            return Err(RomError::DimensionMismatch {
                expected: n,
                found: bad.len(),
            });
        }
        Ok(Mat::from_fn(n, self.states.len(), |i, j| self.states[j][i]))
    }
}
