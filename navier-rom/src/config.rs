//! Line-oriented simulation configuration.
//!
//! Ten fields, one per line, in this order:
//!
//! ```text
//! 10            # Nx
//! 10            # Ny
//! 1.0           # Lx
//! 1.0           # Ly
//! 0.01          # dt
//! 0.1           # final time
//! 0.01          # viscosity
//! 5             # snapshot interval (steps)
//! snapshots.txt # snapshot output file
//! 5             # number of POD modes
//! ```
//!
//! `#` starts a comment anywhere on a line. Numeric fields read the first
//! token of their line; the snapshot file is the whole trimmed line, so paths
//! may contain spaces. Lines that are empty once comments are removed are
//! skipped.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::stencil::Grid2D;
use crate::types::{RomError, TimeIntegration};
use crate::utils::step_count;

/// Parameters of one offline/online simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub nx: usize,
    pub ny: usize,
    pub lx: f64,
    pub ly: f64,
    pub dt: f64,
    pub final_time: f64,
    pub viscosity: f64,
    /// Every `snapshot_interval`-th step is stored.
    pub snapshot_interval: usize,
    pub snapshot_file: PathBuf,
    pub num_pod_modes: usize,
}

impl SimulationConfig {
    /// Read and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RomError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RomError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse and validate configuration text.
    pub fn parse(text: &str) -> Result<Self, RomError> {
        let mut fields = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty());

        let cfg = Self {
            nx: next_field(&mut fields, "Nx")?,
            ny: next_field(&mut fields, "Ny")?,
            lx: next_field(&mut fields, "Lx")?,
            ly: next_field(&mut fields, "Ly")?,
            dt: next_field(&mut fields, "dt")?,
            final_time: next_field(&mut fields, "finalTime")?,
            viscosity: next_field(&mut fields, "viscosity")?,
            snapshot_interval: next_field(&mut fields, "snapshotInterval")?,
            snapshot_file: PathBuf::from(next_line(&mut fields, "snapshotFile")?),
            num_pod_modes: next_field(&mut fields, "numPodModes")?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), RomError> {
        if self.nx < 3 || self.ny < 3 {
            return Err(RomError::Config(format!(
                "grid must be at least 3x3, got {}x{}",
                self.nx, self.ny
            )));
        }
        for (name, value) in [
            ("Lx", self.lx),
            ("Ly", self.ly),
            ("dt", self.dt),
            ("finalTime", self.final_time),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RomError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.viscosity.is_finite() && self.viscosity >= 0.0) {
            return Err(RomError::Config(format!(
                "viscosity must be non-negative, got {}",
                self.viscosity
            )));
        }
        if self.snapshot_interval == 0 {
            return Err(RomError::Config("snapshotInterval must be at least 1".into()));
        }
        if self.num_pod_modes == 0 {
            return Err(RomError::Config("numPodModes must be at least 1".into()));
        }
        Ok(())
    }

    /// Uniform grid spanning the configured domain.
    pub fn grid(&self) -> Result<Grid2D, RomError> {
        Grid2D::new(self.nx, self.ny, self.lx, self.ly)
    }

    /// `ceil(final_time / dt)`.
    pub fn n_steps(&self) -> usize {
        step_count(self.final_time, self.dt)
    }

    /// Reduced time stepping matching this configuration.
    pub fn time_integration(&self) -> Result<TimeIntegration, RomError> {
        TimeIntegration::to_final_time(self.dt, self.final_time)
    }
}

fn next_line<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<&'a str, RomError> {
    fields
        .next()
        .ok_or_else(|| RomError::Config(format!("missing field {name}")))
}

fn next_token<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<&'a str, RomError> {
    let line = next_line(fields, name)?;
    Ok(line.split_whitespace().next().unwrap_or(line))
}

fn next_field<'a, T: FromStr>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<T, RomError> {
    let token = next_token(fields, name)?;
    token
        .parse()
        .map_err(|_| RomError::Config(format!("cannot parse {name} from {token:?}")))
}
