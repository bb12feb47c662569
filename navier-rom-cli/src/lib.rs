//! Shared plumbing for the `rom-compare` and `navier2d` binaries.

use std::path::Path;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a global fmt subscriber at the given level
/// (trace, debug, info, warn, error; anything else means info).
pub fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Parse command-line arguments; usage errors exit with status 1.
pub fn parse_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(err) => {
            use clap::error::ErrorKind;
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            // Printing can only fail if stderr is gone; the exit code still reports the error
            let _ = err.print();
            std::process::exit(1);
        }
    }
}

/// Write a vector output file, logging failures instead of aborting.
pub fn write_output(path: &Path, values: &[f64]) -> bool {
    match navier_rom::write_vector(path, values) {
        Ok(()) => {
            tracing::info!(path = %path.display(), len = values.len(), "wrote output");
            true
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "cannot write output");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_dir").join("results_pod.txt");
        assert!(!write_output(&missing, &[1.0, 2.0]));

        let ok = dir.path().join("results_dmd.txt");
        assert!(write_output(&ok, &[1.0, 2.0]));
        let text = std::fs::read_to_string(&ok).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
