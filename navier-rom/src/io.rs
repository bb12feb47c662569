//! Plain-text snapshot matrix and vector files.
//!
//! A snapshot matrix file starts with a header line `n m` followed by `n` rows
//! of `m` whitespace-separated values; entry (i, j) is component `i` of
//! snapshot `j`. A vector file holds one value per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use faer::Mat;

use crate::types::RomError;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> RomError + '_ {
    move |source| RomError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a snapshot matrix file.
pub fn read_snapshot_matrix(path: impl AsRef<Path>) -> Result<Mat<f64>, RomError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(io_error(path))?;
    parse_snapshot_matrix(&text)
}

/// Parse snapshot matrix text. Missing or surplus values are errors.
pub fn parse_snapshot_matrix(text: &str) -> Result<Mat<f64>, RomError> {
    let mut tokens = text.split_whitespace();

    let mut header = |what: &str| -> Result<usize, RomError> {
        let token = tokens
            .next()
            .ok_or_else(|| RomError::Parse(format!("missing {what} in header")))?;
        token
            .parse()
            .map_err(|_| RomError::Parse(format!("invalid {what} {token:?} in header")))
    };
    let n = header("row count")?;
    let m = header("column count")?;
    if n == 0 || m == 0 {
        return Err(RomError::Parse(format!("empty snapshot matrix ({n}x{m})")));
    }

    let mut x = Mat::<f64>::zeros(n, m);
    for i in 0..n {
        for j in 0..m {
            let token = tokens.next().ok_or_else(|| {
                RomError::Parse(format!(
                    "expected {} values, data ends at row {i}, column {j}",
                    n * m
                ))
            })?;
            x[(i, j)] = token.parse().map_err(|_| {
                RomError::Parse(format!("invalid value {token:?} at row {i}, column {j}"))
            })?;
        }
    }

    if tokens.next().is_some() {
        return Err(RomError::Parse(format!(
            "trailing data after {n}x{m} matrix"
        )));
    }
    Ok(x)
}

/// Write a snapshot matrix file.
pub fn write_snapshot_matrix(path: impl AsRef<Path>, x: &Mat<f64>) -> Result<(), RomError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(io_error(path))?;
    let mut out = BufWriter::new(file);

    let write = |out: &mut BufWriter<File>| -> std::io::Result<()> {
        writeln!(out, "{} {}", x.nrows(), x.ncols())?;
        for i in 0..x.nrows() {
            let row: Vec<String> = (0..x.ncols()).map(|j| x[(i, j)].to_string()).collect();
            writeln!(out, "{}", row.join(" "))?;
        }
        out.flush()
    };
    write(&mut out).map_err(io_error(path))
}

/// Write a vector, one value per line.
pub fn write_vector(path: impl AsRef<Path>, v: &[f64]) -> Result<(), RomError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(io_error(path))?;
    let mut out = BufWriter::new(file);

    let write = |out: &mut BufWriter<File>| -> std::io::Result<()> {
        for value in v {
            writeln!(out, "{value}")?;
        }
        out.flush()
    };
    write(&mut out).map_err(io_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matrix() {
        let x = parse_snapshot_matrix("2 3\n1 2 3\n4 5 6.5\n").unwrap();
        assert_eq!((x.nrows(), x.ncols()), (2, 3));
        assert_eq!(x[(0, 2)], 3.0);
        assert_eq!(x[(1, 2)], 6.5);
    }

    #[test]
    fn test_parse_matrix_truncated() {
        assert!(matches!(
            parse_snapshot_matrix("2 2\n1 2\n3\n"),
            Err(RomError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_matrix_trailing_and_garbage() {
        assert!(parse_snapshot_matrix("1 1\n1 2\n").is_err());
        assert!(parse_snapshot_matrix("1 2\n1 x\n").is_err());
        assert!(parse_snapshot_matrix("two 2\n").is_err());
        assert!(parse_snapshot_matrix("").is_err());
        assert!(parse_snapshot_matrix("0 3\n").is_err());
    }

    #[test]
    fn test_write_then_read_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.txt");
        let x = Mat::from_fn(3, 2, |i, j| i as f64 * 0.25 - j as f64 / 3.0);
        write_snapshot_matrix(&path, &x).unwrap();
        let y = read_snapshot_matrix(&path).unwrap();
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(x[(i, j)], y[(i, j)]);
            }
        }
    }

    #[test]
    fn test_write_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.txt");
        write_vector(&path, &[1.5, -2.0]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1.5\n-2\n");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("v.txt");
        assert!(matches!(
            write_vector(&path, &[1.0]),
            Err(RomError::Io { .. })
        ));
    }
}
