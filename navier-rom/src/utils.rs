use faer::Mat;

use crate::types::RomError;

/// Validate that a matrix meets minimum dimension requirements and contains no NaN/Inf.
pub fn validate_matrix(x: &Mat<f64>, min_rows: usize, min_cols: usize) -> Result<(), RomError> {
    let (rows, cols) = (x.nrows(), x.ncols());
    if rows < min_rows {
        return Err(RomError::InvalidInput(format!(
            "matrix has {rows} rows, need at least {min_rows}"
        )));
    }
    if cols < min_cols {
        return Err(RomError::InvalidInput(format!(
            "matrix has {cols} columns, need at least {min_cols}"
        )));
    }
    for j in 0..cols {
        for i in 0..rows {
            if !x[(i, j)].is_finite() {
                return Err(RomError::InvalidInput(format!(
                    "matrix contains a non-finite value at ({i}, {j})"
                )));
            }
        }
    }
    Ok(())
}

/// Fail with `DimensionMismatch` unless `v` has length `expected`.
pub fn check_length(v: &[f64], expected: usize) -> Result<(), RomError> {
    if v.len() != expected {
        return Err(RomError::DimensionMismatch {
            expected,
            found: v.len(),
        });
    }
    Ok(())
}

/// Singular value cutoff below which a value is treated as zero.
pub fn rank_tolerance(singular_values: &[f64], nrows: usize, ncols: usize) -> f64 {
    let max_sv = singular_values.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
    max_sv * nrows.max(ncols) as f64 * f64::EPSILON
}

/// Number of singular values above the default tolerance.
pub fn numerical_rank(singular_values: &[f64], nrows: usize, ncols: usize) -> usize {
    let tol = rank_tolerance(singular_values, nrows, ncols);
    singular_values.iter().filter(|s| s.abs() > tol).count()
}

/// Thin SVD components: left singular vectors (n × min(n, m)) and singular values.
pub fn thin_svd(x: &Mat<f64>) -> Result<(Mat<f64>, Vec<f64>), RomError> {
    let svd = x
        .thin_svd()
        .map_err(|e| RomError::SvdFailed(format!("{e:?}")))?;
    let s_col = svd.S().column_vector();
    let s: Vec<f64> = (0..s_col.nrows()).map(|i| s_col[i]).collect();
    Ok((svd.U().to_owned(), s))
}

/// Compute the Moore-Penrose pseudo-inverse via SVD.
pub fn pinv(a: &Mat<f64>, tol: Option<f64>) -> Result<Mat<f64>, RomError> {
    let svd = a
        .thin_svd()
        .map_err(|e| RomError::SvdFailed(format!("{e:?}")))?;
    let u = svd.U();
    let s_col = svd.S().column_vector();
    let v = svd.V();

    let k = s_col.nrows();
    let s: Vec<f64> = (0..k).map(|i| s_col[i]).collect();
    let tol = tol.unwrap_or_else(|| rank_tolerance(&s, a.nrows(), a.ncols()));

    // pinv(A) = V S_inv U^T
    let m = a.nrows();
    let n = a.ncols();
    let mut result = Mat::<f64>::zeros(n, m);

    for (idx, &si) in s.iter().enumerate() {
        if si.abs() > tol {
            let si_inv = 1.0 / si;
            for j in 0..n {
                let scale = v[(j, idx)] * si_inv;
                for i in 0..m {
                    result[(j, i)] += scale * u[(i, idx)];
                }
            }
        }
    }

    Ok(result)
}

/// Number of `dt` steps needed to reach `final_time`, i.e. `ceil(final_time / dt)`.
///
/// Ratios within a few ulps of an integer round to that integer, so 0.1 / 0.01
/// yields 10 rather than 11.
pub fn step_count(final_time: f64, dt: f64) -> usize {
    let ratio = final_time / dt;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest.max(0.0) as usize
    } else {
        ratio.ceil().max(0.0) as usize
    }
}

/// y = A x
pub fn mat_vec(a: &Mat<f64>, x: &[f64]) -> Vec<f64> {
    let mut y = vec![0.0; a.nrows()];
    for (j, &xj) in x.iter().enumerate().take(a.ncols()) {
        if xj == 0.0 {
            continue;
        }
        for (i, yi) in y.iter_mut().enumerate() {
            *yi += a[(i, j)] * xj;
        }
    }
    y
}

/// y = Aᵀ x
pub fn mat_t_vec(a: &Mat<f64>, x: &[f64]) -> Vec<f64> {
    (0..a.ncols())
        .map(|j| (0..a.nrows()).map(|i| a[(i, j)] * x[i]).sum())
        .collect()
}

/// Euclidean norm.
pub fn norm2(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// ‖a − b‖ / ‖b‖, or the absolute error when `b` is zero.
pub fn relative_error(a: &[f64], b: &[f64]) -> f64 {
    let diff: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt();
    let reference = norm2(b);
    if reference == 0.0 {
        diff
    } else {
        diff / reference
    }
}

/// LU factorization with partial pivoting of a small square matrix.
#[derive(Debug, Clone)]
pub struct DenseLu {
    lu: Mat<f64>,
    perm: Vec<usize>,
}

impl DenseLu {
    /// Factor `a`, failing with `SingularSystem` if a pivot falls below
    /// `max|a_ij| · n · ε`.
    pub fn factor(a: &Mat<f64>) -> Result<Self, RomError> {
        let mut scale = 0.0_f64;
        for j in 0..a.ncols() {
            for i in 0..a.nrows() {
                scale = scale.max(a[(i, j)].abs());
            }
        }
        Self::factor_with_tolerance(a, scale * a.nrows() as f64 * f64::EPSILON)
    }

    /// Factor `a`, failing with `SingularSystem` if a pivot magnitude is at
    /// most `tol`. Use when the scale of `a` is known independently of its
    /// entries.
    pub fn factor_with_tolerance(a: &Mat<f64>, tol: f64) -> Result<Self, RomError> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(RomError::InvalidInput(format!(
                "LU requires a square matrix, got {}x{}",
                n,
                a.ncols()
            )));
        }

        let mut lu = a.clone();
        let mut perm: Vec<usize> = (0..n).collect();

        for col in 0..n {
            let mut max_row = col;
            let mut max_abs = lu[(col, col)].abs();
            for row in (col + 1)..n {
                let v = lu[(row, col)].abs();
                if v > max_abs {
                    max_abs = v;
                    max_row = row;
                }
            }
            if max_abs <= tol || max_abs == 0.0 {
                return Err(RomError::SingularSystem(format!(
                    "zero pivot in column {col} of {n}x{n} system"
                )));
            }
            if max_row != col {
                perm.swap(col, max_row);
                for j in 0..n {
                    let tmp = lu[(col, j)];
                    lu[(col, j)] = lu[(max_row, j)];
                    lu[(max_row, j)] = tmp;
                }
            }

            let pivot = lu[(col, col)];
            for row in (col + 1)..n {
                let factor = lu[(row, col)] / pivot;
                lu[(row, col)] = factor;
                for j in (col + 1)..n {
                    let sub = factor * lu[(col, j)];
                    lu[(row, j)] -= sub;
                }
            }
        }

        Ok(Self { lu, perm })
    }

    /// Solve `A x = b` with the stored factors.
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>, RomError> {
        let n = self.lu.nrows();
        check_length(b, n)?;

        // Forward substitution on the permuted right-hand side
        let mut x: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum;
        }

        // Back substitution
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum / self.lu[(i, i)];
        }

        Ok(x)
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

    #[test]
    fn test_validate_matrix_ok() {
        let m = Mat::<f64>::identity(3, 3);
        assert!(validate_matrix(&m, 1, 1).is_ok());
    }

    #[test]
    fn test_validate_matrix_empty() {
        let m = Mat::<f64>::zeros(0, 0);
        assert!(validate_matrix(&m, 1, 1).is_err());
    }

    #[test]
    fn test_validate_matrix_nan() {
        let mut m = Mat::<f64>::zeros(2, 2);
        m[(0, 1)] = f64::NAN;
        assert!(validate_matrix(&m, 1, 1).is_err());
    }

    #[test]
    fn test_numerical_rank_drops_zero_values() {
        let s = vec![4.0, 1.0, 1e-17];
        assert_eq!(numerical_rank(&s, 4, 3), 2);
        assert_eq!(numerical_rank(&[0.0, 0.0], 2, 2), 0);
    }

    #[test]
    fn test_pinv_rectangular() {
        let mut m = Mat::<f64>::zeros(3, 2);
        m[(0, 0)] = 1.0;
        m[(1, 1)] = 2.0;
        let m_inv = pinv(&m, None).unwrap();
        assert_eq!((m_inv.nrows(), m_inv.ncols()), (2, 3));
        let product = &m * &m_inv * &m;
        for i in 0..3 {
            for j in 0..2 {
                assert_near(product[(i, j)], m[(i, j)], 1e-10);
            }
        }
    }

    #[test]
    fn test_pinv_rank_deficient() {
        // Two identical columns: pinv must still satisfy A A⁺ A = A
        let mut m = Mat::<f64>::zeros(2, 2);
        m[(0, 0)] = 1.0;
        m[(0, 1)] = 1.0;
        m[(1, 0)] = 2.0;
        m[(1, 1)] = 2.0;
        let m_inv = pinv(&m, None).unwrap();
        let product = &m * &m_inv * &m;
        for i in 0..2 {
            for j in 0..2 {
                assert_near(product[(i, j)], m[(i, j)], 1e-10);
            }
        }
    }

    #[test]
    fn test_step_count() {
        assert_eq!(step_count(0.1, 0.01), 10);
        assert_eq!(step_count(1.0, 0.3), 4);
        assert_eq!(step_count(0.0, 0.1), 0);
    }

    #[test]
    fn test_mat_vec_and_transpose() {
        let mut a = Mat::<f64>::zeros(2, 3);
        a[(0, 0)] = 1.0;
        a[(0, 2)] = 2.0;
        a[(1, 1)] = 3.0;
        assert_eq!(mat_vec(&a, &[1.0, 1.0, 1.0]), vec![3.0, 3.0]);
        assert_eq!(mat_t_vec(&a, &[1.0, 2.0]), vec![1.0, 6.0, 2.0]);
    }

    #[test]
    fn test_dense_lu_solve() {
        let mut a = Mat::<f64>::zeros(3, 3);
        let vals = [[0.0, 2.0, 1.0], [1.0, 1.0, 0.0], [3.0, 0.0, 1.0]];
        for i in 0..3 {
            for j in 0..3 {
                a[(i, j)] = vals[i][j];
            }
        }
        let x_true = [1.0, -2.0, 0.5];
        let b = mat_vec(&a, &x_true);
        let x = DenseLu::factor(&a).unwrap().solve(&b).unwrap();
        for i in 0..3 {
            assert_near(x[i], x_true[i], 1e-12);
        }
    }

    #[test]
    fn test_dense_lu_singular() {
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 1.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 2.0;
        a[(1, 1)] = 4.0;
        assert!(matches!(
            DenseLu::factor(&a),
            Err(RomError::SingularSystem(_))
        ));
        assert!(DenseLu::factor(&Mat::<f64>::zeros(2, 2)).is_err());
    }

    #[test]
    fn test_dense_lu_absolute_tolerance() {
        // Round-off sized entries: invertible relative to themselves only
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 1.1e-16;
        a[(0, 1)] = 1.9e-15;
        a[(1, 0)] = 1.7e-16;
        a[(1, 1)] = 1.0e-15;
        assert!(DenseLu::factor(&a).is_ok());
        assert!(matches!(
            DenseLu::factor_with_tolerance(&a, 2.0 * f64::EPSILON),
            Err(RomError::SingularSystem(_))
        ));
    }

    #[test]
    fn test_relative_error() {
        assert_near(relative_error(&[1.0, 1.0], &[1.0, 1.0]), 0.0, 1e-15);
        assert_near(relative_error(&[2.0, 0.0], &[1.0, 0.0]), 1.0, 1e-15);
    }
}
