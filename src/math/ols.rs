//! Weighted least squares solver.
//!
//! The slow-path surface evaluator solves one tiny regression per query point:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and the result solved as ordinary least squares.
//! - SVD keeps the solve robust when the local design is nearly rank deficient
//!   (e.g. every nearby calibration point shares one decline rate).
//! - The parameter covariance `(XᵀWX)⁻¹` is returned alongside β because the
//!   evaluator's uncertainty is the variance of the intercept.

use nalgebra::{DMatrix, DVector};

/// Result of a weighted fit.
#[derive(Debug, Clone)]
pub struct WeightedFit {
    pub beta: DVector<f64>,
    /// `(XᵀWX)⁻¹`; `None` when the normal matrix is singular.
    pub covariance: Option<DMatrix<f64>>,
    /// `Σ w_i r_i²`
    pub chi2: f64,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Weighted least squares with parameter covariance.
///
/// # Panics
/// Panics if `x.nrows()`, `y.len()` and `w.len()` disagree.
pub fn solve_weighted(x: &DMatrix<f64>, y: &DVector<f64>, w: &[f64]) -> Option<WeightedFit> {
    assert_eq!(x.nrows(), y.len());
    assert_eq!(x.nrows(), w.len());

    let mut xw = x.clone();
    let mut yw = y.clone();
    for (i, &wi) in w.iter().enumerate() {
        let s = wi.max(0.0).sqrt();
        for j in 0..xw.ncols() {
            xw[(i, j)] *= s;
        }
        yw[i] *= s;
    }

    let beta = solve_least_squares(&xw, &yw)?;
    let resid = &yw - &xw * &beta;
    let chi2 = resid.norm_squared();
    let covariance = (xw.transpose() * &xw).try_inverse();

    Some(WeightedFit { beta, covariance, chi2 })
}
