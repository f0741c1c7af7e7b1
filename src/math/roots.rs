//! Bracketed scalar root finding.
//!
//! `brentq` is Brent's method in the form used by SciPy's `brentq`: inverse
//! quadratic / secant steps when they stay well inside the bracket, bisection
//! otherwise. No derivatives are needed and the iteration count is bounded.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RootError {
    #[error("invalid bracket [{a}, {b}]")]
    InvalidInterval { a: f64, b: f64 },

    #[error("f(a)={fa} and f(b)={fb} do not bracket a root")]
    SameSignBracket { fa: f64, fb: f64 },

    #[error("non-finite function value at x={x}")]
    NonFinite { x: f64 },

    #[error("no convergence after {iterations} iterations")]
    DidNotConverge { iterations: usize },
}

/// Tolerances and iteration limit.
#[derive(Debug, Clone, Copy)]
pub struct RootOptions {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iter: usize,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

/// A converged root.
#[derive(Debug, Clone, Copy)]
pub struct Root {
    pub root: f64,
    pub function_value: f64,
    pub iterations: usize,
}

/// Find a root of `f` in `[a, b]`. `f(a)` and `f(b)` must differ in sign.
pub fn brentq<F>(f: F, a: f64, b: f64, options: &RootOptions) -> Result<Root, RootError>
where
    F: Fn(f64) -> f64,
{
    if !(a.is_finite() && b.is_finite()) || a >= b {
        return Err(RootError::InvalidInterval { a, b });
    }

    let eval = |x: f64| -> Result<f64, RootError> {
        let v = f(x);
        if v.is_finite() { Ok(v) } else { Err(RootError::NonFinite { x }) }
    };

    let mut xpre = a;
    let mut xcur = b;
    let mut fpre = eval(xpre)?;
    let mut fcur = eval(xcur)?;

    if fpre == 0.0 {
        return Ok(Root { root: xpre, function_value: 0.0, iterations: 0 });
    }
    if fcur == 0.0 {
        return Ok(Root { root: xcur, function_value: 0.0, iterations: 0 });
    }
    if fpre.signum() == fcur.signum() {
        return Err(RootError::SameSignBracket { fa: fpre, fb: fcur });
    }

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for iter in 0..options.max_iter {
        if fpre != 0.0 && fcur != 0.0 && fpre.signum() != fcur.signum() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (options.xtol + options.rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(Root { root: xcur, function_value: fcur, iterations: iter + 1 });
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = eval(xcur)?;
    }

    Err(RootError::DidNotConverge { iterations: options.max_iter })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_cubic_root() {
        let r = brentq(|x| x * x * x - 2.0 * x - 5.0, 2.0, 3.0, &RootOptions::default()).unwrap();
        assert_abs_diff_eq!(r.root, 2.094_551_481_542_327, epsilon = 1e-10);
        assert!(r.iterations < 20);
    }

    #[test]
    fn finds_root_of_monotone_log_curve() {
        // Same shape as a magnitude curve: -2.5 log10(1 - 0.01 t).
        let target = 0.3;
        let f = |t: f64| -2.5 * (1.0 - 0.01 * t).log10() - target;
        let r = brentq(f, 0.0, 60.0, &RootOptions::default()).unwrap();
        assert_abs_diff_eq!(f(r.root), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn endpoint_root_is_returned_immediately() {
        let r = brentq(|x| x - 1.0, 1.0, 4.0, &RootOptions::default()).unwrap();
        assert_eq!(r.root, 1.0);
        assert_eq!(r.iterations, 0);
    }

    #[test]
    fn same_sign_bracket_is_rejected() {
        let err = brentq(|x| x * x + 1.0, -1.0, 1.0, &RootOptions::default()).unwrap_err();
        assert!(matches!(err, RootError::SameSignBracket { .. }));
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let err = brentq(|x| x, 1.0, 1.0, &RootOptions::default()).unwrap_err();
        assert!(matches!(err, RootError::InvalidInterval { .. }));
    }

    #[test]
    fn iteration_limit_is_enforced() {
        let opts = RootOptions { xtol: 0.0, rtol: 0.0, max_iter: 3 };
        let err = brentq(|x| x.exp() - 2.0, 0.0, 1.0, &opts).unwrap_err();
        assert_eq!(err, RootError::DidNotConverge { iterations: 3 });
    }
}
