//! Stretch extrapolation for decline rates outside the calibrated range.
//!
//! Outside `[DM15_MIN, DM15_MAX]` the surface is evaluated at the nearest
//! boundary and the time axis is rescaled instead. The stretch is chosen so
//! that the B-band magnitude drop at day 15 grows by exactly the excess
//! decline rate:
//!
//! ```text
//! teval(B, s·15, boundary) = teval(B, 15, boundary) + (dm15 - boundary)
//! ```

use tracing::debug;

use crate::domain::Band;
use crate::error::TemplateError;
use crate::math::{RootError, RootOptions, brentq};
use crate::surface::SurfaceEvaluator;

/// Calibrated decline-rate range (inclusive).
pub const DM15_MIN: f64 = 0.7;
pub const DM15_MAX: f64 = 1.94;

/// Epoch (days after B maximum) at which the decline rate is defined.
pub const REFERENCE_EPOCH: f64 = 15.0;

/// Root brackets, in days, for slow and fast decliners.
const SLOW_BRACKET: (f64, f64) = (0.0, 16.0);
const FAST_BRACKET: (f64, f64) = (14.0, 70.0);

/// Time rescale plus the decline rate the surface should be evaluated at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchSolution {
    pub stretch: f64,
    pub dm15: f64,
}

impl StretchSolution {
    pub fn identity(dm15: f64) -> Self {
        Self { stretch: 1.0, dm15 }
    }
}

/// Direct stretch proxy used by the NIR color curves.
pub fn dm15_to_stretch(dm15: f64) -> f64 {
    (3.06 - dm15) / 2.04
}

/// Magnitude relative to peak (`-2.5 log10 flux`) of `band` at one epoch.
///
/// Non-positive flux gives a non-finite magnitude.
pub fn teval(
    surface: &dyn SurfaceEvaluator,
    band: Band,
    t: f64,
    dm15: f64,
    normalize: bool,
) -> Result<f64, TemplateError> {
    let sample = surface.evaluate(band, dm15, &[t], normalize)?;
    let flux = sample.value.first().copied().unwrap_or(f64::NAN);
    Ok(-2.5 * flux.log10())
}

/// Solve for the stretch that extrapolates `dm15`.
pub fn solve_stretch(surface: &dyn SurfaceEvaluator, dm15: f64, normalize: bool) -> Result<StretchSolution, TemplateError> {
    if (DM15_MIN..=DM15_MAX).contains(&dm15) {
        return Ok(StretchSolution::identity(dm15));
    }

    let (boundary, (lo, hi)) = if dm15 < DM15_MIN {
        (DM15_MIN, SLOW_BRACKET)
    } else {
        (DM15_MAX, FAST_BRACKET)
    };

    let start = teval(surface, Band::B, REFERENCE_EPOCH, boundary, normalize)?;
    let target = start + (dm15 - boundary);

    // B is known to evaluate after `start`; failures inside the search show up as NaN.
    let objective = |x: f64| teval(surface, Band::B, x, boundary, normalize).unwrap_or(f64::NAN) - target;

    let root = brentq(objective, lo, hi, &RootOptions::default()).map_err(|e| match e {
        RootError::SameSignBracket { .. } | RootError::NonFinite { .. } => TemplateError::RootBracket { dm15, lo, hi },
        other => TemplateError::Root(other),
    })?;

    let solution = StretchSolution {
        stretch: root.root / REFERENCE_EPOCH,
        dm15: boundary,
    };
    debug!(
        dm15,
        boundary,
        root = root.root,
        stretch = solution.stretch,
        iterations = root.iterations,
        "solved extrapolation stretch"
    );
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::surface::fixtures::decline_engine;

    #[test]
    fn calibrated_range_needs_no_stretch() {
        let engine = decline_engine();
        for dm15 in [DM15_MIN, 1.1, DM15_MAX] {
            assert_eq!(solve_stretch(engine.evaluator(), dm15, true).unwrap(), StretchSolution::identity(dm15));
        }
    }

    #[test]
    fn slow_decliner_matches_target_magnitude() {
        let engine = decline_engine();
        let surface = engine.evaluator();
        let sol = solve_stretch(surface, 0.5, true).unwrap();
        assert_eq!(sol.dm15, DM15_MIN);

        let start = teval(surface, Band::B, REFERENCE_EPOCH, DM15_MIN, true).unwrap();
        let root = sol.stretch * REFERENCE_EPOCH;
        let reached = teval(surface, Band::B, root, DM15_MIN, true).unwrap();
        assert_abs_diff_eq!(reached, start - 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(root, 0.0546, epsilon = 1e-3);
    }

    #[test]
    fn fast_decliner_stretches_time() {
        let engine = decline_engine();
        let sol = solve_stretch(engine.evaluator(), 2.5, true).unwrap();
        assert_eq!(sol.dm15, DM15_MAX);
        assert_abs_diff_eq!(sol.stretch, 2.984, epsilon = 1e-2);
    }

    #[test]
    fn unreachable_target_is_a_bracket_error() {
        let engine = decline_engine();
        match solve_stretch(engine.evaluator(), 0.0, true) {
            Err(TemplateError::RootBracket { lo, hi, .. }) => assert_eq!((lo, hi), SLOW_BRACKET),
            other => panic!("expected RootBracket, got {other:?}"),
        }
        assert!(matches!(
            solve_stretch(engine.evaluator(), 4.0, true),
            Err(TemplateError::RootBracket { .. })
        ));
    }

    #[test]
    fn proxy_stretch_is_linear_in_dm15() {
        assert_abs_diff_eq!(dm15_to_stretch(1.1), 0.9608, epsilon = 1e-4);
        assert_abs_diff_eq!(dm15_to_stretch(1.02), 1.0, epsilon = 1e-12);
    }
}
