//! Closed-form NIR curves for `K`, `J_K` and `H_K`.
//!
//! Each is a cubic in the stretched epoch `x = t / s` with the proxy stretch
//! `s = (3.06 - dm15) / 2.04`. They are already magnitudes (or colors), so no
//! unit conversion applies.

use crate::domain::{Band, Curve};
use crate::template::stretch::dm15_to_stretch;

/// Trusted range of the stretched epoch (inclusive).
pub const COLOR_RANGE: (f64, f64) = (-12.0, 10.0);

/// Uncertainty inside the trusted range.
pub const COLOR_ERROR: f64 = 0.08;

/// Cubic coefficients `[c0, c1, c2, c3]`.
fn coefficients(band: Band) -> Option<[f64; 4]> {
    match band {
        Band::JK => Some([0.080, 0.05104699, 0.007064257, -0.000257906]),
        Band::HK => Some([0.050, 0.0250923, 0.001852107, -0.0003557824]),
        Band::K => Some([0.042, 0.02728437, 0.003194500, -0.0004139377]),
        _ => None,
    }
}

/// Evaluate a closed-form band; `None` for surface bands.
pub fn color_curve(band: Band, dm15: f64, epochs: &[f64]) -> Option<Curve> {
    let [c0, c1, c2, c3] = coefficients(band)?;
    let s = dm15_to_stretch(dm15);

    let mut curve = Curve {
        value: Vec::with_capacity(epochs.len()),
        error: Vec::with_capacity(epochs.len()),
        mask: Vec::with_capacity(epochs.len()),
    };
    for &t in epochs {
        let x = t / s;
        let inside = (COLOR_RANGE.0..=COLOR_RANGE.1).contains(&x);
        curve.value.push(c0 + x * (c1 + x * (c2 + x * c3)));
        curve.error.push(if inside { COLOR_ERROR } else { 0.0 });
        curve.mask.push(inside);
    }
    Some(curve)
}
