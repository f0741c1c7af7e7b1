//! Trust-region masking, bootstrap error combination and unit conversion.

use crate::domain::{Band, Curve};

/// Baseline trusted epoch window (days since B maximum, inclusive).
pub const EPOCH_MIN: f64 = -10.0;
pub const EPOCH_MAX: f64 = 70.0;

/// Magnitude error reported where flux is not positive.
pub const MAG_ERROR_SENTINEL: f64 = 9.99;

/// `2.5 / ln(10)`, rounded as in the published templates.
pub const FLUX_TO_MAG_ERROR: f64 = 1.0857;

/// Y/J/H trust window (exclusive), and the earlier cutoff for fast decliners.
const NIR_WINDOW: (f64, f64) = (-8.0, 57.0);
const NIR_FAST_DM15: f64 = 1.7;
const NIR_FAST_LATEST: f64 = 40.0;

/// `(lower dm15 exclusive, upper dm15 inclusive, earliest trusted epoch exclusive)`.
/// The surfaces misbehave before maximum for fast decliners in these bands.
type EarlyCutoff = (f64, f64, f64);

const I_CUTOFFS: &[EarlyCutoff] = &[
    (2.0, f64::INFINITY, -4.0),
    (1.85, 2.0, -5.0),
    (1.80, 1.85, -6.0),
    (1.70, 1.80, -7.0),
];

const R_CUTOFFS: &[EarlyCutoff] = &[
    (2.0, f64::INFINITY, -5.0),
    (1.9, 2.0, -6.0),
    (1.83, 1.9, -7.0),
    (1.76, 1.83, -8.0),
];

const G_CUTOFFS: &[EarlyCutoff] = &[(2.0, f64::INFINITY, -6.0), (1.88, 2.0, -7.0), (1.83, 1.88, -8.0)];

fn earliest_epoch(band: Band, dm15: f64) -> Option<f64> {
    let table = match band {
        Band::I => I_CUTOFFS,
        Band::R => R_CUTOFFS,
        Band::G => G_CUTOFFS,
        _ => return None,
    };
    table
        .iter()
        .find(|(lo, hi, _)| *lo < dm15 && dm15 <= *hi)
        .map(|&(_, _, earliest)| earliest)
}

/// Where the surface template for `band` can be trusted.
///
/// `epochs` are de-redshifted but not stretched; `dm15` is the requested
/// (unclamped) decline rate.
pub fn trust_mask(band: Band, dm15: f64, epochs: &[f64]) -> Vec<bool> {
    let earliest = earliest_epoch(band, dm15);
    let nir = matches!(band, Band::Y | Band::J | Band::H);

    epochs
        .iter()
        .map(|&t| {
            let mut ok = (EPOCH_MIN..=EPOCH_MAX).contains(&t);
            if let Some(e) = earliest {
                ok &= t > e;
            }
            if nir {
                ok &= t > NIR_WINDOW.0 && t < NIR_WINDOW.1;
                if dm15 > NIR_FAST_DM15 {
                    ok &= t < NIR_FAST_LATEST;
                }
            }
            ok
        })
        .collect()
}

/// `error = sqrt(error² + bootstrap²)`, elementwise.
pub fn combine_bootstrap(error: &mut [f64], bootstrap: &[f64]) {
    for (e, bs) in error.iter_mut().zip(bootstrap) {
        *e = e.hypot(*bs);
    }
}

/// Convert a flux curve to magnitudes relative to peak, in place.
///
/// Non-positive flux cannot be converted: those epochs are masked out with
/// value 0 and error `MAG_ERROR_SENTINEL`.
pub fn flux_to_magnitude(curve: &mut Curve) {
    for i in 0..curve.len() {
        let flux = curve.value[i];
        if flux > 0.0 {
            curve.error[i] = curve.error[i] / flux * FLUX_TO_MAG_ERROR;
            curve.value[i] = -2.5 * flux.log10();
        } else {
            curve.value[i] = 0.0;
            curve.error[i] = MAG_ERROR_SENTINEL;
            curve.mask[i] = false;
        }
    }
}

/// Inverse of `flux_to_magnitude` for one trusted epoch.
pub fn magnitude_to_flux(mag: f64, error: f64) -> (f64, f64) {
    let flux = 10f64.powf(-0.4 * mag);
    (flux, error * flux / FLUX_TO_MAG_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn baseline_window_is_inclusive() {
        let mask = trust_mask(Band::B, 1.2, &[-10.0001, -10.0, 70.0, 70.0001]);
        assert_eq!(mask, vec![false, true, true, false]);
    }

    #[test]
    fn fast_decliner_i_band_starts_later() {
        let mask = trust_mask(Band::I, 2.5, &[-4.0, -3.9]);
        assert_eq!(mask, vec![false, true]);

        // Cutoff bands are (lower, upper]: dm15 = 2.0 uses the -5 day cutoff.
        assert_eq!(trust_mask(Band::I, 2.0, &[-5.0, -4.5]), vec![false, true]);
        assert_eq!(trust_mask(Band::I, 1.7, &[-9.0]), vec![true]);
    }

    #[test]
    fn r_and_g_tables_apply_only_to_their_band() {
        assert_eq!(trust_mask(Band::R, 1.8, &[-8.0, -7.9]), vec![false, true]);
        assert_eq!(trust_mask(Band::G, 1.85, &[-8.0, -7.9]), vec![false, true]);
        assert_eq!(trust_mask(Band::B, 2.5, &[-9.0]), vec![true]);
    }

    #[test]
    fn nir_bands_have_a_narrower_window() {
        assert_eq!(trust_mask(Band::J, 1.1, &[-8.0, -7.5, 56.9, 57.0]), vec![false, true, true, false]);
        assert_eq!(trust_mask(Band::H, 1.8, &[39.9, 40.0]), vec![true, false]);
        assert_eq!(trust_mask(Band::Y, 1.7, &[45.0]), vec![true]);
    }

    #[test]
    fn bootstrap_adds_in_quadrature() {
        let mut err = vec![0.03, 0.0];
        combine_bootstrap(&mut err, &[0.04, 0.02]);
        assert_abs_diff_eq!(err[0], 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(err[1], 0.02, epsilon = 1e-12);
    }

    #[test]
    fn magnitude_conversion_masks_non_positive_flux() {
        let mut curve = Curve {
            value: vec![1.0, 0.5, 0.0, -0.1],
            error: vec![0.02, 0.02, 0.02, 0.02],
            mask: vec![true; 4],
        };
        flux_to_magnitude(&mut curve);

        assert_abs_diff_eq!(curve.value[0], 0.0);
        assert_abs_diff_eq!(curve.error[0], 0.02 * FLUX_TO_MAG_ERROR, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.value[1], 0.7526, epsilon = 1e-4);
        assert_eq!(&curve.mask, &[true, true, false, false]);
        assert_eq!((curve.value[3], curve.error[3]), (0.0, MAG_ERROR_SENTINEL));
    }

    #[test]
    fn magnitudes_convert_back_to_flux() {
        let mut curve = Curve {
            value: vec![0.9, 0.37, 0.05],
            error: vec![0.01, 0.03, 0.02],
            mask: vec![true; 3],
        };
        let original = curve.clone();
        flux_to_magnitude(&mut curve);
        for i in 0..3 {
            let (flux, err) = magnitude_to_flux(curve.value[i], curve.error[i]);
            assert_abs_diff_eq!(flux, original.value[i], epsilon = 1e-12);
            assert_abs_diff_eq!(err, original.error[i], epsilon = 1e-12);
        }
    }
}
