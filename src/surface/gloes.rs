//! Slow-path evaluator: GLoEs-style interpolation over scattered calibration data.
//!
//! The calibration light curves sample the (time, dm15) plane very unevenly:
//! dense near peak, sparse at late times and at extreme decline rates. For each
//! query point we fit a plane to the nearby data with Gaussian weights
//!
//! ```text
//! w_i = exp(-½ (Δt_i / σx)² - ½ (Δdm15_i / σy)²) / e_i²
//! σx  = min(sigx0 · (1 + xscale · |t|), maxsigmax)
//! ```
//!
//! and report the plane's intercept and its standard error. The horizontal
//! kernel widens away from peak where the data thin out.
//!
//! This is much slower than the spline surface and is only used when no
//! coefficient bundle could be loaded.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{Band, GloesParams};
use crate::error::TemplateError;
use crate::math::solve_weighted;
use crate::surface::{SurfaceEvaluator, SurfaceKind, SurfaceSample};

/// Points further than this many kernel widths away are ignored.
const KERNEL_CUTOFF: f64 = 4.0;

/// Minimum number of contributing points for a local plane.
const MIN_POINTS: usize = 3;

/// Value/error reported where the data cannot support a local fit.
const EMPTY_VALUE: f64 = 0.0;
const EMPTY_ERROR: f64 = 1.0;

/// Epoch grid searched for the peak when normalizing.
const PEAK_SEARCH: (f64, f64, f64) = (-10.0, 10.0, 0.5);

/// One calibration photometry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    /// Days since B maximum (rest frame).
    pub t: f64,
    pub dm15: f64,
    /// Flux normalized to the light curve's own peak.
    pub flux: f64,
    pub e_flux: f64,
}

/// Calibration data grouped by band.
#[derive(Debug, Clone, Default)]
pub struct CalibrationSet {
    points: BTreeMap<Band, Vec<CalibrationPoint>>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, band: Band, point: CalibrationPoint) {
        self.points.entry(band).or_default().push(point);
    }

    pub fn band(&self, band: Band) -> &[CalibrationPoint] {
        self.points.get(&band).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.points.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// GLoEs evaluator over a calibration set.
#[derive(Debug, Clone)]
pub struct GloesSurface {
    data: CalibrationSet,
    params: GloesParams,
}

impl GloesSurface {
    pub fn new(data: CalibrationSet, params: GloesParams) -> Self {
        Self { data, params }
    }

    fn horizontal_width(&self, t: f64) -> f64 {
        (self.params.sigx0 * (1.0 + self.params.xscale * t.abs())).min(self.params.maxsigmax)
    }

    /// Local plane fit at one (t, dm15).
    fn evaluate_point(&self, points: &[CalibrationPoint], t: f64, dm15: f64) -> (f64, f64) {
        if !t.is_finite() || !dm15.is_finite() {
            return (EMPTY_VALUE, EMPTY_ERROR);
        }
        let sigx = self.horizontal_width(t);
        let sigy = self.params.sigy0;

        let mut rows = Vec::new();
        let mut ys = Vec::new();
        let mut ws = Vec::new();
        for p in points {
            let u = (p.t - t) / sigx;
            let v = (p.dm15 - dm15) / sigy;
            if u.abs() > KERNEL_CUTOFF || v.abs() > KERNEL_CUTOFF || !(p.e_flux > 0.0) {
                continue;
            }
            let w = (-0.5 * (u * u + v * v)).exp() / (p.e_flux * p.e_flux);
            if !w.is_finite() {
                continue;
            }
            rows.extend_from_slice(&[1.0, u, v]);
            ys.push(p.flux);
            ws.push(w);
        }

        let n = ys.len();
        if n < MIN_POINTS {
            return (EMPTY_VALUE, EMPTY_ERROR);
        }

        let x = DMatrix::from_row_slice(n, 3, &rows);
        let y = DVector::from_vec(ys);
        let Some(fit) = solve_weighted(&x, &y, &ws) else {
            return (EMPTY_VALUE, EMPTY_ERROR);
        };

        let value = fit.beta[0];
        let error = match fit.covariance {
            Some(cov) => {
                let dof = n.saturating_sub(3);
                let inflation = if dof > 0 { (fit.chi2 / dof as f64).max(1.0) } else { 1.0 };
                (cov[(0, 0)] * inflation).max(0.0).sqrt()
            }
            None => EMPTY_ERROR,
        };
        (value, error)
    }

    fn peak(&self, points: &[CalibrationPoint], dm15: f64) -> Option<f64> {
        let (start, stop, step) = PEAK_SEARCH;
        let steps = ((stop - start) / step).round() as usize;
        let peak = (0..=steps)
            .map(|i| self.evaluate_point(points, start + step * i as f64, dm15).0)
            .fold(f64::NEG_INFINITY, f64::max);
        (peak.is_finite() && peak > 0.0).then_some(peak)
    }
}

impl SurfaceEvaluator for GloesSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Gloes
    }

    fn evaluate(&self, band: Band, dm15: f64, times: &[f64], normalize: bool) -> Result<SurfaceSample, TemplateError> {
        let points = self.data.band(band);
        if points.is_empty() {
            return Err(TemplateError::UnsupportedBand(band.name().to_string()));
        }

        let (mut value, mut error): (Vec<f64>, Vec<f64>) = times
            .par_iter()
            .map(|&t| self.evaluate_point(points, t, dm15))
            .unzip();

        if normalize {
            if let Some(peak) = self.peak(points, dm15) {
                value.iter_mut().for_each(|v| *v /= peak);
                error.iter_mut().for_each(|e| *e /= peak);
            }
        }

        Ok(SurfaceSample { value, error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Calibration data on the plane `flux = 1 - 0.01 t`, independent of dm15.
    fn plane_set() -> CalibrationSet {
        let mut set = CalibrationSet::new();
        for k in 0..6 {
            let dm15 = 0.8 + 0.2 * k as f64;
            for step in 0..=70 {
                let t = -10.0 + step as f64;
                set.push(
                    Band::B,
                    CalibrationPoint { t, dm15, flux: 1.0 - 0.01 * t, e_flux: 0.01 },
                );
            }
        }
        set
    }

    #[test]
    fn reproduces_planar_data() {
        let g = GloesSurface::new(plane_set(), GloesParams::default());
        let out = g.evaluate(Band::B, 1.2, &[0.0, 10.0, 35.5], false).unwrap();
        assert_abs_diff_eq!(out.value[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.value[1], 0.9, epsilon = 1e-9);
        assert_abs_diff_eq!(out.value[2], 0.645, epsilon = 1e-9);
        for e in &out.error {
            assert!(*e > 0.0 && *e < 0.01, "error {e}");
        }
    }

    #[test]
    fn normalization_divides_by_peak() {
        let g = GloesSurface::new(plane_set(), GloesParams::default());
        let raw = g.evaluate(Band::B, 1.2, &[10.0], false).unwrap();
        let norm = g.evaluate(Band::B, 1.2, &[10.0], true).unwrap();
        // Brightest point on the peak search grid is t=-10 (flux 1.1).
        assert_abs_diff_eq!(norm.value[0], raw.value[0] / 1.1, epsilon = 1e-9);
    }

    #[test]
    fn sparse_region_reports_empty_fit() {
        let g = GloesSurface::new(plane_set(), GloesParams::default());
        let out = g.evaluate(Band::B, 1.2, &[400.0], false).unwrap();
        assert_eq!((out.value[0], out.error[0]), (EMPTY_VALUE, EMPTY_ERROR));
    }

    #[test]
    fn non_finite_query_gives_empty_fit() {
        let g = GloesSurface::new(plane_set(), GloesParams::default());
        let out = g.evaluate(Band::B, 1.2, &[f64::NAN, f64::INFINITY, 0.0], false).unwrap();
        assert_eq!((out.value[0], out.error[0]), (EMPTY_VALUE, EMPTY_ERROR));
        assert_eq!((out.value[1], out.error[1]), (EMPTY_VALUE, EMPTY_ERROR));
        assert_abs_diff_eq!(out.value[2], 1.0, epsilon = 1e-9);

        let out = g.evaluate(Band::B, f64::NAN, &[0.0, 10.0], true).unwrap();
        assert!(out.value.iter().all(|&v| v == EMPTY_VALUE));
    }

    #[test]
    fn tiny_flux_errors_do_not_poison_the_fit() {
        let mut set = plane_set();
        // 1/e² overflows to infinity.
        set.push(Band::B, CalibrationPoint { t: 0.0, dm15: 1.2, flux: 5.0, e_flux: 1e-200 });
        let g = GloesSurface::new(set, GloesParams::default());
        let out = g.evaluate(Band::B, 1.2, &[0.0], false).unwrap();
        assert_abs_diff_eq!(out.value[0], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn band_without_data_is_unsupported() {
        let g = GloesSurface::new(plane_set(), GloesParams::default());
        assert!(matches!(
            g.evaluate(Band::H, 1.2, &[0.0], false),
            Err(TemplateError::UnsupportedBand(_))
        ));
    }

    #[test]
    fn kernel_widens_away_from_peak() {
        let g = GloesSurface::new(CalibrationSet::new(), GloesParams::default());
        assert_abs_diff_eq!(g.horizontal_width(0.0), 3.0);
        assert_abs_diff_eq!(g.horizontal_width(10.0), 6.0);
        assert_abs_diff_eq!(g.horizontal_width(-60.0), 10.0);
    }
}
