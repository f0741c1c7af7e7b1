//! Fast-path evaluator: the precomputed spline surfaces.

use std::sync::Arc;

use crate::domain::Band;
use crate::error::TemplateError;
use crate::surface::{SurfaceKind, SurfaceSample, SurfaceEvaluator, SurfaceStore};

/// Evaluates the primary (plus optional correction) spline bundle.
#[derive(Debug, Clone)]
pub struct SplineSurface {
    store: Arc<SurfaceStore>,
}

impl SplineSurface {
    pub fn new(store: Arc<SurfaceStore>) -> Self {
        Self { store }
    }
}

impl SurfaceEvaluator for SplineSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Spline
    }

    /// `normalize` is ignored: the coefficients were fitted to peak-normalized flux.
    fn evaluate(&self, band: Band, dm15: f64, times: &[f64], _normalize: bool) -> Result<SurfaceSample, TemplateError> {
        let primary = self.store.primary();
        let unsupported = || TemplateError::UnsupportedBand(band.name().to_string());
        let value_surface = primary.value(band).ok_or_else(unsupported)?;
        let error_surface = primary.error(band).ok_or_else(unsupported)?;

        let mut value = value_surface.eval_many(times, dm15);
        let mut error = error_surface.eval_many(times, dm15);

        if let Some(correction) = self.store.correction() {
            if let Some(surface) = correction.value(band) {
                add_in_place(&mut value, &surface.eval_many(times, dm15));
            }
            if let Some(surface) = correction.error(band) {
                add_in_place(&mut error, &surface.eval_many(times, dm15));
            }
        }

        Ok(SurfaceSample { value, error })
    }

    fn bootstrap_error(&self, band: Band, dm15: f64, times: &[f64]) -> Option<Vec<f64>> {
        let surface = self.store.bootstrap()?.value(band)?;
        Some(surface.eval_many(times, dm15))
    }
}

fn add_in_place(acc: &mut [f64], other: &[f64]) {
    for (a, b) in acc.iter_mut().zip(other) {
        *a += b;
    }
}
