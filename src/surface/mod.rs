//! Light-curve surfaces: (time, dm15) → normalized flux and its uncertainty.
//!
//! Two evaluators implement `SurfaceEvaluator`:
//!
//! - `SplineSurface`: fast path over precomputed bivariate spline coefficients
//! - `GloesSurface`: slow path, direct interpolation over the calibration data
//!
//! `initialize` picks one once per process and wraps it in an `Engine` that
//! every template shares read-only.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Band, EngineConfig};
use crate::error::TemplateError;
use crate::io::read_calibration_set;

pub mod gloes;
pub mod spline;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use gloes::*;
pub use spline::*;
pub use store::*;

/// Calibration dataset consumed by the slow path.
pub const CALIBRATION_FILE: &str = "templates.csv";

/// Raw surface output, aligned with the query times.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceSample {
    pub value: Vec<f64>,
    pub error: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Spline,
    Gloes,
}

impl SurfaceKind {
    pub fn display_name(self) -> &'static str {
        match self {
            SurfaceKind::Spline => "bivariate spline",
            SurfaceKind::Gloes => "GLoEs",
        }
    }
}

/// A deterministic light-curve surface.
///
/// `times` are rest-frame days since B maximum with any stretch already
/// applied. Implementations must return one value/error pair per time.
pub trait SurfaceEvaluator: Send + Sync {
    fn kind(&self) -> SurfaceKind;

    /// Flux and uncertainty at `(t, dm15)` for each `t`. When `normalize` is
    /// set, flux is scaled so the band's peak is 1.
    fn evaluate(&self, band: Band, dm15: f64, times: &[f64], normalize: bool) -> Result<SurfaceSample, TemplateError>;

    /// Bootstrap uncertainty to combine in quadrature, when one is available.
    fn bootstrap_error(&self, _band: Band, _dm15: f64, _times: &[f64]) -> Option<Vec<f64>> {
        None
    }
}

/// Shared, immutable handle to the process-wide surface.
#[derive(Clone)]
pub struct Engine {
    evaluator: Arc<dyn SurfaceEvaluator>,
}

impl Engine {
    pub fn from_evaluator(evaluator: Arc<dyn SurfaceEvaluator>) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &dyn SurfaceEvaluator {
        self.evaluator.as_ref()
    }

    pub fn kind(&self) -> SurfaceKind {
        self.evaluator.kind()
    }

    pub fn is_slow_path(&self) -> bool {
        self.kind() == SurfaceKind::Gloes
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("kind", &self.kind()).finish()
    }
}

/// Build the engine: spline bundles if they load, otherwise the GLoEs
/// evaluator over `templates.csv` (unless the fallback is disabled).
pub fn initialize(config: &EngineConfig) -> Result<Engine, TemplateError> {
    match SurfaceStore::load(&config.data_dir) {
        Ok(store) => {
            let store = store
                .enable_correction(config.use_correction)
                .enable_bootstrap_errors(config.use_bootstrap_errors);
            info!(
                correction = store.correction().is_some(),
                bootstrap = store.bootstrap().is_some(),
                "using precomputed spline surface"
            );
            Ok(Engine::from_evaluator(Arc::new(SplineSurface::new(Arc::new(store)))))
        }
        Err(err) if config.allow_slow_path => {
            warn!(error = %err, "no precomputed surface; falling back to GLoEs evaluation");
            load_gloes(&config.data_dir, config)
        }
        Err(err) => Err(TemplateError::MissingSurface(err)),
    }
}

fn load_gloes(dir: &Path, config: &EngineConfig) -> Result<Engine, TemplateError> {
    let set = read_calibration_set(&dir.join(CALIBRATION_FILE))?;
    info!(points = set.len(), "loaded calibration dataset");
    Ok(Engine::from_evaluator(Arc::new(GloesSurface::new(set, config.gloes))))
}
