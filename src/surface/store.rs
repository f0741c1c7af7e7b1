//! Precomputed spline surfaces, loaded once per process.
//!
//! A data directory can hold three bundles:
//!
//! - `tck.json`: primary surface, `band` → flux spline and `e_band` → error spline
//! - `tck2.json`: optional correction surface with the same layout, added on top
//! - `bs_error.json`: optional bootstrap error surface, `band` → error spline
//!
//! The primary bundle is required. Optional bundles are skipped when absent,
//! but one that exists and fails to parse fails the whole load, the same as a
//! broken primary bundle.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::Band;
use crate::error::LoadError;
use crate::io::read_bundle;
use crate::math::BivariateSpline;

pub const PRIMARY_BUNDLE: &str = "tck.json";
pub const CORRECTION_BUNDLE: &str = "tck2.json";
pub const BOOTSTRAP_BUNDLE: &str = "bs_error.json";

/// Named spline surfaces as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientBundle {
    splines: BTreeMap<String, BivariateSpline>,
}

impl CoefficientBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, spline: BivariateSpline) {
        self.splines.insert(name.into(), spline);
    }

    pub fn get(&self, name: &str) -> Option<&BivariateSpline> {
        self.splines.get(name)
    }

    /// Flux surface for `band`.
    pub fn value(&self, band: Band) -> Option<&BivariateSpline> {
        self.get(band.name())
    }

    /// Uncertainty surface for `band` (`e_<band>`).
    pub fn error(&self, band: Band) -> Option<&BivariateSpline> {
        self.get(&band.error_key())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.splines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.splines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splines.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), (String, String)> {
        for (name, spline) in &self.splines {
            spline.validate().map_err(|reason| (name.clone(), reason))?;
        }
        Ok(())
    }
}

/// The loaded coefficient bundles plus the switches that enable the optional ones.
#[derive(Debug, Clone)]
pub struct SurfaceStore {
    primary: CoefficientBundle,
    correction: Option<CoefficientBundle>,
    bootstrap: Option<CoefficientBundle>,
    use_correction: bool,
    use_bootstrap_errors: bool,
}

impl SurfaceStore {
    /// Store around a primary bundle. Correction is off and bootstrap errors
    /// are on (they only apply once a bootstrap bundle is attached).
    pub fn new(primary: CoefficientBundle) -> Self {
        Self {
            primary,
            correction: None,
            bootstrap: None,
            use_correction: false,
            use_bootstrap_errors: true,
        }
    }

    /// Load all bundles from `dir`.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let primary_path = dir.join(PRIMARY_BUNDLE);
        if !primary_path.is_file() {
            return Err(LoadError::NotFound { path: primary_path });
        }
        let primary = read_bundle(&primary_path)?;
        info!(path = %primary_path.display(), surfaces = primary.len(), "loaded primary surface");

        let mut store = Self::new(primary);
        store.correction = load_optional(&dir.join(CORRECTION_BUNDLE))?;
        store.bootstrap = load_optional(&dir.join(BOOTSTRAP_BUNDLE))?;
        Ok(store)
    }

    pub fn with_correction(mut self, bundle: CoefficientBundle) -> Self {
        self.correction = Some(bundle);
        self
    }

    pub fn with_bootstrap(mut self, bundle: CoefficientBundle) -> Self {
        self.bootstrap = Some(bundle);
        self
    }

    pub fn enable_correction(mut self, on: bool) -> Self {
        self.use_correction = on;
        self
    }

    pub fn enable_bootstrap_errors(mut self, on: bool) -> Self {
        self.use_bootstrap_errors = on;
        self
    }

    pub fn primary(&self) -> &CoefficientBundle {
        &self.primary
    }

    /// The correction bundle, if loaded and enabled.
    pub fn correction(&self) -> Option<&CoefficientBundle> {
        self.correction.as_ref().filter(|_| self.use_correction)
    }

    /// The bootstrap error bundle, if loaded and enabled.
    pub fn bootstrap(&self) -> Option<&CoefficientBundle> {
        self.bootstrap.as_ref().filter(|_| self.use_bootstrap_errors)
    }
}

fn load_optional(path: &Path) -> Result<Option<CoefficientBundle>, LoadError> {
    if !path.is_file() {
        debug!(path = %path.display(), "optional surface bundle not present");
        return Ok(None);
    }
    let bundle = read_bundle(path)?;
    info!(path = %path.display(), surfaces = bundle.len(), "loaded optional surface");
    Ok(Some(bundle))
}
