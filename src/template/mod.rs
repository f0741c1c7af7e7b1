//! Light-curve templates.
//!
//! A `Template` holds a decline rate and evaluates any band at arbitrary
//! epochs:
//!
//! 1. de-redshift the epochs by `1 + z`
//! 2. closed-form bands (`K`, `J_K`, `H_K`) are evaluated directly
//! 3. otherwise solve the extrapolation stretch (`stretch`), evaluate the
//!    shared surface at the stretched epochs, combine bootstrap errors
//! 4. mask untrusted epochs (`mask`) and convert to magnitudes if asked
//!
//! `generate` fills a per-band cache on a fixed grid for all bands.

use std::collections::BTreeMap;

use chrono::Utc;
use rayon::prelude::*;

use crate::domain::{Band, BandCurve, Curve, Epochs, EvalOptions, EvaluationResult, TemplateFile};
use crate::error::TemplateError;
use crate::surface::Engine;

pub mod color;
pub mod mask;
pub mod peak;
pub mod stretch;

pub use color::color_curve;
pub use mask::{combine_bootstrap, flux_to_magnitude, magnitude_to_flux, trust_mask};
pub use peak::peak_magnitude;
pub use stretch::{DM15_MAX, DM15_MIN, StretchSolution, dm15_to_stretch, solve_stretch};

/// Inclusive day grid used by `generate`.
pub const GENERATE_START: i32 = -15;
pub const GENERATE_END: i32 = 80;

/// Error stored in the generated cache where the template is untrusted.
pub const UNTRUSTED_ERROR: f64 = -1.0;

pub const DEFAULT_RV: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateState {
    /// No decline rate yet.
    Uninitialized,
    Configured,
    /// The per-band cache is filled.
    Generated,
}

/// A light-curve template for one decline rate.
#[derive(Debug, Clone)]
pub struct Template {
    engine: Engine,
    dm15: Option<f64>,
    normalize: bool,
    rv: f64,
    cache: BTreeMap<Band, BandCurve>,
}

/// Template configured for `dm15`, sharing `engine`.
pub fn make_template(engine: &Engine, dm15: f64) -> Template {
    let mut template = Template::new(engine.clone());
    template.set_decline_rate(dm15);
    template
}

impl Template {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            dm15: None,
            normalize: true,
            rv: DEFAULT_RV,
            cache: BTreeMap::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Set the decline rate. Any generated curves are dropped.
    pub fn set_decline_rate(&mut self, dm15: f64) {
        self.dm15 = Some(dm15);
        self.cache.clear();
    }

    pub fn decline_rate(&self) -> Option<f64> {
        self.dm15
    }

    pub fn state(&self) -> TemplateState {
        match (self.dm15, self.cache.is_empty()) {
            (None, _) => TemplateState::Uninitialized,
            (Some(_), true) => TemplateState::Configured,
            (Some(_), false) => TemplateState::Generated,
        }
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Peak-normalize surface flux (only affects the slow path).
    pub fn set_normalize(&mut self, normalize: bool) {
        if self.normalize != normalize {
            self.normalize = normalize;
            self.cache.clear();
        }
    }

    pub fn rv(&self) -> f64 {
        self.rv
    }

    /// Reddening-law parameter used by `peak_absolute_magnitude`.
    pub fn set_rv(&mut self, rv: f64) {
        self.rv = rv;
    }

    fn require_dm15(&self) -> Result<f64, TemplateError> {
        self.dm15.ok_or(TemplateError::Unconfigured)
    }

    /// Evaluate `band` at `epochs`. The result mirrors the shape of `epochs`.
    pub fn eval(
        &self,
        band: Band,
        epochs: impl Into<Epochs>,
        options: EvalOptions,
    ) -> Result<EvaluationResult, TemplateError> {
        let epochs = epochs.into();
        let curve = self.eval_curve(band, epochs.as_slice(), options, None)?;
        Ok(EvaluationResult::from_curve(curve, epochs.is_scalar()))
    }

    fn stretch_solution(&self, dm15: f64, options: EvalOptions) -> Result<StretchSolution, TemplateError> {
        if options.extrapolate {
            solve_stretch(self.engine.evaluator(), dm15, self.normalize)
        } else {
            Ok(StretchSolution::identity(dm15))
        }
    }

    /// `stretch` is solved here when not supplied.
    fn eval_curve(
        &self,
        band: Band,
        epochs: &[f64],
        options: EvalOptions,
        stretch: Option<StretchSolution>,
    ) -> Result<Curve, TemplateError> {
        let dm15 = self.require_dm15()?;
        let rest: Vec<f64> = epochs.iter().map(|t| t / (1.0 + options.redshift)).collect();

        if let Some(curve) = color_curve(band, dm15, &rest) {
            return Ok(curve);
        }

        let surface = self.engine.evaluator();
        let stretch = match stretch {
            Some(solution) => solution,
            None => self.stretch_solution(dm15, options)?,
        };
        let stretched: Vec<f64> = rest.iter().map(|t| t * stretch.stretch).collect();

        let sample = surface.evaluate(band, stretch.dm15, &stretched, self.normalize)?;
        let mut error = sample.error;
        if let Some(bootstrap) = surface.bootstrap_error(band, stretch.dm15, &stretched) {
            combine_bootstrap(&mut error, &bootstrap);
        }

        let mut curve = Curve {
            value: sample.value,
            error,
            mask: trust_mask(band, dm15, &rest),
        };
        if options.as_magnitude {
            flux_to_magnitude(&mut curve);
        }
        Ok(curve)
    }

    /// `-2.5 log10` of the surface flux at a single `(t, dm15)`, with no
    /// stretch or masking. Independent of this template's decline rate.
    pub fn teval(&self, band: Band, t: f64, dm15: f64) -> Result<f64, TemplateError> {
        stretch::teval(self.engine.evaluator(), band, t, dm15, self.normalize)
    }

    /// Evaluate every band on the `GENERATE_START..=GENERATE_END` day grid in
    /// magnitudes and cache the result. Untrusted epochs get error `UNTRUSTED_ERROR`.
    pub fn generate(&mut self) -> Result<(), TemplateError> {
        let dm15 = self.require_dm15()?;
        let options = EvalOptions::default();
        let time: Vec<f64> = (GENERATE_START..=GENERATE_END).map(f64::from).collect();
        let stretch = self.stretch_solution(dm15, options)?;

        let this = &*self;
        let cache = Band::ALL
            .as_slice()
            .par_iter()
            .map(|&band| -> Result<(Band, BandCurve), TemplateError> {
                let curve = this.eval_curve(band, &time, options, Some(stretch))?;
                let error = curve
                    .error
                    .iter()
                    .zip(&curve.mask)
                    .map(|(&e, &ok)| if ok { e } else { UNTRUSTED_ERROR })
                    .collect();
                Ok((band, BandCurve { time: time.clone(), value: curve.value, error }))
            })
            .collect::<Result<BTreeMap<_, _>, TemplateError>>()?;

        self.cache = cache;
        Ok(())
    }

    /// Generated curve for `band`, if `generate` has run.
    pub fn cached(&self, band: Band) -> Option<&BandCurve> {
        self.cache.get(&band)
    }

    pub fn curves(&self) -> &BTreeMap<Band, BandCurve> {
        &self.cache
    }

    /// `(M(max), σ)` from the peak magnitude calibration. `key` is one of
    /// `Bs`, `Vs`, `u`, `g`, `r`, `i`; anything else gives `(-19.0, 0.02)`.
    pub fn peak_absolute_magnitude(&self, key: &str) -> Result<(f64, f64), TemplateError> {
        Ok(peak_magnitude(key, self.require_dm15()?, self.rv))
    }

    /// Snapshot of the generated curves for export.
    pub fn to_file(&self) -> Result<TemplateFile, TemplateError> {
        Ok(TemplateFile {
            tool: env!("CARGO_PKG_NAME").to_string(),
            generated_at: Utc::now(),
            dm15: self.require_dm15()?,
            normalize: self.normalize,
            rv: self.rv,
            surface: self.engine.kind().display_name().to_string(),
            bands: self.cache.clone(),
        })
    }
}
