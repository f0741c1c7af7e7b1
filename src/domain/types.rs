//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the surface evaluators and the template facade
//! - exported to JSON
//! - reloaded later for plotting or comparisons

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// Photometric band.
///
/// `K`, `J_K` and `H_K` use a closed-form polynomial model; all other bands
/// are evaluated from the light-curve surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    B,
    V,
    #[serde(rename = "u")]
    U,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "r")]
    R,
    #[serde(rename = "i")]
    I,
    Y,
    J,
    H,
    K,
    #[serde(rename = "J_K")]
    JK,
    #[serde(rename = "H_K")]
    HK,
}

impl Band {
    /// Every band, in generation order.
    pub const ALL: [Band; 12] = [
        Band::B,
        Band::V,
        Band::U,
        Band::G,
        Band::R,
        Band::I,
        Band::Y,
        Band::J,
        Band::H,
        Band::K,
        Band::JK,
        Band::HK,
    ];

    /// Bands backed by the light-curve surface.
    pub const SURFACE: [Band; 9] = [
        Band::B,
        Band::V,
        Band::U,
        Band::G,
        Band::R,
        Band::I,
        Band::Y,
        Band::J,
        Band::H,
    ];

    /// Name as used in coefficient bundles, calibration files and on the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Band::B => "B",
            Band::V => "V",
            Band::U => "u",
            Band::G => "g",
            Band::R => "r",
            Band::I => "i",
            Band::Y => "Y",
            Band::J => "J",
            Band::H => "H",
            Band::K => "K",
            Band::JK => "J_K",
            Band::HK => "H_K",
        }
    }

    /// Whether this band uses the closed-form NIR polynomial model.
    pub fn is_color_model(self) -> bool {
        matches!(self, Band::K | Band::JK | Band::HK)
    }

    /// Name of the uncertainty surface paired with this band in a bundle.
    pub fn error_key(self) -> String {
        format!("e_{}", self.name())
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Band {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Band::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| TemplateError::UnsupportedBand(s.to_string()))
    }
}

/// Query epochs: a single epoch or a sequence. Results mirror the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Epochs {
    Scalar(f64),
    Series(Vec<f64>),
}

impl Epochs {
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Epochs::Scalar(t) => std::slice::from_ref(t),
            Epochs::Series(ts) => ts,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Epochs::Scalar(_))
    }

    /// `start, start + step, ...` strictly below `stop`.
    pub fn range(start: f64, stop: f64, step: f64) -> Self {
        let mut out = Vec::new();
        if step > 0.0 {
            let mut i = 0usize;
            loop {
                let t = start + step * i as f64;
                if t >= stop {
                    break;
                }
                out.push(t);
                i += 1;
            }
        }
        Epochs::Series(out)
    }
}

impl From<f64> for Epochs {
    fn from(value: f64) -> Self {
        Epochs::Scalar(value)
    }
}

impl From<Vec<f64>> for Epochs {
    fn from(value: Vec<f64>) -> Self {
        Epochs::Series(value)
    }
}

impl From<&[f64]> for Epochs {
    fn from(value: &[f64]) -> Self {
        Epochs::Series(value.to_vec())
    }
}

/// Per-epoch evaluation output, aligned with the query epochs.
///
/// Only entries with `mask[i]` set are trustworthy; in magnitudes a
/// non-positive flux is reported as value 0 with error 9.99.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Curve {
    pub value: Vec<f64>,
    pub error: Vec<f64>,
    pub mask: Vec<bool>,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// A single-epoch evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub error: f64,
    pub mask: bool,
}

/// Result of `Template::eval`, shaped like the query.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    Scalar(Sample),
    Series(Curve),
}

impl EvaluationResult {
    pub(crate) fn from_curve(curve: Curve, scalar: bool) -> Self {
        if scalar && curve.len() == 1 {
            EvaluationResult::Scalar(Sample {
                value: curve.value[0],
                error: curve.error[0],
                mask: curve.mask[0],
            })
        } else {
            EvaluationResult::Series(curve)
        }
    }

    pub fn as_scalar(&self) -> Option<Sample> {
        match self {
            EvaluationResult::Scalar(s) => Some(*s),
            EvaluationResult::Series(_) => None,
        }
    }

    /// Flatten into a curve (a scalar becomes a one-element curve).
    pub fn into_curve(self) -> Curve {
        match self {
            EvaluationResult::Scalar(s) => Curve {
                value: vec![s.value],
                error: vec![s.error],
                mask: vec![s.mask],
            },
            EvaluationResult::Series(c) => c,
        }
    }
}

/// Options for a single `Template::eval` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalOptions {
    /// Epochs are divided by `1 + redshift` before anything else.
    pub redshift: f64,
    /// Return magnitudes (relative to peak) instead of flux.
    pub as_magnitude: bool,
    /// Stretch-extrapolate decline rates outside the calibrated range.
    pub extrapolate: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            redshift: 0.0,
            as_magnitude: true,
            extrapolate: true,
        }
    }
}

impl EvalOptions {
    pub fn flux() -> Self {
        Self {
            as_magnitude: false,
            ..Self::default()
        }
    }

    pub fn with_redshift(mut self, z: f64) -> Self {
        self.redshift = z;
        self
    }

    pub fn without_extrapolation(mut self) -> Self {
        self.extrapolate = false;
        self
    }
}

/// One band of a generated template (`error < 0` where the template is untrusted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCurve {
    pub time: Vec<f64>,
    pub value: Vec<f64>,
    pub error: Vec<f64>,
}

/// Portable JSON representation of a generated template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub dm15: f64,
    pub normalize: bool,
    pub rv: f64,
    /// Which evaluator produced the curves.
    pub surface: String,
    pub bands: BTreeMap<Band, BandCurve>,
}

/// Smoothing constants of the GLoEs evaluator. Process-wide, not per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GloesParams {
    /// Horizontal (time) kernel width at peak, days.
    pub sigx0: f64,
    /// Vertical (decline-rate) kernel width, mag.
    pub sigy0: f64,
    /// Fractional growth of the horizontal width per day from peak.
    pub xscale: f64,
    /// Cap on the horizontal width, days.
    pub maxsigmax: f64,
}

impl Default for GloesParams {
    fn default() -> Self {
        Self {
            sigx0: 3.0,
            sigy0: 0.3,
            xscale: 0.1,
            maxsigmax: 10.0,
        }
    }
}

/// Engine configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding `tck.json`, `tck2.json`, `bs_error.json` and `templates.csv`.
    pub data_dir: PathBuf,
    /// Add the correction surface (`tck2.json`) when it is present.
    pub use_correction: bool,
    /// Combine bootstrap errors (`bs_error.json`) in quadrature when present.
    pub use_bootstrap_errors: bool,
    /// Fall back to the GLoEs evaluator when no spline bundle loads.
    pub allow_slow_path: bool,
    pub gloes: GloesParams,
}

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "CSPTEMP_DATA_DIR";

impl EngineConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            use_correction: false,
            use_bootstrap_errors: true,
            allow_slow_path: true,
            gloes: GloesParams::default(),
        }
    }

    /// Resolve the data directory from `CSPTEMP_DATA_DIR` (a `.env` file is
    /// honoured), falling back to the `data/` directory next to this crate.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"));
        Self::new(data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_names_round_trip() {
        for band in Band::ALL {
            assert_eq!(band.name().parse::<Band>().unwrap(), band);
        }
        assert!(matches!("Z".parse::<Band>(), Err(TemplateError::UnsupportedBand(b)) if b == "Z"));
        // Names are case-sensitive: `I` is not the `i` band.
        assert!("I".parse::<Band>().is_err());
    }

    #[test]
    fn band_serializes_as_its_name() {
        let json = serde_json::to_string(&[Band::U, Band::JK, Band::B]).unwrap();
        assert_eq!(json, r#"["u","J_K","B"]"#);
    }

    #[test]
    fn epochs_range_excludes_stop() {
        let e = Epochs::range(-10.0, 70.0, 1.0);
        let ts = e.as_slice();
        assert_eq!(ts.len(), 80);
        assert_eq!(ts[0], -10.0);
        assert_eq!(ts[79], 69.0);
    }

    #[test]
    fn scalar_result_mirrors_scalar_query() {
        let curve = Curve {
            value: vec![1.0],
            error: vec![0.1],
            mask: vec![true],
        };
        let r = EvaluationResult::from_curve(curve.clone(), true);
        assert_eq!(r.as_scalar().unwrap().value, 1.0);
        assert_eq!(r.into_curve(), curve);

        let r = EvaluationResult::from_curve(curve, false);
        assert!(r.as_scalar().is_none());
    }
}
