//! Error types.
//!
//! - `TemplateError`: everything the library can surface to a caller.
//! - `LoadError`: coefficient bundle loading failures. The engine initializer
//!   turns these into the slow-path fallback instead of failing.
//! - `AppError`: what the `csptemp` binary reports, with a process exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::math::RootError;

/// Failure to load a coefficient bundle from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("coefficient bundle '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read coefficient bundle '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid coefficient bundle '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid spline '{name}' in '{}': {reason}", path.display())]
    InvalidSpline {
        path: PathBuf,
        name: String,
        reason: String,
    },
}

/// Errors surfaced by template generation and evaluation.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("band '{0}' is not supported")]
    UnsupportedBand(String),

    #[error("no precomputed surface available: {0}")]
    MissingSurface(#[from] LoadError),

    #[error("cannot bracket the stretch solution for dm15={dm15} on [{lo}, {hi}]")]
    RootBracket { dm15: f64, lo: f64, hi: f64 },

    #[error("stretch solve failed: {0}")]
    Root(#[from] RootError),

    #[error("template has no decline rate; call set_decline_rate first")]
    Unconfigured,

    #[error("calibration dataset: {0}")]
    Calibration(String),

    #[error("failed to write '{}': {message}", path.display())]
    Export { path: PathBuf, message: String },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        let exit_code = match err {
            TemplateError::UnsupportedBand(_)
            | TemplateError::MissingSurface(_)
            | TemplateError::Calibration(_)
            | TemplateError::Export { .. } => 2,
            TemplateError::RootBracket { .. }
            | TemplateError::Root(_)
            | TemplateError::Unconfigured => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
