//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the band identifier (`Band`)
//! - query and result shapes (`Epochs`, `Curve`, `EvaluationResult`, `EvalOptions`)
//! - cached template curves (`BandCurve`)
//! - engine configuration (`EngineConfig`, `GloesParams`)

pub mod types;

pub use types::*;
