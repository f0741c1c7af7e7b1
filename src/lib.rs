//! `csp-templates` library crate.
//!
//! Type Ia supernova light-curve templates parameterized by decline rate
//! (dm15). The binary (`csptemp`) is a thin wrapper around this library so
//! that core logic is testable without spawning processes.
//!
//! ```no_run
//! use csp_templates::domain::{Band, EngineConfig, EvalOptions};
//! use csp_templates::surface::initialize;
//! use csp_templates::template::make_template;
//!
//! # fn main() -> Result<(), csp_templates::error::TemplateError> {
//! let engine = initialize(&EngineConfig::from_env())?;
//! let template = make_template(&engine, 1.1);
//! let curve = template.eval(Band::B, vec![-5.0, 0.0, 15.0], EvalOptions::default())?;
//! # let _ = curve;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod surface;
pub mod template;
