//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives here so the template code stays free of presentation
//! and output changes stay localized.

pub mod format;

pub use format::*;
