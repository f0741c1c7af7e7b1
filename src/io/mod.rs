//! Input/output helpers.
//!
//! - coefficient bundle JSON read/write (`bundle`)
//! - calibration dataset ingest for the slow path (`calibration`)
//! - template JSON export (`export`)

pub mod bundle;
pub mod calibration;
pub mod export;

pub use bundle::*;
pub use calibration::*;
pub use export::*;
