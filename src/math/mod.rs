//! Numerical utilities: spline surfaces, root finding, weighted least squares.

pub mod bspline;
pub mod ols;
pub mod roots;

pub use bspline::*;
pub use ols::*;
pub use roots::*;
