//! Synthetic surfaces for tests.
//!
//! The decline surface is piecewise linear in time and flat in dm15:
//! flux 0.5 at t=-20, 1.0 at peak (t=0), 0.1 at t=80; clamped beyond.
//! The sloped surface scales it linearly in dm15, from 1 at dm15=0.5 down to
//! 1/2 at dm15=2.5.

use std::sync::Arc;

use crate::domain::Band;
use crate::math::BivariateSpline;
use crate::surface::{CoefficientBundle, Engine, SplineSurface, SurfaceStore};

/// Uncertainty carried by `decline_bundle`.
pub const DECLINE_ERROR: f64 = 0.02;

pub fn decline_spline() -> BivariateSpline {
    BivariateSpline::new(
        vec![-20.0, -20.0, 0.0, 80.0, 80.0],
        vec![0.5, 0.5, 2.5, 2.5],
        1,
        1,
        vec![0.5, 0.5, 1.0, 1.0, 0.1, 0.1],
    )
    .unwrap()
}

/// Closed form of `decline_spline` on its interior.
pub fn decline_flux(t: f64) -> f64 {
    let t = t.clamp(-20.0, 80.0);
    if t <= 0.0 { 1.0 + 0.5 * t / 20.0 } else { 1.0 - 0.9 * t / 80.0 }
}

/// `decline_spline` dimmed linearly with dm15.
pub fn sloped_spline() -> BivariateSpline {
    BivariateSpline::new(
        vec![-20.0, -20.0, 0.0, 80.0, 80.0],
        vec![0.5, 0.5, 2.5, 2.5],
        1,
        1,
        vec![0.5, 0.25, 1.0, 0.5, 0.1, 0.05],
    )
    .unwrap()
}

/// Closed form of `sloped_spline`.
pub fn sloped_flux(t: f64, dm15: f64) -> f64 {
    decline_flux(t) * (1.0 - 0.25 * (dm15.clamp(0.5, 2.5) - 0.5))
}

pub fn constant_spline(v: f64) -> BivariateSpline {
    BivariateSpline::new(
        vec![-20.0, -20.0, 80.0, 80.0],
        vec![0.5, 0.5, 2.5, 2.5],
        1,
        1,
        vec![v; 4],
    )
    .unwrap()
}

/// Every surface band mapped to the decline spline, errors constant.
pub fn decline_bundle() -> CoefficientBundle {
    let mut bundle = CoefficientBundle::new();
    for band in Band::SURFACE {
        bundle.insert(band.name(), decline_spline());
        bundle.insert(band.error_key(), constant_spline(DECLINE_ERROR));
    }
    bundle
}

/// Every surface band mapped to the sloped spline, errors constant.
pub fn sloped_bundle() -> CoefficientBundle {
    let mut bundle = CoefficientBundle::new();
    for band in Band::SURFACE {
        bundle.insert(band.name(), sloped_spline());
        bundle.insert(band.error_key(), constant_spline(DECLINE_ERROR));
    }
    bundle
}

/// Every surface band mapped to a constant, optionally with `e_` twins.
pub fn constant_bundle(v: f64, with_errors: bool) -> CoefficientBundle {
    let mut bundle = CoefficientBundle::new();
    for band in Band::SURFACE {
        bundle.insert(band.name(), constant_spline(v));
        if with_errors {
            bundle.insert(band.error_key(), constant_spline(v));
        }
    }
    bundle
}

pub fn engine_from_store(store: SurfaceStore) -> Engine {
    Engine::from_evaluator(Arc::new(SplineSurface::new(Arc::new(store))))
}

pub fn decline_engine() -> Engine {
    engine_from_store(SurfaceStore::new(decline_bundle()))
}
