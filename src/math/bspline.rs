//! Tensor-product B-spline surfaces.
//!
//! A surface is stored the way FITPACK's `bisplrep` emits it:
//!
//! - knot vectors `tx`, `ty`
//! - degrees `kx`, `ky`
//! - a flat coefficient array `c` of length `(len(tx)-kx-1) * (len(ty)-ky-1)`,
//!   x-major (`c[i * ncy + j]` multiplies `Bx_i(x) * By_j(y)`)
//!
//! Evaluation follows `bisplev`: arguments outside the knot interior
//! `[t[k], t[n-k-1]]` are clamped onto it, so the surface is flat beyond its
//! support instead of extrapolating the end polynomial.

use serde::{Deserialize, Serialize};

/// Highest supported degree (FITPACK limit).
pub const MAX_DEGREE: usize = 5;

/// A bivariate spline surface `S(x, y) = Σᵢ Σⱼ cᵢⱼ Bᵢ(x) Bⱼ(y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BivariateSpline {
    pub tx: Vec<f64>,
    pub ty: Vec<f64>,
    pub kx: usize,
    pub ky: usize,
    pub c: Vec<f64>,
}

impl BivariateSpline {
    /// Build a surface and check its shape invariants.
    pub fn new(tx: Vec<f64>, ty: Vec<f64>, kx: usize, ky: usize, c: Vec<f64>) -> Result<Self, String> {
        let spline = Self { tx, ty, kx, ky, c };
        spline.validate()?;
        Ok(spline)
    }

    /// Check degrees, knot ordering, and coefficient count.
    ///
    /// Deserialized surfaces must pass this before `eval` is called; `eval`
    /// indexes without bounds checks beyond what these invariants guarantee.
    pub fn validate(&self) -> Result<(), String> {
        validate_axis("x", &self.tx, self.kx)?;
        validate_axis("y", &self.ty, self.ky)?;
        let expected = self.ncx() * self.ncy();
        if self.c.len() != expected {
            return Err(format!(
                "expected {expected} coefficients for {}x{} knots (kx={}, ky={}), got {}",
                self.tx.len(),
                self.ty.len(),
                self.kx,
                self.ky,
                self.c.len()
            ));
        }
        if self.c.iter().any(|v| !v.is_finite()) {
            return Err("non-finite coefficient".to_string());
        }
        Ok(())
    }

    /// Number of coefficients along x.
    pub fn ncx(&self) -> usize {
        self.tx.len() - self.kx - 1
    }

    /// Number of coefficients along y.
    pub fn ncy(&self) -> usize {
        self.ty.len() - self.ky - 1
    }

    /// Domain of the surface along x (the clamping interval).
    pub fn x_domain(&self) -> (f64, f64) {
        (self.tx[self.kx], self.tx[self.tx.len() - self.kx - 1])
    }

    /// Evaluate the surface at a single point.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let (lx, hx) = span_basis(&self.tx, self.kx, x);
        let (ly, hy) = span_basis(&self.ty, self.ky, y);
        self.contract(lx, &hx, ly, &hy)
    }

    /// Evaluate along `xs` at a fixed `y`.
    ///
    /// The y basis is computed once, which is the common case for a light
    /// curve at a single decline rate.
    pub fn eval_many(&self, xs: &[f64], y: f64) -> Vec<f64> {
        let (ly, hy) = span_basis(&self.ty, self.ky, y);
        xs.iter()
            .map(|&x| {
                let (lx, hx) = span_basis(&self.tx, self.kx, x);
                self.contract(lx, &hx, ly, &hy)
            })
            .collect()
    }

    fn contract(&self, lx: usize, hx: &[f64; MAX_DEGREE + 1], ly: usize, hy: &[f64; MAX_DEGREE + 1]) -> f64 {
        let ncy = self.ncy();
        let ix0 = lx - self.kx;
        let iy0 = ly - self.ky;
        let mut sum = 0.0;
        for i in 0..=self.kx {
            let row = (ix0 + i) * ncy + iy0;
            let mut inner = 0.0;
            for j in 0..=self.ky {
                inner += self.c[row + j] * hy[j];
            }
            sum += hx[i] * inner;
        }
        sum
    }
}

fn validate_axis(axis: &str, t: &[f64], k: usize) -> Result<(), String> {
    if k == 0 || k > MAX_DEGREE {
        return Err(format!("degree k{axis}={k} outside 1..={MAX_DEGREE}"));
    }
    if t.len() < 2 * (k + 1) {
        return Err(format!(
            "need at least {} knots along {axis} for degree {k}, got {}",
            2 * (k + 1),
            t.len()
        ));
    }
    if t.iter().any(|v| !v.is_finite()) {
        return Err(format!("non-finite knot along {axis}"));
    }
    if t.windows(2).any(|w| w[1] < w[0]) {
        return Err(format!("knots along {axis} are not non-decreasing"));
    }
    if t[k] >= t[t.len() - k - 1] {
        return Err(format!("empty knot interior along {axis}"));
    }
    Ok(())
}

/// Clamp `x` into the knot interior, locate its span, and return the span
/// index together with the `k + 1` non-zero basis values on it.
fn span_basis(t: &[f64], k: usize, x: f64) -> (usize, [f64; MAX_DEGREE + 1]) {
    let n = t.len();
    let lo = t[k];
    let hi = t[n - k - 1];
    let x = x.clamp(lo, hi);

    // t[l] <= x < t[l+1], with the last interior span closed on the right.
    let upper = n - k - 2;
    let mut l = k;
    while l < upper && x >= t[l + 1] {
        l += 1;
    }

    (l, basis_on_span(t, k, x, l))
}

/// Cox–de Boor recursion for the `k + 1` B-splines that are non-zero on span `l`.
///
/// `h[m]` is the value of `B_{l-k+m}(x)`.
fn basis_on_span(t: &[f64], k: usize, x: f64, l: usize) -> [f64; MAX_DEGREE + 1] {
    let mut h = [0.0; MAX_DEGREE + 1];
    let mut hh = [0.0; MAX_DEGREE + 1];
    h[0] = 1.0;

    for j in 1..=k {
        hh[..j].copy_from_slice(&h[..j]);
        h[0] = 0.0;
        for i in 1..=j {
            let li = l + i;
            let lj = li - j;
            let denom = t[li] - t[lj];
            if denom == 0.0 {
                h[i] = 0.0;
                continue;
            }
            let f = hh[i - 1] / denom;
            h[i - 1] += f * (t[li] - x);
            h[i] = f * (x - t[lj]);
        }
    }
    h
}
