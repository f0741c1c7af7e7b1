//! Peak absolute magnitude calibration.
//!
//! `M(max) = A(Rv) + B(Rv) · (dm15 - 1.1)`, with `A` and `B` quadratic in the
//! reddening-law parameter Rv. Keys follow the published table: `Bs` and `Vs`
//! for the CSP B and V filters, then `u`, `g`, `r`, `i`.

/// Returned for any key without a calibration.
pub const DEFAULT_PEAK: (f64, f64) = (-19.0, 0.02);

/// Reference decline rate of the calibration.
const DM15_REFERENCE: f64 = 1.1;

struct PeakCalibration {
    key: &'static str,
    a: [f64; 3],
    b: [f64; 3],
    e_a: f64,
    e_b: f64,
}

const TABLE: [PeakCalibration; 6] = [
    PeakCalibration { key: "Bs", a: [-19.148, -0.065, 0.002], b: [0.561, 0.055, 0.001], e_a: 0.03, e_b: 0.08 },
    PeakCalibration { key: "Vs", a: [-19.146, -0.067, 0.002], b: [0.421, 0.070, -0.002], e_a: 0.03, e_b: 0.08 },
    PeakCalibration { key: "u", a: [-18.722, -0.068, 0.003], b: [0.891, 0.073, -0.001], e_a: 0.04, e_b: 0.12 },
    PeakCalibration { key: "g", a: [-19.187, -0.067, 0.002], b: [0.487, 0.061, -0.000], e_a: 0.03, e_b: 0.09 },
    PeakCalibration { key: "r", a: [-19.061, -0.065, 0.002], b: [0.246, 0.080, -0.004], e_a: 0.03, e_b: 0.08 },
    PeakCalibration { key: "i", a: [-18.486, -0.057, 0.001], b: [0.044, 0.075, -0.004], e_a: 0.03, e_b: 0.08 },
];

fn quadratic([c0, c1, c2]: [f64; 3], rv: f64) -> f64 {
    c0 + c1 * rv + c2 * rv * rv
}

/// `(M(max), σ)` for `key` at the given decline rate and Rv.
pub fn peak_magnitude(key: &str, dm15: f64, rv: f64) -> (f64, f64) {
    let Some(cal) = TABLE.iter().find(|c| c.key == key) else {
        return DEFAULT_PEAK;
    };
    let d = dm15 - DM15_REFERENCE;
    let a = quadratic(cal.a, rv);
    let b = quadratic(cal.b, rv);
    (a + b * d, (cal.e_a * cal.e_a + cal.e_b * cal.e_b * d * d).sqrt())
}
