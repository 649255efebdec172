//! Frequency response and group delay of a `TransferFunction`.
//!
//! Frequencies are in radians per sample (`0..=π` covers up to Nyquist).

use num_complex::Complex64;
use tracing::warn;

use crate::math::poly::{convolve, eval_ascending, TransferFunction};

/// Denominators smaller than this make the group delay undefined.
const SINGULAR_EPS: f64 = 10.0 * f64::EPSILON;

/// `H(e^{jw}) = B(e^{jw}) / A(e^{jw})` at every `w`.
pub fn freq_response(tf: &TransferFunction, w: &[f64]) -> Vec<Complex64> {
    w.iter()
        .map(|&wk| {
            let u = Complex64::from_polar(1.0, -wk);
            eval_ascending(tf.b.as_slice().iter(), u) / eval_ascending(tf.a.as_slice().iter(), u)
        })
        .collect()
}

/// Response of an FIR filter (denominator 1).
pub fn fir_response(taps: &[f64], w: &[f64]) -> Vec<Complex64> {
    freq_response(&TransferFunction::new(taps.to_vec(), vec![1.0]), w)
}

/// Group delay in samples, `-dφ/dw`, at every `w`.
///
/// Uses the polynomial form: with `c = b * reverse(a)` and `c'_k = k·c_k`,
/// `gd = Re(C'(u) / C(u)) - (len(a) - 1)` for `u = e^{-jw}`. Points where
/// `C(u)` vanishes (a zero on the unit circle) are reported as 0.
pub fn group_delay(tf: &TransferFunction, w: &[f64]) -> Vec<f64> {
    let a_rev: Vec<f64> = tf.a.as_slice().iter().rev().copied().collect();
    let c = convolve(tf.b.as_slice(), &a_rev);
    let cr: Vec<f64> = c.iter().enumerate().map(|(k, v)| k as f64 * v).collect();
    let order_a = tf.a.len() as f64 - 1.0;

    let mut singular = 0usize;
    let gd: Vec<f64> = w
        .iter()
        .map(|&wk| {
            let u = Complex64::from_polar(1.0, -wk);
            let den = eval_ascending(c.iter(), u);
            if den.norm() < SINGULAR_EPS {
                singular += 1;
                return 0.0;
            }
            let num = eval_ascending(cr.iter(), u);
            (num / den).re - order_a
        })
        .collect();

    if singular > 0 {
        warn!(singular, "group delay undefined at some frequencies, set to 0");
    }
    gd
}

/// Magnitude in decibels, `20·log10|h|`.
pub fn magnitude_db(h: Complex64) -> f64 {
    20.0 * h.norm().log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn pure_delay_has_constant_group_delay() {
        let tf = TransferFunction::new(vec![0.0, 0.0, 1.0], vec![1.0]);
        for gd in group_delay(&tf, &[0.1, 1.0, 2.5]) {
            assert!((gd - 2.0).abs() < 1e-12);
        }
        for h in freq_response(&tf, &[0.3, 1.7]) {
            assert!((h.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn one_pole_group_delay_matches_closed_form() {
        let p = 0.5;
        let tf = TransferFunction::new(vec![1.0], vec![1.0, -p]);
        let gd = group_delay(&tf, &[0.0, PI]);
        assert!((gd[0] - p / (1.0 - p)).abs() < 1e-12);
        assert!((gd[1] + p / (1.0 + p)).abs() < 1e-12);
        let h = freq_response(&tf, &[0.0]);
        assert!((h[0].re - 2.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_fir_is_linear_phase() {
        let taps = [0.1, 0.2, 0.4, 0.4, 0.2, 0.1];
        let tf = TransferFunction::new(taps.to_vec(), vec![1.0]);
        for gd in group_delay(&tf, &[0.2, 0.8, 1.4]) {
            assert!((gd - 2.5).abs() < 1e-9);
        }
        let h = fir_response(&taps, &[0.0]);
        assert!((h[0].re - 1.4).abs() < 1e-12);
    }

    #[test]
    fn zero_on_unit_circle_is_singular() {
        let tf = TransferFunction::new(vec![1.0, 1.0], vec![1.0]);
        let gd = group_delay(&tf, &[PI]);
        assert_eq!(gd, vec![0.0]);
        assert_eq!(magnitude_db(Complex64::new(10.0, 0.0)), 20.0);
    }
}
