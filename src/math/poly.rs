//! Zero-pole-gain to transfer-function conversion.
//!
//! Coefficients are stored highest power of `z` first, i.e. for
//! `b = [b0, b1, ..., bM]`:
//!
//! ```text
//! B(z) = b0 + b1·z^-1 + ... + bM·z^-M
//! ```
//!
//! which is the layout `freq_response` and `group_delay` expect. `from_zpk`
//! has the usual `zpk2tf` contract: empty root lists give `[gain]` and `[1]`.

use nalgebra::DVector;
use num_complex::Complex64;

/// Rational transfer function `B(z)/A(z)` with real coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub b: DVector<f64>,
    pub a: DVector<f64>,
}

impl TransferFunction {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self {
            b: DVector::from_vec(b),
            a: DVector::from_vec(a),
        }
    }

    /// `b = gain·poly(zeros)`, `a = poly(poles)`.
    ///
    /// The root lists must be closed under conjugation; the imaginary parts
    /// left by the expansion are rounding noise and are dropped.
    pub fn from_zpk(zeros: &[Complex64], poles: &[Complex64], gain: f64) -> Self {
        let b = poly_from_roots(zeros).iter().map(|c| c.re * gain).collect();
        let a = poly_from_roots(poles).iter().map(|c| c.re).collect();
        Self::new(b, a)
    }
}

/// Coefficients of the monic polynomial `Π (x - r)` over `roots`.
pub fn poly_from_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = Vec::with_capacity(roots.len() + 1);
    coeffs.push(Complex64::new(1.0, 0.0));
    for &root in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for k in (1..coeffs.len()).rev() {
            let prev = coeffs[k - 1];
            coeffs[k] -= root * prev;
        }
    }
    coeffs
}

/// Evaluate `Σ c_k · u^k` (Horner, lowest power first in `coeffs`).
pub fn eval_ascending<'a, I>(coeffs: I, u: Complex64) -> Complex64
where
    I: DoubleEndedIterator<Item = &'a f64>,
{
    coeffs
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * u + c)
}

/// Full linear convolution of two coefficient sequences.
pub fn convolve(x: &[f64], y: &[f64]) -> Vec<f64> {
    if x.is_empty() || y.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; x.len() + y.len() - 1];
    for (i, &xi) in x.iter().enumerate() {
        for (j, &yj) in y.iter().enumerate() {
            out[i + j] += xi * yj;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn poly_from_real_roots() {
        let c = poly_from_roots(&[Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0)]);
        let re: Vec<f64> = c.iter().map(|v| v.re).collect();
        assert_eq!(re, vec![1.0, -3.0, 2.0]);
    }

    #[test]
    fn conjugate_pair_gives_real_coefficients() {
        let r = Complex64::from_polar(0.9, 2.0 * PI * 0.1);
        let c = poly_from_roots(&[r, r.conj()]);
        assert!(c.iter().all(|v| v.im.abs() < 1e-12));
        assert!((c[1].re + 2.0 * 0.9 * (2.0 * PI * 0.1).cos()).abs() < 1e-12);
        assert!((c[2].re - 0.81).abs() < 1e-12);
    }

    #[test]
    fn zpk_applies_gain_to_numerator_only() {
        let tf = TransferFunction::from_zpk(&[Complex64::new(-1.0, 0.0)], &[Complex64::new(0.5, 0.0)], 0.25);
        assert_eq!(tf.b.as_slice(), &[0.25, 0.25]);
        assert_eq!(tf.a.as_slice(), &[1.0, -0.5]);
    }

    #[test]
    fn zpk2tf_of_conjugate_zeros() {
        let zeros = [Complex64::new(0.0, 1.0), Complex64::new(0.0, -1.0)];
        let poles = [Complex64::new(0.5, 0.0), Complex64::new(-0.5, 0.0)];
        let tf = TransferFunction::from_zpk(&zeros, &poles, 2.0);
        assert_eq!(tf.b.as_slice(), &[2.0, 0.0, 2.0]);
        assert_eq!(tf.a.as_slice(), &[1.0, 0.0, -0.25]);
    }

    #[test]
    fn no_roots_is_a_constant() {
        let tf = TransferFunction::from_zpk(&[], &[], 3.0);
        assert_eq!(tf.b.as_slice(), &[3.0]);
        assert_eq!(tf.a.as_slice(), &[1.0]);
    }

    #[test]
    fn convolve_matches_polynomial_product() {
        assert_eq!(convolve(&[1.0, 1.0], &[1.0, -1.0]), vec![1.0, 0.0, -1.0]);
        assert!(convolve(&[], &[1.0]).is_empty());
    }

    #[test]
    fn eval_ascending_uses_lowest_power_first() {
        let v = eval_ascending([1.0, 2.0, 3.0].iter(), Complex64::new(2.0, 0.0));
        assert_eq!(v, Complex64::new(17.0, 0.0));
    }
}
