//! A single straight boundary segment, sampled at a fixed set of abscissas.
//!
//! Text form (one curve): `xmin,xmax,ymin,ymax[,n[,use_cos]]`
//!
//! - `n` is the number of generated samples (default 31)
//! - `use_cos` (`0`/`1`) warps the spacing with a raised cosine so samples
//!   cluster near both ends, where mask transitions usually sit
//!
//! Frequencies are usually given as a fraction of the sampling rate
//! (`0 ≤ x ≤ 0.5`); with `scale = true` every sample abscissa is multiplied by
//! 2π so it is in radians. `interpolate` always works in the declared units.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Sample count used when the text form omits `n`.
pub const DEFAULT_SAMPLES: usize = 31;

/// How generated abscissas are spread over `[xmin, xmax]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Linear,
    /// `a = cos(π·i/(n-1))·(-0.5) + 0.5`, denser near both endpoints.
    Cosine,
}

/// The declarative part of a curve: limits, sample count and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub samples: usize,
    pub spacing: Spacing,
}

impl CurveSpec {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            samples: DEFAULT_SAMPLES,
            spacing: Spacing::Linear,
        }
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    fn validate(&self) -> Result<(), FilterError> {
        let limits = [self.xmin, self.xmax, self.ymin, self.ymax];
        if limits.iter().any(|v| !v.is_finite()) {
            return Err(FilterError::Config(format!(
                "bound limits must be finite: {self}"
            )));
        }
        if self.xmin >= self.xmax {
            return Err(FilterError::Config(format!(
                "bound needs xmin < xmax, got {self}"
            )));
        }
        if self.samples < 2 {
            return Err(FilterError::Config(format!(
                "bound needs at least 2 samples, got {}",
                self.samples
            )));
        }
        Ok(())
    }

    /// Normalized sample positions in `[0, 1]`.
    fn unit_positions(&self) -> impl Iterator<Item = f64> + '_ {
        let last = (self.samples - 1) as f64;
        (0..self.samples).map(move |i| {
            let a = i as f64 / last;
            match self.spacing {
                Spacing::Linear => a,
                Spacing::Cosine => (a * PI).cos() * -0.5 + 0.5,
            }
        })
    }
}

impl FromStr for CurveSpec {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FilterError::Parse(format!(
                "invalid number of parameters: {} in '{s}'",
                fields.len()
            )));
        }

        let mut limits = [0.0; 4];
        for (slot, field) in limits.iter_mut().zip(&fields) {
            *slot = field
                .parse::<f64>()
                .map_err(|e| FilterError::Parse(format!("invalid number '{field}': {e}")))?;
        }

        let mut spec = CurveSpec::new(limits[0], limits[1], limits[2], limits[3]);
        if let Some(n) = fields.get(4) {
            spec.samples = n
                .parse::<usize>()
                .map_err(|e| FilterError::Parse(format!("invalid sample count '{n}': {e}")))?;
        }
        if let Some(flag) = fields.get(5) {
            spec.spacing = match *flag {
                "0" => Spacing::Linear,
                "1" => Spacing::Cosine,
                other => {
                    return Err(FilterError::Parse(format!(
                        "cosine flag must be 0 or 1, got '{other}'"
                    )))
                }
            };
        }
        Ok(spec)
    }
}

impl fmt::Display for CurveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.xmin, self.xmax, self.ymin, self.ymax)
    }
}

/// A validated curve together with its generated sample points.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCurve {
    spec: CurveSpec,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl BoundCurve {
    pub fn new(spec: CurveSpec, scale: bool) -> Result<Self, FilterError> {
        Self::with_extra(spec, scale, &[])
    }

    /// Build a curve and add explicit abscissas `xx` (declared units).
    ///
    /// Their ordinates come from the straight line through the curve's end
    /// points; a point outside `[xmin, xmax]` is rejected.
    pub fn with_extra(spec: CurveSpec, scale: bool, xx: &[f64]) -> Result<Self, FilterError> {
        spec.validate()?;

        let factor = if scale { 2.0 * PI } else { 1.0 };
        let mut x = Vec::with_capacity(spec.samples + xx.len());
        let mut y = Vec::with_capacity(spec.samples + xx.len());
        for a in spec.unit_positions() {
            x.push((a * (spec.xmax - spec.xmin) + spec.xmin) * factor);
            y.push(a * (spec.ymax - spec.ymin) + spec.ymin);
        }

        let mut curve = Self { spec, x, y };
        for &extra in xx {
            let yv = curve.interpolate(extra)?;
            curve.x.push(extra * factor);
            curve.y.push(yv);
        }
        Ok(curve)
    }

    /// Parse the text form, see the module docs.
    pub fn parse(s: &str, scale: bool) -> Result<Self, FilterError> {
        Self::new(s.parse()?, scale)
    }

    /// Linear interpolation of the boundary at `x` (declared units).
    pub fn interpolate(&self, x: f64) -> Result<f64, FilterError> {
        let s = &self.spec;
        if !(s.xmin <= x && x <= s.xmax) {
            return Err(FilterError::OutOfRange(format!(
                "{x} outside [{}, {}]",
                s.xmin, s.xmax
            )));
        }
        let d = (x - s.xmin) / (s.xmax - s.xmin);
        Ok(d * (s.ymax - s.ymin) + s.ymin)
    }

    pub fn xmin(&self) -> f64 {
        self.spec.xmin
    }

    pub fn xmax(&self) -> f64 {
        self.spec.xmax
    }

    /// Sample abscissas (scaled when the curve is scaled), generated first,
    /// explicit extras after.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

impl fmt::Display for BoundCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.spec, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_samples_are_uniform_and_inclusive() {
        let c = BoundCurve::new(CurveSpec::new(0.1, 0.3, -1.0, 1.0).with_samples(5), false).unwrap();
        assert_eq!(c.x().len(), 5);
        assert!((c.x()[0] - 0.1).abs() < 1e-15);
        assert!((c.x()[4] - 0.3).abs() < 1e-15);
        for w in c.x().windows(2) {
            assert!(((w[1] - w[0]) - 0.05).abs() < 1e-12);
        }
        assert!((c.y()[2] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_samples_cluster_at_the_ends() {
        let spec = CurveSpec::new(0.0, 1.0, 0.0, 0.0)
            .with_samples(9)
            .with_spacing(Spacing::Cosine);
        let c = BoundCurve::new(spec, false).unwrap();
        let first_gap = c.x()[1] - c.x()[0];
        let middle_gap = c.x()[5] - c.x()[4];
        assert!(first_gap < middle_gap);
        // x_i = cos(pi*i/(n-1))*(-0.5) + 0.5
        let expected = (PI * 2.0 / 8.0).cos() * -0.5 + 0.5;
        assert!((c.x()[2] - expected).abs() < 1e-12);
        assert!(c.x()[0].abs() < 1e-15);
        assert!((c.x()[8] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scaling_multiplies_abscissas_by_two_pi() {
        let c = BoundCurve::new(CurveSpec::new(0.0, 0.5, 0.0, 1.0).with_samples(3), true).unwrap();
        assert!((c.x()[2] - PI).abs() < 1e-12);
        assert!((c.interpolate(0.25).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn interpolate_is_affine_and_exact_at_ends() {
        let c = BoundCurve::new(CurveSpec::new(1.0, 3.0, 10.0, 20.0), false).unwrap();
        assert_eq!(c.interpolate(1.0).unwrap(), 10.0);
        assert_eq!(c.interpolate(3.0).unwrap(), 20.0);
        let a = c.interpolate(1.5).unwrap();
        let b = c.interpolate(2.5).unwrap();
        let mid = c.interpolate(2.0).unwrap();
        assert!(((a + b) / 2.0 - mid).abs() < 1e-12);
        assert!(matches!(c.interpolate(3.1), Err(FilterError::OutOfRange(_))));
        assert!(matches!(c.interpolate(0.9), Err(FilterError::OutOfRange(_))));
    }

    #[test]
    fn extra_points_take_the_line_value() {
        let c = BoundCurve::with_extra(CurveSpec::new(0.0, 0.5, 0.0, 1.0).with_samples(2), true, &[0.1]).unwrap();
        assert_eq!(c.x().len(), 3);
        assert!((c.x()[2] - 0.2 * PI).abs() < 1e-12);
        assert!((c.y()[2] - 0.2).abs() < 1e-12);

        let bad = BoundCurve::with_extra(CurveSpec::new(0.0, 0.5, 0.0, 1.0), true, &[0.6]);
        assert!(matches!(bad, Err(FilterError::OutOfRange(_))));
    }

    #[test]
    fn parse_defaults_and_flags() {
        let spec: CurveSpec = "0,0.25,-1,-1".parse().unwrap();
        assert_eq!(spec.samples, DEFAULT_SAMPLES);
        assert_eq!(spec.spacing, Spacing::Linear);

        let spec: CurveSpec = "0, 0.25, -1, -2, 7, 1".parse().unwrap();
        assert_eq!(spec.samples, 7);
        assert_eq!(spec.spacing, Spacing::Cosine);
    }

    #[test]
    fn parse_rejects_bad_arity_and_numbers() {
        assert!(matches!("0,1,2".parse::<CurveSpec>(), Err(FilterError::Parse(_))));
        assert!(matches!("0,1,2,3,4,1,9".parse::<CurveSpec>(), Err(FilterError::Parse(_))));
        assert!(matches!("0,one,2,3".parse::<CurveSpec>(), Err(FilterError::Parse(_))));
        assert!(matches!("0,1,2,3,4,2".parse::<CurveSpec>(), Err(FilterError::Parse(_))));
        assert!(matches!(BoundCurve::parse("1,0,0,0", false), Err(FilterError::Config(_))));
        assert!(matches!(BoundCurve::parse("0,1,0,0,1", false), Err(FilterError::Config(_))));
    }

    #[test]
    fn text_form_keeps_the_four_limits() {
        let c = BoundCurve::parse("0.04938,0.2716,-0.025,-0.025,43,1", true).unwrap();
        let again: CurveSpec = c.to_string().parse().unwrap();
        assert_eq!(again.xmin, 0.04938);
        assert_eq!(again.xmax, 0.2716);
        assert_eq!(again.ymin, -0.025);
        assert_eq!(again.ymax, -0.025);
    }
}
