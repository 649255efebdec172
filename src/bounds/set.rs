//! A composite boundary made of several `BoundCurve`s.
//!
//! The set keeps two views of its curves:
//!
//! - the curves themselves, sorted by `xmin`, for `interpolate`
//! - a resolved `(x, y)` table over every sample point of every curve, which
//!   is what the evaluator checks the filter response against
//!
//! When two curves sample the same abscissa the tighter value wins: the
//! minimum for an upper bound, the maximum for a lower bound.
//!
//! Precision note: "the same abscissa" means bit-identical `f64`s. Points are
//! merged after a sort with exact equality, so two curves share a point only
//! when both computed it the same way (typically a shared literal end point
//! such as `xmax` of one curve and `xmin` of the next).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bounds::curve::BoundCurve;
use crate::error::FilterError;

/// Delimiter between curve specs in the text form of a set.
pub const DEFAULT_DELIMITER: &str = ";";

/// Which side of the response a set constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    Upper,
    Lower,
}

impl BoundKind {
    pub fn is_lower(self) -> bool {
        self == BoundKind::Lower
    }

    /// Pick the more restrictive of two bound values.
    fn tighter(self, a: f64, b: f64) -> f64 {
        match self {
            BoundKind::Upper => a.min(b),
            BoundKind::Lower => a.max(b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundSet {
    curves: Vec<BoundCurve>,
    edges: Vec<f64>,
    kind: BoundKind,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl BoundSet {
    pub fn new(mut curves: Vec<BoundCurve>, kind: BoundKind) -> Self {
        curves.sort_by(|a, b| a.xmin().total_cmp(&b.xmin()));
        let edges = curves.iter().map(BoundCurve::xmin).collect();

        let mut samples: Vec<(f64, f64)> = curves.iter().flat_map(BoundCurve::points).collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut x: Vec<f64> = Vec::with_capacity(samples.len());
        let mut y: Vec<f64> = Vec::with_capacity(samples.len());
        for (xv, yv) in samples {
            match x.last() {
                Some(&last) if last == xv => {
                    let slot = y.len() - 1;
                    y[slot] = kind.tighter(y[slot], yv);
                }
                _ => {
                    x.push(xv);
                    y.push(yv);
                }
            }
        }

        Self {
            curves,
            edges,
            kind,
            x,
            y,
        }
    }

    /// A set without curves: no constraint.
    pub fn empty(kind: BoundKind) -> Self {
        Self::new(Vec::new(), kind)
    }

    /// Parse a list of curve specs separated by [`DEFAULT_DELIMITER`].
    pub fn parse(s: &str, kind: BoundKind, scale: bool) -> Result<Self, FilterError> {
        Self::parse_with_delimiter(s, DEFAULT_DELIMITER, kind, scale)
    }

    /// Parse `[spec<d>spec<d>...]`; the brackets are optional and an empty
    /// string yields an empty set.
    pub fn parse_with_delimiter(
        s: &str,
        delimiter: &str,
        kind: BoundKind,
        scale: bool,
    ) -> Result<Self, FilterError> {
        if delimiter.is_empty() {
            return Err(FilterError::Config("bound list delimiter must not be empty".into()));
        }
        let s = s.trim().trim_start_matches('[').trim_end_matches(']').trim();
        if s.is_empty() {
            return Ok(Self::empty(kind));
        }
        let curves = s
            .split(delimiter)
            .map(|part| BoundCurve::parse(part.trim(), scale))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(curves, kind))
    }

    /// Combine several sets of the same kind into one.
    pub fn merge(sets: Vec<BoundSet>, kind: BoundKind) -> Self {
        let curves = sets.into_iter().flat_map(|s| s.curves).collect();
        Self::new(curves, kind)
    }

    /// True when the set constrains at least one point.
    pub fn is_active(&self) -> bool {
        !self.is_empty()
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn kind(&self) -> BoundKind {
        self.kind
    }

    pub fn curves(&self) -> &[BoundCurve] {
        &self.curves
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Boundary value at `x` (declared units, see `BoundCurve::interpolate`).
    ///
    /// The curve used is the one with the greatest `xmin <= x`.
    pub fn interpolate(&self, x: f64) -> Result<f64, FilterError> {
        let idx = self.edges.partition_point(|&edge| edge <= x);
        if idx == 0 {
            return Err(FilterError::OutOfRange(format!("too small: {x}")));
        }
        let curve = &self.curves[idx - 1];
        if idx == self.curves.len() && curve.xmax() < x {
            return Err(FilterError::OutOfRange(format!("too large: {x}")));
        }
        curve.interpolate(x)
    }

    /// Resolved y values mapped through `y * multiplier + offset`.
    pub fn shifted_y(&self, offset: f64, multiplier: f64) -> Vec<f64> {
        self.y.iter().map(|y| y * multiplier + offset).collect()
    }
}

impl<'a> IntoIterator for &'a BoundSet {
    type Item = (f64, f64);
    type IntoIter = std::iter::Zip<
        std::iter::Copied<std::slice::Iter<'a, f64>>,
        std::iter::Copied<std::slice::Iter<'a, f64>>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

impl fmt::Display for BoundSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.curves.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(&format!("{DEFAULT_DELIMITER} ")))
    }
}

/// Sorted union of the sample abscissas of `sets`, exact duplicates removed.
pub fn merged_abscissas(sets: &[&BoundSet]) -> Vec<f64> {
    let mut xs: Vec<f64> = sets.iter().flat_map(|s| s.x.iter().copied()).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup_by(|a, b| a == b);
    xs
}
