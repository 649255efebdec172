//! Mask-violation scoring of a candidate filter.
//!
//! Scoring (lower is better):
//!
//! 1. sample `|H|` in dB on the union of the magnitude masks' abscissas and the
//!    group delay on the union of the delay masks' abscissas
//! 2. every magnitude point above the upper mask or below the lower mask adds
//!    `excess²`
//! 3. the delay curve has no absolute reference, so it is first shifted down
//!    by `delta = max(gd - upper)` (it then touches the upper mask at its worst
//!    point) and every point below the lower mask adds `shortfall²`
//! 4. the result is the sum of squared violations; `0` means feasible
//!
//! With `optimize_further`, a feasible design instead returns a negative
//! refinement score built from the margins to the masks, so the search keeps
//! pushing the response away from the bounds. Margins are rewarded
//! sub-linearly (`sqrt`) while violations are punished quadratically; both
//! shapes are named in [`Penalty`].

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::{BoundSet, Masks};
use crate::error::FilterError;
use crate::math::{fir_response, freq_response, group_delay, magnitude_db};
use crate::models::FilterModel;

/// Fixed 8-tap FIR applied in front of the designed filter when enabled.
pub const PREFILTER_TAPS: [f64; 8] = [
    -0.033271, -0.019816, 0.169865, 0.415454, 0.415454, 0.169865, -0.019816, -0.033271,
];

/// Delay mask values are divided by 2π before comparison.
pub const DEFAULT_DELAY_BOUND_SCALE: f64 = 1.0 / (2.0 * PI);

/// Shapes used to turn a distance to a bound into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    /// Hard violation: `d²`.
    Squared,
    /// Magnitude margin reward: `min(sqrt|d|, 1)`.
    CappedSqrt,
    /// Delay margin reward: `sqrt|d|`.
    Sqrt,
}

impl Penalty {
    pub fn apply(self, d: f64) -> f64 {
        match self {
            Penalty::Squared => d * d,
            Penalty::CappedSqrt => d.abs().sqrt().min(1.0),
            Penalty::Sqrt => d.abs().sqrt(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorOptions {
    /// Keep scoring feasible designs by their distance to the masks.
    pub optimize_further: bool,
    /// Multiply the response by the [`PREFILTER_TAPS`] response.
    pub use_prefilter: bool,
    /// Factor applied to delay mask values before comparison.
    pub delay_bound_scale: f64,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            optimize_further: false,
            use_prefilter: false,
            delay_bound_scale: DEFAULT_DELAY_BOUND_SCALE,
        }
    }
}

/// Which mask a violation was found against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskSide {
    MagnitudeUpper,
    MagnitudeLower,
    DelayLower,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub side: MaskSide,
    /// Abscissa in the sampling units (radians when masks are scaled).
    pub x: f64,
    pub bound: f64,
    pub value: f64,
    pub penalty: f64,
}

/// Full scoring result; `fitness` is what the engine ranks by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub fitness: f64,
    /// Sum of squared violations.
    pub violation: f64,
    /// Accumulated margin reward (only with `optimize_further`).
    pub refinement: f64,
    /// Vertical shift applied to the group delay before the lower check.
    pub delay_offset: Option<f64>,
    pub violations: Vec<Violation>,
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        self.violation == 0.0
    }
}

/// Magnitude (dB) and group delay sampled on the evaluator's grids.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledResponse {
    pub magnitude_db: Vec<f64>,
    pub group_delay: Vec<f64>,
}

#[derive(Debug, Default)]
struct Tally {
    optimize_further: bool,
    violation: f64,
    refinement: f64,
    violations: Vec<Violation>,
}

impl Tally {
    fn hard(&mut self, side: MaskSide, x: f64, bound: f64, value: f64) {
        let penalty = Penalty::Squared.apply(value - bound);
        self.violation += penalty;
        self.violations.push(Violation {
            side,
            x,
            bound,
            value,
            penalty,
        });
    }

    /// Margin rewards only count while nothing has been violated.
    fn soft(&mut self, shape: Penalty, margin: f64) {
        if self.optimize_further && self.violation == 0.0 {
            self.refinement += shape.apply(margin);
        }
    }
}

/// Scores candidate filters against a fixed set of masks.
///
/// Immutable after construction and `Sync`, so one evaluator can serve a
/// whole generation in parallel.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    masks: Masks,
    magnitude_grid: Vec<f64>,
    delay_grid: Vec<f64>,
    prefilter: Option<Vec<Complex64>>,
    options: EvaluatorOptions,
}

impl FitnessEvaluator {
    pub fn new(masks: Masks, options: EvaluatorOptions) -> Self {
        let magnitude_grid = masks.magnitude_grid();
        let delay_grid = masks.delay_grid();
        let prefilter = options
            .use_prefilter
            .then(|| fir_response(&PREFILTER_TAPS, &magnitude_grid));
        debug!(
            magnitude_points = magnitude_grid.len(),
            delay_points = delay_grid.len(),
            prefilter = options.use_prefilter,
            "fitness evaluator ready"
        );
        Self {
            masks,
            magnitude_grid,
            delay_grid,
            prefilter,
            options,
        }
    }

    pub fn magnitude_grid(&self) -> &[f64] {
        &self.magnitude_grid
    }

    pub fn delay_grid(&self) -> &[f64] {
        &self.delay_grid
    }

    /// Scalar fitness of `model`.
    pub fn evaluate_model(&self, model: &FilterModel) -> Result<f64, FilterError> {
        Ok(self.evaluate_detailed(model)?.fitness)
    }

    pub fn evaluate_detailed(&self, model: &FilterModel) -> Result<Evaluation, FilterError> {
        self.score(&self.sample(model))
    }

    /// Sample `model` on the magnitude and delay grids.
    pub fn sample(&self, model: &FilterModel) -> SampledResponse {
        let tf = model.transfer_function();
        let h = freq_response(tf, &self.magnitude_grid);
        let magnitude_db = match &self.prefilter {
            Some(fir) => h.iter().zip(fir).map(|(h, f)| magnitude_db(h * f)).collect(),
            None => h.iter().map(|h| magnitude_db(*h)).collect(),
        };
        let group_delay = group_delay(tf, &self.delay_grid);
        SampledResponse {
            magnitude_db,
            group_delay,
        }
    }

    /// Score an already sampled response.
    pub fn score(&self, response: &SampledResponse) -> Result<Evaluation, FilterError> {
        if response.magnitude_db.len() != self.magnitude_grid.len()
            || response.group_delay.len() != self.delay_grid.len()
        {
            return Err(FilterError::Config(format!(
                "sampled response has {}/{} points, grids have {}/{}",
                response.magnitude_db.len(),
                response.group_delay.len(),
                self.magnitude_grid.len(),
                self.delay_grid.len()
            )));
        }

        let mut tally = Tally {
            optimize_further: self.options.optimize_further,
            ..Tally::default()
        };

        for (x, bound) in &self.masks.magnitude_upper {
            let value = response.magnitude_db[lookup(&self.magnitude_grid, x)?];
            if value > bound {
                tally.hard(MaskSide::MagnitudeUpper, x, bound, value);
            } else {
                tally.soft(Penalty::CappedSqrt, value - bound);
            }
        }
        for (x, bound) in &self.masks.magnitude_lower {
            let value = response.magnitude_db[lookup(&self.magnitude_grid, x)?];
            if value < bound {
                tally.hard(MaskSide::MagnitudeLower, x, bound, value);
            } else {
                tally.soft(Penalty::CappedSqrt, value - bound);
            }
        }

        let delay_offset = self.delay_offset(&response.group_delay)?;
        let delta = delay_offset.unwrap_or(0.0);
        let scale = self.options.delay_bound_scale;
        for (x, bound) in &self.masks.delay_lower {
            let value = response.group_delay[lookup(&self.delay_grid, x)?] - delta;
            let bound = bound * scale;
            if value < bound {
                tally.hard(MaskSide::DelayLower, x, bound, value);
            } else {
                tally.soft(Penalty::Sqrt, value - bound);
            }
        }

        let fitness = if self.options.optimize_further && tally.violation == 0.0 {
            -tally.refinement
        } else {
            tally.violation
        };
        Ok(Evaluation {
            fitness,
            violation: tally.violation,
            refinement: tally.refinement,
            delay_offset,
            violations: tally.violations,
        })
    }

    /// `max(gd - upper·scale)` over the upper delay mask, `None` without one.
    pub fn delay_offset(&self, group_delay: &[f64]) -> Result<Option<f64>, FilterError> {
        upper_delay_offset(
            &self.masks.delay_upper,
            &self.delay_grid,
            group_delay,
            self.options.delay_bound_scale,
        )
    }
}

fn upper_delay_offset(
    upper: &BoundSet,
    grid: &[f64],
    group_delay: &[f64],
    scale: f64,
) -> Result<Option<f64>, FilterError> {
    let mut offset: Option<f64> = None;
    for (x, bound) in upper {
        let d = group_delay[lookup(grid, x)?] - bound * scale;
        if offset.is_none_or(|best| d > best) {
            offset = Some(d);
        }
    }
    Ok(offset)
}

/// Index of `x` in the sorted sampling grid. Mask abscissas are copied into
/// the grid verbatim, so an exact match is expected.
fn lookup(grid: &[f64], x: f64) -> Result<usize, FilterError> {
    let idx = grid.partition_point(|&g| g < x);
    match grid.get(idx) {
        Some(&g) if g == x => Ok(idx),
        _ => Err(FilterError::OutOfRange(format!("{x} is not a sampled abscissa"))),
    }
}
