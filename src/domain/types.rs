//! Shared run configuration and report types.
//!
//! The report types are serializable so a run can be exported to JSON and
//! shown again later without re-evaluating.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::bounds::Masks;
use crate::fit::{Evaluation, EvaluatorOptions, Termination};
use crate::models::{FilterModel, Gain, GenomeLayout};

pub const TOOL_NAME: &str = "fopt";

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `FOPT_*` variables).
#[derive(Debug, Clone)]
pub struct DesignConfig {
    pub layout: GenomeLayout,
    pub gain: Gain,
    /// Resolved masks; already replaced by the built-in ones when none were given.
    pub masks: Masks,
    /// Mask abscissas were multiplied by 2π.
    pub scale_by_pi: bool,
    pub evaluator: EvaluatorOptions,
    /// Sort zero/pole pairs before evaluation.
    pub sort_population: bool,

    pub seed: u64,
    pub population_size: usize,
    pub max_evaluations: Option<u64>,
    pub stagnation_window: usize,

    pub export: Option<PathBuf>,
}

impl DesignConfig {
    pub fn summary(&self) -> DesignSummary {
        DesignSummary {
            zeros: self.layout.zeros,
            poles: self.layout.poles,
            gain: self.gain,
            scale_by_pi: self.scale_by_pi,
            evaluator: self.evaluator,
            sort_population: self.sort_population,
            masks: MaskSummary::from(&self.masks),
        }
    }
}

/// Textual form of the four masks (`[c1; c2; ...]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskSummary {
    pub magnitude_upper: String,
    pub magnitude_lower: String,
    pub delay_upper: String,
    pub delay_lower: String,
}

impl From<&Masks> for MaskSummary {
    fn from(masks: &Masks) -> Self {
        Self {
            magnitude_upper: masks.magnitude_upper.to_string(),
            magnitude_lower: masks.magnitude_lower.to_string(),
            delay_upper: masks.delay_upper.to_string(),
            delay_lower: masks.delay_lower.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSummary {
    pub zeros: usize,
    pub poles: usize,
    pub gain: Gain,
    pub scale_by_pi: bool,
    pub evaluator: EvaluatorOptions,
    pub sort_population: bool,
    pub masks: MaskSummary,
}

/// Complex root as `[re, im]`.
pub type Root = [f64; 2];

/// One evaluated genome, with its decoded filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeReport {
    pub genome: Vec<f64>,
    pub evaluation: Evaluation,
    pub zeros: Vec<Root>,
    pub poles: Vec<Root>,
    pub gain: f64,
    pub b: Vec<f64>,
    pub a: Vec<f64>,
    pub stable: bool,
}

impl GenomeReport {
    pub fn new(genome: Vec<f64>, model: &FilterModel, evaluation: Evaluation) -> Self {
        let tf = model.transfer_function();
        Self {
            genome,
            evaluation,
            zeros: model.zeros().iter().map(root).collect(),
            poles: model.poles().iter().map(root).collect(),
            gain: model.gain(),
            b: tf.b.iter().copied().collect(),
            a: tf.a.iter().copied().collect(),
            stable: model.is_stable(),
        }
    }
}

fn root(c: &Complex64) -> Root {
    [c.re, c.im]
}

/// A saved evaluation run (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub design: DesignSummary,
    pub genomes: Vec<GenomeReport>,
    /// Index into `genomes` of the lowest fitness.
    pub best: Option<usize>,
}

impl EvaluationReport {
    pub fn best_genome(&self) -> Option<&GenomeReport> {
        self.best.and_then(|idx| self.genomes.get(idx))
    }
}

/// One row of a convergence history file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub evaluations: u64,
    pub best: f64,
}

/// Where a replayed history would have been stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub generations: usize,
    /// 1-based generation, the row it stopped on and the reason.
    pub stopped: Option<(usize, HistoryRow, Termination)>,
}
