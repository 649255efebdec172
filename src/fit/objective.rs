//! The seam an external search engine calls: genome in, fitness out.

use rayon::prelude::*;

use crate::error::FilterError;
use crate::fit::evaluator::FitnessEvaluator;
use crate::models::{FilterModel, Gain, GenomeLayout};

/// A minimisation problem over flat real-valued genomes.
///
/// Implementations must be `Sync`: a generation is scored in parallel.
pub trait Objective: Sync {
    fn gene_count(&self) -> usize;

    /// `(min, max)` per gene, used to seed the initial population.
    fn init_ranges(&self) -> Vec<(f64, f64)>;

    /// Pre-evaluation hook; may canonicalise the genome in place.
    fn prepare(&self, _genome: &mut [f64]) -> Result<(), FilterError> {
        Ok(())
    }

    fn evaluate(&self, genome: &[f64]) -> Result<f64, FilterError>;
}

/// Scores pole/zero genomes against the evaluator's masks.
#[derive(Debug, Clone)]
pub struct FilterObjective {
    pub layout: GenomeLayout,
    pub gain: Gain,
    pub evaluator: FitnessEvaluator,
    /// Sort zero and pole pairs before evaluation.
    pub sort_genes: bool,
}

impl FilterObjective {
    pub fn new(layout: GenomeLayout, gain: Gain, evaluator: FitnessEvaluator, sort_genes: bool) -> Self {
        Self {
            layout,
            gain,
            evaluator,
            sort_genes,
        }
    }

    pub fn model(&self, genome: &[f64]) -> Result<FilterModel, FilterError> {
        FilterModel::from_genome(&self.layout, genome, self.gain)
    }
}

impl Objective for FilterObjective {
    fn gene_count(&self) -> usize {
        self.layout.gene_count()
    }

    fn init_ranges(&self) -> Vec<(f64, f64)> {
        self.layout.init_ranges()
    }

    fn prepare(&self, genome: &mut [f64]) -> Result<(), FilterError> {
        if self.sort_genes {
            self.layout.sort_pairs(genome)?;
        }
        Ok(())
    }

    fn evaluate(&self, genome: &[f64]) -> Result<f64, FilterError> {
        self.evaluator.evaluate_model(&self.model(genome)?)
    }
}

/// Prepare and score a whole generation in parallel.
///
/// Scores are returned in population order; the first error aborts.
pub fn evaluate_population<O: Objective + ?Sized>(
    objective: &O,
    population: &mut [Vec<f64>],
) -> Result<Vec<f64>, FilterError> {
    population
        .par_iter_mut()
        .map(|genome| {
            objective.prepare(genome)?;
            objective.evaluate(genome)
        })
        .collect()
}

/// Index of the lowest score; ties go to the earliest index, NaN never wins.
pub fn best_index(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.is_none_or(|b| score < scores[b]) {
            best = Some(idx);
        }
    }
    best
}
