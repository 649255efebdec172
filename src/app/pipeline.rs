//! Shared evaluation pipeline used by the subcommands.
//!
//! config -> masks + evaluator -> objective -> genomes -> evaluations -> report
//!
//! The front-end (`app::run`) only decides what to print and export.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::info;

use crate::domain::{DesignConfig, EvaluationReport, GenomeReport, HistoryRow, ReplayOutcome, TOOL_NAME};
use crate::error::AppError;
use crate::fit::{
    best_index, evaluate_population, ConvergencePolicy, ConvergenceState, FilterObjective, FitnessEvaluator,
    Objective,
};

/// All computed outputs of a single scoring run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: EvaluationReport,
    /// Number of genomes scored (the whole population for `init`).
    pub evaluated: usize,
}

pub fn build_objective(config: &DesignConfig) -> FilterObjective {
    let evaluator = FitnessEvaluator::new(config.masks.clone(), config.evaluator);
    FilterObjective::new(config.layout, config.gain, evaluator, config.sort_population)
}

/// Score explicit genomes and report every one of them.
pub fn run_evaluation(config: &DesignConfig, mut genomes: Vec<Vec<f64>>) -> Result<RunOutput, AppError> {
    if genomes.is_empty() {
        return Err(AppError::new(3, "No genomes to evaluate (use --genome or --genome-file)."));
    }
    let objective = build_objective(config);

    let reports: Vec<GenomeReport> = genomes
        .par_iter_mut()
        .map(|genome| detailed_report(&objective, genome))
        .collect::<Result<_, AppError>>()?;

    let scores: Vec<f64> = reports.iter().map(|r| r.evaluation.fitness).collect();
    let best = best_index(&scores);
    info!(genomes = reports.len(), ?best, "evaluation finished");

    Ok(RunOutput {
        evaluated: reports.len(),
        report: new_report(config, reports, best),
    })
}

/// Draw `population_size` genomes from the seeded RNG, score them all and
/// report either the best one or the whole population.
pub fn run_init(config: &DesignConfig, keep_all: bool) -> Result<RunOutput, AppError> {
    if config.population_size == 0 {
        return Err(AppError::new(2, "Population size must be positive."));
    }
    let objective = build_objective(config);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut population: Vec<Vec<f64>> = (0..config.population_size)
        .map(|_| config.layout.random_genome(&mut rng))
        .collect();

    let scores = evaluate_population(&objective, &mut population)?;
    let best = best_index(&scores);
    info!(
        population = population.len(),
        seed = config.seed,
        best_fitness = best.map(|i| scores[i]),
        "initial population scored"
    );

    let (reports, best) = if keep_all {
        let reports = population
            .par_iter_mut()
            .map(|genome| detailed_report(&objective, genome))
            .collect::<Result<Vec<_>, AppError>>()?;
        (reports, best)
    } else {
        match best {
            Some(idx) => (vec![detailed_report(&objective, &mut population[idx])?], Some(0)),
            None => (Vec::new(), None),
        }
    };

    Ok(RunOutput {
        evaluated: population.len(),
        report: new_report(config, reports, best),
    })
}

/// Feed a recorded history through a fresh policy until it stops.
pub fn replay_history(rows: &[HistoryRow], mut policy: ConvergencePolicy) -> ReplayOutcome {
    for (idx, row) in rows.iter().enumerate() {
        if let ConvergenceState::Stopped(reason) = policy.observe(row.best, row.evaluations) {
            return ReplayOutcome {
                generations: policy.generations(),
                stopped: Some((idx + 1, *row, reason)),
            };
        }
    }
    ReplayOutcome {
        generations: policy.generations(),
        stopped: None,
    }
}

fn detailed_report(objective: &FilterObjective, genome: &mut [f64]) -> Result<GenomeReport, AppError> {
    objective.prepare(genome)?;
    let model = objective.model(genome)?;
    let evaluation = objective.evaluator.evaluate_detailed(&model)?;
    Ok(GenomeReport::new(genome.to_vec(), &model, evaluation))
}

fn new_report(config: &DesignConfig, genomes: Vec<GenomeReport>, best: Option<usize>) -> EvaluationReport {
    EvaluationReport {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        design: config.summary(),
        genomes,
        best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{BoundKind, BoundSet, Masks};
    use crate::fit::{EvaluatorOptions, Termination};
    use crate::models::{Gain, GenomeLayout};

    fn config(layout: GenomeLayout, masks: Masks) -> DesignConfig {
        DesignConfig {
            layout,
            gain: Gain::Auto,
            masks,
            scale_by_pi: true,
            evaluator: EvaluatorOptions::default(),
            sort_population: false,
            seed: 42,
            population_size: 16,
            max_evaluations: Some(500_000),
            stagnation_window: 200,
            export: None,
        }
    }

    #[test]
    fn evaluation_reports_every_genome_and_the_best() {
        let masks = Masks::new(
            BoundSet::parse("0,0.5,0,0,9", BoundKind::Upper, true).unwrap(),
            BoundSet::parse("0,0.5,-1,-1,9", BoundKind::Lower, true).unwrap(),
            BoundSet::empty(BoundKind::Upper),
            BoundSet::empty(BoundKind::Lower),
        )
        .unwrap();
        let mut cfg = config(GenomeLayout::new(0, 1), masks);
        cfg.gain = Gain::Fixed(1.0);
        // a pole at the origin leaves the response flat; a pole at 0.9 boosts DC by 20 dB
        let run = run_evaluation(&cfg, vec![vec![0.9, 0.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(run.evaluated, 2);
        assert_eq!(run.report.best, Some(1));
        assert_eq!(run.report.genomes[1].evaluation.fitness, 0.0);
        assert!(run.report.genomes[0].evaluation.fitness > 0.0);
    }

    #[test]
    fn no_genomes_is_no_data() {
        let cfg = config(GenomeLayout::new(1, 1), Masks::builtin(true).unwrap());
        assert_eq!(run_evaluation(&cfg, Vec::new()).unwrap_err().exit_code(), 3);
        assert_eq!(run_evaluation(&cfg, vec![vec![0.5]]).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn init_is_reproducible_for_a_seed() {
        let cfg = config(GenomeLayout::new(2, 2), Masks::builtin(true).unwrap());
        let a = run_init(&cfg, false).unwrap();
        let b = run_init(&cfg, false).unwrap();
        assert_eq!(a.evaluated, 16);
        assert_eq!(a.report.genomes.len(), 1);
        assert_eq!(a.report.genomes[0].genome, b.report.genomes[0].genome);

        let all = run_init(&cfg, true).unwrap();
        assert_eq!(all.report.genomes.len(), 16);
        let best = all.report.best_genome().unwrap();
        assert_eq!(best.genome, a.report.genomes[0].genome);
    }

    #[test]
    fn replay_stops_at_the_first_trigger() {
        let rows = [
            HistoryRow { evaluations: 150, best: 4.0 },
            HistoryRow { evaluations: 300, best: 1.0 },
            HistoryRow { evaluations: 450, best: 0.0 },
            HistoryRow { evaluations: 600, best: 0.0 },
        ];
        let outcome = replay_history(&rows, ConvergencePolicy::new(false, None, 200));
        assert_eq!(outcome.stopped, Some((3, rows[2], Termination::Feasible)));

        let outcome = replay_history(&rows, ConvergencePolicy::new(true, Some(1_000), 200));
        assert_eq!(outcome.stopped, None);
        assert_eq!(outcome.generations, 4);
    }
}
