//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments into a `DesignConfig`
//! - runs the evaluation pipeline
//! - prints reports and writes optional exports

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::bounds::{BoundKind, BoundSet, Masks};
use crate::cli::{BoundsArgs, Command, DesignArgs, EvaluateArgs, InitArgs, MaskArgs, ReplayArgs, ShowArgs};
use crate::domain::DesignConfig;
use crate::error::{AppError, FilterError};
use crate::fit::{ConvergencePolicy, EvaluatorOptions};
use crate::models::{Gain, GenomeLayout};

pub mod pipeline;

/// Entry point for the `fopt` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `fopt` and `fopt -z 3 ...` behave like `fopt init ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Evaluate(args) => handle_evaluate(args),
        Command::Bounds(args) => handle_bounds(args),
        Command::Init(args) => handle_init(args),
        Command::Replay(args) => handle_replay(args),
        Command::Show(args) => handle_show(args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`), so stdout stays
/// a clean report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    // A subscriber installed by an embedding process wins.
    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = design_config_from_args(&args.design)?;

    let mut genomes = Vec::new();
    for text in &args.genome {
        genomes.push(crate::io::parse_genome(text)?);
    }
    if let Some(path) = &args.genome_file {
        genomes.extend(crate::io::read_genome_file(path)?);
    }

    let run = pipeline::run_evaluation(&config, genomes)?;
    print_run(&config, &run.report, true);

    if let Some(path) = &config.export {
        crate::io::write_report_json(path, &run.report)?;
    }
    Ok(())
}

fn handle_init(args: InitArgs) -> Result<(), AppError> {
    let config = design_config_from_args(&args.design)?;
    let run = pipeline::run_init(&config, args.all)?;
    print_run(&config, &run.report, false);
    println!("Scored {} genomes (seed {}).", run.evaluated, config.seed);

    if let Some(path) = &config.export {
        crate::io::write_report_json(path, &run.report)?;
    }
    Ok(())
}

fn print_run(config: &DesignConfig, report: &crate::domain::EvaluationReport, show_violations: bool) {
    println!("{}", crate::report::format_report(report, show_violations));
    let offset = report.best_genome().and_then(|g| g.evaluation.delay_offset);
    if let Some(offset) = offset {
        println!(
            "{}",
            crate::report::format_aligned_delay(&config.masks, offset, config.evaluator.delay_bound_scale)
        );
    }
}

fn handle_bounds(args: BoundsArgs) -> Result<(), AppError> {
    let masks = masks_from_args(&args.masks)?;
    if args.at.is_empty() {
        println!("{}", crate::report::format_masks(&masks));
    } else {
        println!("{}", crate::report::format_interpolation(&masks, &args.at));
    }
    Ok(())
}

fn handle_replay(args: ReplayArgs) -> Result<(), AppError> {
    let rows = crate::io::read_history_csv(&args.history)?;
    let policy = ConvergencePolicy::new(
        args.optimize_further,
        budget(args.max_evals),
        args.stagnation_window,
    );
    let outcome = pipeline::replay_history(&rows, policy);
    print!("{}", crate::report::format_replay(&outcome, rows.len()));
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let report = crate::io::read_report_json(&args.report)?;
    println!("{}", crate::report::format_report(&report, args.violations));
    Ok(())
}

pub fn design_config_from_args(args: &DesignArgs) -> Result<DesignConfig, AppError> {
    if !args.gain.is_finite() {
        return Err(AppError::new(2, format!("Gain must be finite, got {}.", args.gain)));
    }
    let masks = masks_from_args(&args.masks)?;

    Ok(DesignConfig {
        layout: GenomeLayout::new(args.zeros, args.poles),
        gain: Gain::from_value(args.gain),
        masks,
        scale_by_pi: !args.masks.dont_scale_by_pi,
        evaluator: EvaluatorOptions {
            optimize_further: args.optimize_further,
            use_prefilter: args.use_prefilter,
            ..EvaluatorOptions::default()
        },
        sort_population: args.sort_population,
        seed: args.seed,
        population_size: args.popsize,
        max_evaluations: budget(args.max_evals),
        stagnation_window: args.stagnation_window,
        export: args.export.clone(),
    })
}

/// Parse and merge every bound argument; no bounds at all means the
/// built-in masks.
pub fn masks_from_args(args: &MaskArgs) -> Result<Masks, FilterError> {
    let scale = !args.dont_scale_by_pi;
    let side = |texts: &[String], kind: BoundKind| -> Result<BoundSet, FilterError> {
        let sets = texts
            .iter()
            .map(|t| BoundSet::parse_with_delimiter(t, &args.delimiter, kind, scale))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoundSet::merge(sets, kind))
    };

    Masks::new(
        side(&args.upper_magnitude, BoundKind::Upper)?,
        side(&args.lower_magnitude, BoundKind::Lower)?,
        side(&args.upper_delay, BoundKind::Upper)?,
        side(&args.lower_delay, BoundKind::Lower)?,
    )?
    .or_builtin(scale)
}

fn budget(max_evals: u64) -> Option<u64> {
    (max_evals > 0).then_some(max_evals)
}

/// Rewrite argv so `fopt` defaults to `fopt init`.
///
/// Rules:
/// - `fopt`                      -> `fopt init`
/// - `fopt -z 3 ...`             -> `fopt init -z 3 ...`
/// - `fopt --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("init".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "evaluate" | "bounds" | "init" | "replay" | "show");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "init".to_string());
        return argv;
    }

    argv
}
