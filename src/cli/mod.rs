//! Command-line parsing for the filter design tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the evaluation code. Numeric knobs fall back to `FOPT_*`
//! environment variables (a `.env` file is loaded at startup).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fopt", version, about = "Pole/zero filter design against magnitude and group-delay masks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score explicit genomes against the masks and print the breakdown.
    Evaluate(EvaluateArgs),
    /// Print the resolved mask points, or interpolate them at given frequencies.
    Bounds(BoundsArgs),
    /// Draw a seeded initial population and score it.
    Init(InitArgs),
    /// Replay a convergence history through the early-termination policy.
    Replay(ReplayArgs),
    /// Print a previously exported report JSON.
    Show(ShowArgs),
}

/// Mask options shared by every command that scores filters.
#[derive(Debug, Args, Clone)]
pub struct MaskArgs {
    /// Upper magnitude bound (dB): `xmin,xmax,ymin,ymax[,n[,use_cos]]`, several
    /// curves joined by the delimiter. Repeatable.
    #[arg(short = 'u', long = "upper-magnitude", value_name = "CURVES")]
    pub upper_magnitude: Vec<String>,

    /// Lower magnitude bound (dB). Repeatable.
    #[arg(short = 'l', long = "lower-magnitude", value_name = "CURVES")]
    pub lower_magnitude: Vec<String>,

    /// Upper group-delay bound. Repeatable.
    #[arg(short = 'U', long = "upper-delay", value_name = "CURVES")]
    pub upper_delay: Vec<String>,

    /// Lower group-delay bound. Repeatable.
    #[arg(short = 'L', long = "lower-delay", value_name = "CURVES")]
    pub lower_delay: Vec<String>,

    /// Separator between curves inside one bound argument.
    #[arg(long, default_value = ";")]
    pub delimiter: String,

    /// Take mask abscissas as radians instead of multiplying them by 2π.
    #[arg(long)]
    pub dont_scale_by_pi: bool,
}

/// Filter layout and scoring options.
#[derive(Debug, Args, Clone)]
pub struct DesignArgs {
    #[command(flatten)]
    pub masks: MaskArgs,

    /// Number of zeros (conjugates are added automatically).
    #[arg(short = 'z', long, env = "FOPT_ZEROS", default_value_t = 5)]
    pub zeros: usize,

    /// Number of poles (conjugates are added automatically).
    #[arg(short = 'p', long, env = "FOPT_POLES", default_value_t = 4)]
    pub poles: usize,

    /// Numerator gain; 0 normalizes the response to 0 dB at DC.
    #[arg(short = 'g', long, env = "FOPT_GAIN", default_value_t = 0.00390625)]
    pub gain: f64,

    /// Keep rewarding distance to the masks once all of them are met.
    #[arg(long)]
    pub optimize_further: bool,

    /// Apply the fixed 8-tap FIR pre-filter to the magnitude response.
    #[arg(long)]
    pub use_prefilter: bool,

    /// Sort zero and pole pairs by angle before evaluation.
    #[arg(long)]
    pub sort_population: bool,

    /// Random seed for population initialization.
    #[arg(long, env = "FOPT_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Population size.
    #[arg(long, env = "FOPT_POPSIZE", default_value_t = 150)]
    pub popsize: usize,

    /// Evaluation budget; 0 disables the budget rule.
    #[arg(long, env = "FOPT_MAX_EVALS", default_value_t = 500_000)]
    pub max_evals: u64,

    /// Stalled generations before the search is considered stagnant; 0 disables.
    #[arg(long, default_value_t = crate::fit::DEFAULT_STAGNATION_WINDOW)]
    pub stagnation_window: usize,

    /// Export the evaluation report to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    /// Genome as comma-separated genes (`r,θ` pairs, zeros first). Repeatable.
    #[arg(long, allow_hyphen_values = true)]
    pub genome: Vec<String>,

    /// File with one genome per line (`#` starts a comment).
    #[arg(long, value_name = "FILE")]
    pub genome_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BoundsArgs {
    #[command(flatten)]
    pub masks: MaskArgs,

    /// Interpolate every active mask at these abscissas (mask units, unscaled).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub at: Vec<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct InitArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    /// Print every genome of the population, not only the best one.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReplayArgs {
    /// CSV with header `evaluations,best`, one row per generation.
    #[arg(long, value_name = "CSV")]
    pub history: PathBuf,

    /// Feasible designs do not stop the search.
    #[arg(long)]
    pub optimize_further: bool,

    /// Evaluation budget; 0 disables the budget rule.
    #[arg(long, env = "FOPT_MAX_EVALS", default_value_t = 500_000)]
    pub max_evals: u64,

    /// Stalled generations before stopping; 0 disables.
    #[arg(long, default_value_t = crate::fit::DEFAULT_STAGNATION_WINDOW)]
    pub stagnation_window: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Report JSON produced by `--export`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Also list every violated mask point of the best genome.
    #[arg(long)]
    pub violations: bool,
}
