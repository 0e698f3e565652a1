/// CLI argument definitions for the `qi` command.
///
/// Defines all subcommands, their arguments, and long help text
/// using the `clap` derive macros.
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::calibration::BoundStrategy;
use crate::descriptor::BoundTarget;

/// Top-level CLI parser with global logging and config flags.
#[derive(Parser)]
#[command(
    name = "qi",
    version,
    about = "Hierarchical code quality index with corpus and AHP calibration"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./qindex.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Quality model descriptor shared by every model-driven command.
#[derive(Args)]
pub struct ModelArgs {
    /// Quality model descriptor (.json or .toml)
    pub descriptor: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one or more projects against a calibrated model
    #[command(long_about = "\
Evaluate one or more projects against a calibrated model.

Every configured tool runs against each project root. Their diagnostics are
merged into a private copy of the model, the size metric is measured, and the
tree is evaluated bottom-up:

  Measure        raw value from findings, then normalized
  ProductFactor  thresholded utility of its measures, in [0, 1]
  QualityAspect  weighted sum of its product factors
  TQI            weighted sum of the quality aspects

The model must be fully calibrated; missing weights or thresholds are
listed and evaluation stops. With several roots, each project succeeds or
fails on its own.")]
    Evaluate {
        #[command(flatten)]
        model: ModelArgs,

        /// Project root directories
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Write <project>_evalResults.json files into this directory
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive per-measure bounds from a corpus of reference projects
    #[command(long_about = "\
Derive per-measure bounds from a corpus of reference projects.

Projects are the directories under CORPUS that contain MARKER. Each one is
analyzed independently and every measure's normalized value is collected.
Bounds come from the chosen strategy:

  naive                  observed minimum and maximum (default)
  percentile[:L:U]       L-th and U-th percentile (default 5:95)
  zscore[:K]             mean +/- K standard deviations, clipped (default 2)

A tool failing on one project skips that project only.")]
    Benchmark {
        #[command(flatten)]
        model: ModelArgs,

        /// Corpus root directory
        corpus: PathBuf,

        /// Entry marking a project root (default: from config, else .git)
        #[arg(long)]
        marker: Option<String>,

        /// Bound strategy (default: from config, else naive)
        #[arg(long)]
        strategy: Option<BoundStrategy>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive node weights from pairwise comparison matrices (AHP)
    #[command(long_about = "\
Derive node weights from pairwise comparison matrices (AHP).

DIR holds one CSV file per weighted node (the TQI and each quality aspect).
The header names the node followed by its children; each row holds the
ratios of one child against every other, optionally prefixed by its name:

  TQI,Security,Maintainability
  Security,1,3
  Maintainability,1/3,1

Weights are the principal eigenvector of the matrix. A consistency ratio
above the configured threshold (default 0.1) is reported as a warning.")]
    Weights {
        #[command(flatten)]
        model: ModelArgs,

        /// Directory of comparison-matrix files
        matrices: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run benchmark and weight elicitation and write a calibrated descriptor
    Calibrate {
        #[command(flatten)]
        model: ModelArgs,

        /// Corpus root directory
        #[arg(long)]
        corpus: PathBuf,

        /// Directory of comparison-matrix files
        #[arg(long)]
        matrices: PathBuf,

        /// Calibrated descriptor to write (.json or .toml)
        #[arg(long, value_name = "FILE")]
        output: PathBuf,

        /// Where bounds go (default: from config, else thresholds)
        #[arg(long, value_enum)]
        apply_to: Option<BoundTarget>,

        /// Entry marking a project root (default: from config, else .git)
        #[arg(long)]
        marker: Option<String>,

        /// Bound strategy (default: from config, else naive)
        #[arg(long)]
        strategy: Option<BoundStrategy>,
    },

    /// Check a descriptor's structure and report missing calibration
    Validate {
        #[command(flatten)]
        model: ModelArgs,

        /// Fail when any node lacks weights or thresholds
        #[arg(long)]
        strict: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}
