mod calibration;
mod cli;
mod config;
mod descriptor;
mod error;
mod model;
mod project;
mod report;
mod report_helpers;
#[cfg(test)]
mod testkit;
mod tools;

use std::io;
use std::path::Path;

use clap::{CommandFactory, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use calibration::{Benchmarker, BoundStrategy};
use cli::{Cli, Commands};
use config::Config;
use descriptor::BoundTarget;
use error::{Error, Result};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "qi", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Evaluate {
            model,
            roots,
            output,
            json,
        } => {
            let qm = descriptor::load(&model.descriptor)?;
            qm.check_calibrated()?;
            let tools = config.tool_adapters();
            let size = config.size_metric();
            let results = project::evaluate_roots(&roots, &qm, &tools, size.as_ref());

            if let Some(dir) = &output {
                for ev in results.iter().filter_map(|(_, r)| r.as_ref().ok()) {
                    report::export_evaluation(ev, dir)?;
                }
            }
            if json {
                let evaluations: Vec<_> = results.iter().filter_map(|(_, r)| r.as_ref().ok()).collect();
                report::print_json(&evaluations)?;
            } else if let [(_, Ok(ev))] = results.as_slice() {
                report::print_evaluation(ev);
            } else {
                report::print_batch(&results);
            }
            if results.len() == 1 {
                // A single root reports its own error rather than a count.
                return match results.into_iter().next() {
                    Some((_, Err(e))) => Err(e),
                    _ => Ok(()),
                };
            }
            report::batch_status(&results)
        }
        Commands::Benchmark {
            model,
            corpus,
            marker,
            strategy,
            json,
        } => {
            let qm = descriptor::load(&model.descriptor)?;
            let marker = marker.unwrap_or_else(|| config.benchmark.marker.clone());
            let strategy = strategy.unwrap_or(config.benchmark.strategy);
            let outcome = benchmark(&config, &corpus, &marker, strategy, &qm)?;
            if json {
                report::print_json(&outcome)
            } else {
                report::print_benchmark(&outcome);
                Ok(())
            }
        }
        Commands::Weights {
            model,
            matrices,
            json,
        } => {
            let qm = descriptor::load(&model.descriptor)?;
            let results = calibration::elicit_weights(
                &matrices,
                &qm,
                config.weights.consistency_threshold,
            )?;
            if json {
                report::print_json(&results)
            } else {
                report::print_weights(&results);
                Ok(())
            }
        }
        Commands::Calibrate {
            model,
            corpus,
            matrices,
            output,
            apply_to,
            marker,
            strategy,
        } => {
            let mut qm = descriptor::load(&model.descriptor)?;
            let marker = marker.unwrap_or_else(|| config.benchmark.marker.clone());
            let strategy = strategy.unwrap_or(config.benchmark.strategy);
            let target: BoundTarget = apply_to.unwrap_or(config.benchmark.apply_to);

            let weights = calibration::elicit_weights(
                &matrices,
                &qm,
                config.weights.consistency_threshold,
            )?;
            let outcome = benchmark(&config, &corpus, &marker, strategy, &qm)?;

            descriptor::apply_weights(&mut qm, &weights)?;
            descriptor::apply_bounds(&mut qm, &outcome.bounds, target)?;
            descriptor::save(&qm, &output)?;

            let inconsistent = weights.iter().filter(|w| !w.is_consistent()).count();
            if inconsistent > 0 {
                warn!(nodes = inconsistent, "calibrated with inconsistent judgments");
            }
            let missing = qm.missing_calibration();
            if !missing.is_empty() {
                warn!(nodes = %missing.join(", "), "calibration incomplete");
            }
            info!(path = %output.display(), "wrote calibrated descriptor");
            println!("{}", output.display());
            Ok(())
        }
        Commands::Validate { model, strict } => {
            let qm = descriptor::load(&model.descriptor)?;
            report::print_validation(&qm);
            if strict { qm.check_calibrated() } else { Ok(()) }
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn benchmark(
    config: &Config,
    corpus: &Path,
    marker: &str,
    strategy: BoundStrategy,
    qm: &model::QualityModel,
) -> Result<calibration::BenchmarkOutcome> {
    let tools = config.tool_adapters();
    if tools.is_empty() {
        return Err(Error::config(
            "no tools configured; add [[tools]] entries to qindex.toml",
        ));
    }
    let size = config.size_metric();
    Benchmarker::new(&tools, size.as_ref())
        .with_strategy(strategy)
        .with_jobs(config.benchmark.jobs)
        .derive_bounds(corpus, marker, qm)
}
