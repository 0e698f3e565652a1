//! Terminal tables and JSON output for evaluation and calibration results.
//!
//! Every command prints either a table (default) or pretty JSON. Evaluation
//! results can also be exported to a per-project file for downstream tooling.

/// Per-project results file.
mod export;
/// Benchmark and AHP weight tables.
mod calibration;

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::model::QualityModel;
use crate::project::Evaluation;
use crate::report_helpers::{self, name_width, separator, truncate_left};

pub use calibration::{print_benchmark, print_weights};
pub use export::export_evaluation;

const WIDTH: usize = 66;

/// Print one project's evaluation, top-down from the Tqi.
pub fn print_evaluation(ev: &Evaluation) {
    let separator = separator(WIDTH);
    println!("Quality Index: {} ({})", ev.project, ev.model);
    println!("{separator}");
    println!(" {:<20} {:.4}", ev.tqi.name, ev.tqi.value);
    match ev.size {
        Some(size) => println!(" {:<20} {size}", "Size"),
        None => println!(" {:<20} -", "Size"),
    }
    println!("{separator}");

    let width = name_width(
        ev.quality_aspects
            .iter()
            .map(|a| a.name.as_str())
            .chain(ev.product_factors.iter().map(|f| f.name.as_str())),
        12,
        40,
    );
    println!(" {:<width$}  {:>6}  {:>7}", "Quality Aspect", "Weight", "Value");
    println!("{separator}");
    for a in &ev.quality_aspects {
        let weight = ev.tqi.weights.get(&a.name).copied().unwrap_or_default();
        println!(" {:<width$}  {:>5.1}%  {:>7.4}", a.name, weight * 100.0, a.value);
        for f in ev.product_factors.iter().filter(|f| a.weights.contains_key(&f.name)) {
            let w = a.weights.get(&f.name).copied().unwrap_or_default();
            println!(
                "   {:<w1$}  {:>5.1}%  {:>7.4}",
                truncate_left(&f.name, width - 2),
                w * 100.0,
                f.value,
                w1 = width - 2
            );
        }
    }
    println!("{separator}");

    let width = name_width(ev.measures.iter().map(|m| m.name.as_str()), 7, 40);
    println!(" {:<width$}  {:>8}  {:>7}  {:>6}", "Measure", "Raw", "Value", "Rules");
    println!("{separator}");
    for m in &ev.measures {
        let matched = m.diagnostics.iter().filter(|d| d.matched).count();
        println!(
            " {:<width$}  {:>8.2}  {:>7.4}  {:>6}",
            truncate_left(&m.name, width),
            m.raw_value,
            m.value,
            format!("{matched}/{}", m.diagnostics.len()),
        );
    }
    println!("{separator}");
}

/// Print the outcome of a multi-project run, one line per root.
pub fn print_batch(results: &[(PathBuf, Result<Evaluation>)]) {
    let separator = separator(WIDTH);
    let paths: Vec<String> = results.iter().map(|(p, _)| p.display().to_string()).collect();
    let width = name_width(paths.iter().map(String::as_str), 7, 48);
    println!(" {:<width$}  {:>8}", "Project", "TQI");
    println!("{separator}");
    for (path, (_, outcome)) in paths.iter().zip(results) {
        let path = truncate_left(path, width);
        match outcome {
            Ok(ev) => println!(" {path:<width$}  {:>8.4}", ev.tqi.value),
            Err(e) => println!(" {path:<width$}  {:>8}  {e}", "failed"),
        }
    }
    println!("{separator}");
}

/// Structure and calibration status of a model descriptor.
pub fn print_validation(qm: &QualityModel) {
    let separator = separator(WIDTH);
    let measures = qm.measures().count();
    let diagnostics = qm.diagnostic_names().len();
    println!("Model: {}", qm.name);
    println!("{separator}");
    println!(" Quality aspects:  {}", qm.aspects().count());
    println!(" Product factors:  {}", qm.factors().count());
    println!(" Measures:         {measures}");
    println!(" Diagnostics:      {diagnostics}");
    println!("{separator}");
    let missing = qm.missing_calibration();
    if missing.is_empty() {
        println!(" Calibration complete");
    } else {
        println!(" Missing calibration constants:");
        for node in &missing {
            println!("   {node}");
        }
    }
    println!("{separator}");
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    report_helpers::print_json_stdout(value)
}

/// Failed roots as one error, or `Ok` when every project evaluated.
pub fn batch_status(results: &[(PathBuf, Result<Evaluation>)]) -> Result<()> {
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(Error::config(format!(
            "{failed} of {} projects could not be evaluated",
            results.len()
        )))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
