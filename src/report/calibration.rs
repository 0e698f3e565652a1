use crate::calibration::{BenchmarkOutcome, WeightResult};
use crate::report_helpers::{name_width, separator, truncate_left};

pub fn print_benchmark(outcome: &BenchmarkOutcome) {
    let separator = separator(66);
    println!("Benchmark ({})", outcome.strategy);
    println!("{separator}");
    println!(" Projects analyzed: {}", outcome.projects_analyzed);
    println!(" Failures:          {}", outcome.failures.len());
    println!("{separator}");

    let width = name_width(outcome.samples.keys().map(String::as_str), 7, 36);
    println!(" {:<width$}  {:>7}  {:>10}  {:>10}", "Measure", "Samples", "Low", "High");
    println!("{separator}");
    for (measure, values) in &outcome.samples {
        let name = truncate_left(measure, width);
        match outcome.bounds.get(measure) {
            Some(b) => println!(
                " {name:<width$}  {:>7}  {:>10.4}  {:>10.4}",
                values.len(),
                b.low,
                b.high
            ),
            None => println!(" {name:<width$}  {:>7}  {:>10}  {:>10}", 0, "-", "-"),
        }
    }
    println!("{separator}");

    if outcome.failures.is_empty() {
        return;
    }
    println!();
    println!(" Excluded contributions");
    println!("{separator}");
    for f in &outcome.failures {
        let what = f.measure.as_deref().unwrap_or("(all measures)");
        println!(" {} {what}: {}", f.project.display(), f.message);
    }
}

pub fn print_weights(results: &[WeightResult]) {
    let separator = separator(66);
    for r in results {
        println!(
            "{}  (lambda_max {:.4}, CI {:.4}, CR {:.4})",
            r.node, r.lambda_max, r.consistency_index, r.consistency_ratio
        );
        println!("{separator}");
        let width = name_width(r.weights.keys().map(String::as_str), 5, 48);
        for (child, w) in &r.weights {
            println!(" {:<width$}  {:>7.4}", truncate_left(child, width), w);
        }
        if let Some(warning) = &r.warning {
            println!(" warning: {warning}");
        }
        println!("{separator}");
    }
}
