use super::*;
use crate::testkit::{FakeTool, FixedSize, diagnostics, uncalibrated_model};
use std::fs;

fn corpus(names: &[&str]) -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let roots = names
        .iter()
        .map(|n| {
            let p = dir.path().join(n);
            fs::create_dir_all(p.join(".git")).unwrap();
            p
        })
        .collect();
    (dir, roots)
}

fn no_size() -> FixedSize {
    FixedSize(BTreeMap::new())
}

#[test]
fn naive_bound_is_literal_min_and_max() {
    let b = BoundStrategy::Naive.bound(&[2.0, 5.0, 1.0]).unwrap();
    assert_eq!(b, Bound { low: 1.0, high: 5.0 });
}

#[test]
fn no_values_no_bound() {
    assert!(BoundStrategy::Naive.bound(&[]).is_none());
}

#[test]
fn percentile_bound_interpolates() {
    let s = BoundStrategy::Percentile { lower: 25.0, upper: 75.0 };
    let b = s.bound(&[5.0, 1.0, 4.0, 2.0, 3.0]).unwrap();
    assert_eq!(b, Bound { low: 2.0, high: 4.0 });

    let b = s.bound(&[0.0, 10.0]).unwrap();
    assert!((b.low - 2.5).abs() < 1e-12);
    assert!((b.high - 7.5).abs() < 1e-12);
}

#[test]
fn zscore_bound_is_clipped_to_observed_range() {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0];
    let b = BoundStrategy::ZScore { k: 1.0 }.bound(&values).unwrap();
    assert!((b.low - (3.0 - 2f64.sqrt())).abs() < 1e-12);
    assert!((b.high - (3.0 + 2f64.sqrt())).abs() < 1e-12);

    let wide = BoundStrategy::ZScore { k: 10.0 }.bound(&values).unwrap();
    assert_eq!(wide, Bound { low: 1.0, high: 5.0 });
}

#[test]
fn strategy_from_str() {
    assert_eq!("naive".parse::<BoundStrategy>().unwrap(), BoundStrategy::Naive);
    assert_eq!(
        "percentile".parse::<BoundStrategy>().unwrap(),
        BoundStrategy::Percentile { lower: 5.0, upper: 95.0 }
    );
    assert_eq!(
        "percentile:10:90".parse::<BoundStrategy>().unwrap(),
        BoundStrategy::Percentile { lower: 10.0, upper: 90.0 }
    );
    assert_eq!("zscore:1.5".parse::<BoundStrategy>().unwrap(), BoundStrategy::ZScore { k: 1.5 });
    assert!("percentile:90:10".parse::<BoundStrategy>().is_err());
    assert!("zscore:-1".parse::<BoundStrategy>().is_err());
    assert!("median".parse::<BoundStrategy>().is_err());
    assert!("zscore:x".parse::<BoundStrategy>().is_err());
}

#[test]
fn strategy_display_parses_back() {
    let s = BoundStrategy::Percentile { lower: 10.0, upper: 90.0 };
    assert_eq!(s.to_string().parse::<BoundStrategy>().unwrap(), s);
}

#[test]
fn bounds_from_three_projects() {
    let (_dir, roots) = corpus(&["p1", "p2", "p3"]);
    let tools: Vec<Box<dyn ToolAdapter>> = vec![Box::new(
        FakeTool::new("lint")
            .with_output("p1", diagnostics(&[("long-method", 2), ("xss", 1)]))
            .with_output("p2", diagnostics(&[("long-method", 5)]))
            .with_output("p3", diagnostics(&[("long-method", 1), ("sql-injection", 4)])),
    )];
    let size = no_size();
    let qm = uncalibrated_model();

    let outcome = Benchmarker::new(&tools, &size).derive_from_roots(&roots, &qm).unwrap();

    assert_eq!(outcome.projects_analyzed, 3);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.samples["Long Methods"], vec![2.0, 5.0, 1.0]);
    assert_eq!(outcome.bounds["Long Methods"], Bound { low: 1.0, high: 5.0 });
    assert_eq!(outcome.bounds["Injection Findings"], Bound { low: 0.0, high: 4.0 });
    assert_eq!(outcome.bounds["Duplicated Blocks"], Bound { low: 0.0, high: 0.0 });
}

#[test]
fn failing_project_is_skipped_not_fatal() {
    let (_dir, roots) = corpus(&["p1", "p2", "p3"]);
    let tools: Vec<Box<dyn ToolAdapter>> = vec![Box::new(
        FakeTool::new("lint")
            .with_output("p1", diagnostics(&[("long-method", 2)]))
            .with_output("p2", diagnostics(&[("long-method", 50)]))
            .with_output("p3", diagnostics(&[("long-method", 7)]))
            .failing_on("p2"),
    )];
    let size = no_size();

    let outcome = Benchmarker::new(&tools, &size)
        .derive_from_roots(&roots, &uncalibrated_model())
        .unwrap();

    assert_eq!(outcome.projects_analyzed, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].project.ends_with("p2"));
    assert!(outcome.failures[0].measure.is_none());
    assert_eq!(outcome.bounds["Long Methods"], Bound { low: 2.0, high: 7.0 });
}

#[test]
fn measure_error_excludes_only_that_value() {
    let (_dir, roots) = corpus(&["p1", "p2"]);
    let mut qm = uncalibrated_model();
    qm.measure_mut("Long Methods").unwrap().normalizer =
        crate::model::Normalizer::PerSize { scale: 1.0 };
    let tools: Vec<Box<dyn ToolAdapter>> = vec![Box::new(
        FakeTool::new("lint")
            .with_output("p1", diagnostics(&[("long-method", 4), ("dup-block", 1)]))
            .with_output("p2", diagnostics(&[("long-method", 6), ("dup-block", 3)])),
    )];
    // p2 reports a zero size, so its per-size value cannot be computed.
    let size = FixedSize(BTreeMap::from([("p1".to_string(), 2.0), ("p2".to_string(), 0.0)]));

    let outcome = Benchmarker::new(&tools, &size).derive_from_roots(&roots, &qm).unwrap();

    assert_eq!(outcome.projects_analyzed, 2);
    assert_eq!(outcome.samples["Long Methods"], vec![2.0]);
    assert_eq!(outcome.samples["Duplicated Blocks"], vec![1.0, 3.0]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].measure.as_deref(), Some("Long Methods"));
}

#[test]
fn prototype_is_left_untouched() {
    let (_dir, roots) = corpus(&["p1"]);
    let tools: Vec<Box<dyn ToolAdapter>> =
        vec![Box::new(FakeTool::new("lint").with_output("p1", diagnostics(&[("xss", 3)])))];
    let size = no_size();
    let qm = uncalibrated_model();
    Benchmarker::new(&tools, &size).derive_from_roots(&roots, &qm).unwrap();
    assert_eq!(qm.measure("Injection Findings").unwrap().finding_count(), 0);
}

#[test]
fn derive_bounds_discovers_projects_by_marker() {
    let (dir, _roots) = corpus(&["a", "b"]);
    fs::create_dir_all(dir.path().join("not-a-project")).unwrap();
    let tools: Vec<Box<dyn ToolAdapter>> = vec![Box::new(
        FakeTool::new("lint")
            .with_output("a", diagnostics(&[("dup-block", 1)]))
            .with_output("b", diagnostics(&[("dup-block", 3)])),
    )];
    let size = no_size();
    let outcome = Benchmarker::new(&tools, &size)
        .with_jobs(2)
        .derive_bounds(dir.path(), ".git", &uncalibrated_model())
        .unwrap();
    assert_eq!(outcome.projects_analyzed, 2);
    assert_eq!(outcome.bounds["Duplicated Blocks"], Bound { low: 1.0, high: 3.0 });
}

#[test]
fn empty_corpus_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let tools: Vec<Box<dyn ToolAdapter>> = Vec::new();
    let size = no_size();
    let err = Benchmarker::new(&tools, &size)
        .derive_bounds(dir.path(), ".git", &uncalibrated_model())
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
