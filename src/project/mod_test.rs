use super::*;
use crate::testkit::{FakeTool, FixedSize, calibrated_model, diagnostics, uncalibrated_model};
use std::collections::BTreeMap;
use std::fs;

#[test]
fn new_project_starts_without_findings() {
    let mut proto = calibrated_model();
    proto.merge_diagnostics(&diagnostics(&[("xss", 4)]));
    let p = Project::new("app", &proto);
    assert_eq!(p.model().measure("Injection Findings").unwrap().finding_count(), 0);
    assert_eq!(p.name(), "app");
    assert!(p.root().is_none());
}

#[test]
fn findings_do_not_leak_between_projects() {
    let proto = calibrated_model();
    let mut a = Project::new("a", &proto);
    let b = Project::new("b", &proto);
    a.apply_findings(&diagnostics(&[("long-method", 10)]));
    assert_eq!(a.model().measure("Long Methods").unwrap().finding_count(), 10);
    assert_eq!(b.model().measure("Long Methods").unwrap().finding_count(), 0);
    assert_eq!(proto.measure("Long Methods").unwrap().finding_count(), 0);
}

#[test]
fn evaluate_computes_every_level() {
    let mut p = Project::new("app", &calibrated_model());
    let summary = p.apply_findings(&diagnostics(&[("xss", 2), ("long-method", 5), ("unused", 1)]));
    assert!(summary.dropped.contains("unused"));

    let ev = p.evaluate().unwrap();
    // Injection: 2 findings, thresholds [0, 5, 10], higher is worse.
    let injection = ev.factor("Injection").unwrap().value;
    assert!((injection - 0.8).abs() < 1e-12);
    let complexity = ev.factor("Complexity").unwrap().value;
    assert!((complexity - 0.5).abs() < 1e-12);
    assert_eq!(ev.factor("Duplication").unwrap().value, 1.0);

    let maintainability = ev.aspect("Maintainability").unwrap().value;
    assert!((maintainability - 0.75).abs() < 1e-12);
    assert!((ev.tqi.value - (0.6 * 0.8 + 0.4 * 0.75)).abs() < 1e-12);

    let m = ev.measure("Injection Findings").unwrap();
    assert_eq!(m.raw_value, 2.0);
    let xss = m.diagnostics.iter().find(|d| d.name == "xss").unwrap();
    assert!(xss.matched);
    assert_eq!(xss.findings, 2);
    let sql = m.diagnostics.iter().find(|d| d.name == "sql-injection").unwrap();
    assert!(!sql.matched);
}

#[test]
fn evaluate_requires_calibration() {
    let p = Project::new("app", &uncalibrated_model());
    let err = p.evaluate().unwrap_err();
    match err {
        Error::MissingCalibration { nodes } => {
            assert_eq!(nodes[0], "TQI");
            assert!(nodes.contains(&"Complexity".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn from_root_uses_directory_name() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("billing-service");
    fs::create_dir(&root).unwrap();
    let p = Project::from_root(&root, &calibrated_model()).unwrap();
    assert_eq!(p.name(), "billing-service");
    assert_eq!(p.root(), Some(root.as_path()));
}

#[test]
fn from_root_rejects_missing_directory() {
    let err = Project::from_root(Path::new("/no/such/project"), &calibrated_model()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn analyze_runs_tools_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app");
    fs::create_dir(&root).unwrap();
    let tools: Vec<Box<dyn ToolAdapter>> =
        vec![Box::new(FakeTool::new("lint").with_output("app", diagnostics(&[("dup-block", 3)])))];
    let size = FixedSize(BTreeMap::from([("app".to_string(), 250.0)]));

    let mut p = Project::from_root(&root, &calibrated_model()).unwrap();
    let summary = p.analyze(&tools, &size).unwrap();
    assert!(summary.matched.contains("dup-block"));
    assert_eq!(p.size(), Some(250.0));
    assert_eq!(p.measure_value("Duplicated Blocks").unwrap(), 3.0);
}

#[test]
fn analyze_without_root_fails() {
    let tools: Vec<Box<dyn ToolAdapter>> = Vec::new();
    let size = FixedSize(BTreeMap::new());
    let mut p = Project::new("detached", &calibrated_model());
    assert!(p.analyze(&tools, &size).is_err());
}

#[test]
fn evaluate_roots_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let roots: Vec<PathBuf> = ["ok", "broken"]
        .iter()
        .map(|n| {
            let p = dir.path().join(n);
            fs::create_dir(&p).unwrap();
            p
        })
        .collect();
    let tools: Vec<Box<dyn ToolAdapter>> = vec![Box::new(
        FakeTool::new("lint")
            .with_output("ok", diagnostics(&[("xss", 1)]))
            .failing_on("broken"),
    )];
    let size = FixedSize(BTreeMap::new());

    let results = evaluate_roots(&roots, &calibrated_model(), &tools, &size);
    assert_eq!(results.len(), 2);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_err());
}
