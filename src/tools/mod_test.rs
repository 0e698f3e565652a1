use super::*;
use crate::testkit::{FakeTool, diagnostics};
use std::path::PathBuf;

#[test]
fn run_tools_merges_all_adapters() {
    let root = PathBuf::from("/corpus/app");
    let tools: Vec<Box<dyn ToolAdapter>> = vec![
        Box::new(FakeTool::new("a").with_output("app", diagnostics(&[("xss", 1), ("long-method", 2)]))),
        Box::new(FakeTool::new("b").with_output("app", diagnostics(&[("xss", 3), ("dup-block", 0)]))),
    ];
    let set = run_tools(&tools, &root).unwrap();
    assert_eq!(set["xss"].count(), 4);
    assert_eq!(set["long-method"].count(), 2);
    assert!(set["dup-block"].is_matched());
}

#[test]
fn run_tools_surfaces_failure() {
    let root = PathBuf::from("/corpus/app");
    let tools: Vec<Box<dyn ToolAdapter>> = vec![
        Box::new(FakeTool::new("ok")),
        Box::new(FakeTool::new("broken").failing_on("app")),
    ];
    let err = run_tools(&tools, &root).unwrap_err();
    assert!(err.to_string().contains("broken"), "got: {err}");
}

#[test]
fn run_tools_with_no_adapters_is_empty() {
    let set = run_tools(&[], Path::new("/corpus/app")).unwrap();
    assert!(set.is_empty());
}
