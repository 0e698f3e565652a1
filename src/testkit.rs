//! Shared fixtures for unit tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::{
    Diagnostic, DiagnosticSet, Finding, Measure, Polarity, ProductFactor, QualityAspect,
    QualityModel, Thresholds, Tqi, WeightMap,
};
use crate::tools::{SizeMetric, ToolAdapter};

pub fn weights(entries: &[(&str, f64)]) -> WeightMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Two aspects, three factors, three measures, no calibration constants.
pub fn uncalibrated_model() -> QualityModel {
    QualityModel::builder("Demo", Tqi::new("TQI", "Total quality"))
        .description("fixture model")
        .measure(
            Measure::new("Injection Findings", "injection-prone calls")
                .with_diagnostic("sql-injection")
                .with_diagnostic("xss"),
        )
        .measure(Measure::new("Long Methods", "").with_diagnostic("long-method"))
        .measure(Measure::new("Duplicated Blocks", "").with_diagnostic("dup-block"))
        .factor(
            ProductFactor::new("Injection", "", Polarity::HigherIsWorse)
                .with_measure("Injection Findings"),
        )
        .factor(ProductFactor::new("Complexity", "", Polarity::HigherIsWorse).with_measure("Long Methods"))
        .factor(
            ProductFactor::new("Duplication", "", Polarity::HigherIsWorse)
                .with_measure("Duplicated Blocks"),
        )
        .aspect(QualityAspect::new("Security", "").with_factor("Injection"))
        .aspect(
            QualityAspect::new("Maintainability", "")
                .with_factor("Complexity")
                .with_factor("Duplication"),
        )
        .build()
        .expect("fixture model is valid")
}

/// The fixture model with weights and thresholds `[0, 5, 10]` everywhere.
pub fn calibrated_model() -> QualityModel {
    let mut qm = uncalibrated_model();
    qm.set_weights("TQI", weights(&[("Security", 0.6), ("Maintainability", 0.4)]))
        .expect("tqi weights");
    qm.set_weights("Security", weights(&[("Injection", 1.0)]))
        .expect("security weights");
    qm.set_weights(
        "Maintainability",
        weights(&[("Complexity", 0.5), ("Duplication", 0.5)]),
    )
    .expect("maintainability weights");
    for f in ["Injection", "Complexity", "Duplication"] {
        qm.set_thresholds(f, Thresholds::new(0.0, 5.0, 10.0).expect("thresholds"))
            .expect("set thresholds");
    }
    qm
}

pub fn diagnostics(entries: &[(&str, usize)]) -> DiagnosticSet {
    entries
        .iter()
        .map(|(name, n)| {
            let findings = (0..*n)
                .map(|i| Finding::new(format!("{name}-{i}"), 1.0, format!("src/lib.rs:{i}")))
                .collect();
            (name.to_string(), Diagnostic::with_findings(*name, findings))
        })
        .collect()
}

/// Tool returning canned diagnostics per project directory name.
pub struct FakeTool {
    pub name: String,
    pub outputs: BTreeMap<String, DiagnosticSet>,
    /// Project names on which the tool fails.
    pub failing: Vec<String>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outputs: BTreeMap::new(),
            failing: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_output(mut self, project: &str, set: DiagnosticSet) -> Self {
        self.outputs.insert(project.to_string(), set);
        self
    }

    pub fn failing_on(mut self, project: &str) -> Self {
        self.failing.push(project.to_string());
        self
    }
}

fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ToolAdapter for FakeTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, root: &Path) -> Result<DiagnosticSet> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(root.to_path_buf());
        }
        let project = project_name(root);
        if self.failing.contains(&project) {
            return Err(Error::Tool {
                tool: self.name.clone(),
                project: root.to_path_buf(),
                message: "simulated crash".into(),
            });
        }
        Ok(self.outputs.get(&project).cloned().unwrap_or_default())
    }
}

/// Size metric answering from a fixed table, defaulting to 1000.
pub struct FixedSize(pub BTreeMap<String, f64>);

impl SizeMetric for FixedSize {
    fn size(&self, root: &Path) -> Result<f64> {
        Ok(self.0.get(&project_name(root)).copied().unwrap_or(1000.0))
    }
}
