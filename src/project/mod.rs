//! One evaluation session: a private copy of the model plus the findings
//! and size of a single project.
//!
//! A project never shares diagnostic state with the prototype it was
//! created from, so several projects can be evaluated from one model.

mod evaluation;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

pub use evaluation::{DiagnosticResult, Evaluation, FactorResult, MeasureResult, WeightedResult};

use crate::error::{Error, Result};
use crate::model::{DiagnosticSet, EvalContext, MergeSummary, QualityModel};
use crate::tools::{SizeMetric, ToolAdapter, run_tools};

#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    root: Option<PathBuf>,
    size: Option<f64>,
    model: QualityModel,
}

impl Project {
    /// A project with no findings, backed by a copy of `prototype`.
    pub fn new(name: impl Into<String>, prototype: &QualityModel) -> Self {
        Self {
            name: name.into(),
            root: None,
            size: None,
            model: prototype.fresh_copy(),
        }
    }

    /// A project named after the last component of `root`, which must exist.
    pub fn from_root(root: &Path, prototype: &QualityModel) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::config(format!(
                "project root {} is not a directory",
                root.display()
            )));
        }
        let name = root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| root.display().to_string());
        let mut project = Self::new(name, prototype);
        project.root = Some(root.to_path_buf());
        Ok(project)
    }

    #[cfg(test)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    #[cfg(test)]
    pub fn size(&self) -> Option<f64> {
        self.size
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = Some(size);
    }

    pub fn model(&self) -> &QualityModel {
        &self.model
    }

    pub fn context(&self) -> EvalContext {
        EvalContext { size: self.size }
    }

    /// Fail when weights or thresholds are missing anywhere in the tree.
    pub fn validate(&self) -> Result<()> {
        self.model.check_calibrated()
    }

    /// Fold tool output into this project's copy of the model.
    pub fn apply_findings(&mut self, incoming: &DiagnosticSet) -> MergeSummary {
        let summary = self.model.merge_diagnostics(incoming);
        if !summary.dropped.is_empty() {
            debug!(
                project = %self.name,
                dropped = summary.dropped.len(),
                "diagnostics not referenced by the model"
            );
        }
        summary
    }

    /// Run every tool and the size metric against the project root.
    pub fn analyze(
        &mut self,
        tools: &[Box<dyn ToolAdapter>],
        size: &dyn SizeMetric,
    ) -> Result<MergeSummary> {
        let root = self
            .root
            .clone()
            .ok_or_else(|| Error::config(format!("project '{}' has no root directory", self.name)))?;
        let found = run_tools(tools, &root)?;
        let summary = self.apply_findings(&found);
        let loc = size.size(&root)?;
        self.set_size(loc);
        info!(
            project = %self.name,
            matched = summary.matched.len(),
            size = loc,
            "analysis finished"
        );
        Ok(summary)
    }

    pub fn measure_value(&self, measure: &str) -> Result<f64> {
        self.model.measure_value(measure, &self.context())
    }

    #[cfg(test)]
    pub fn tqi_value(&self) -> Result<f64> {
        self.model.tqi_value(&self.context())
    }

    /// Evaluate every node, leaves first, after checking calibration.
    pub fn evaluate(&self) -> Result<Evaluation> {
        self.validate()?;
        let ctx = self.context();
        let qm = &self.model;

        let measures = qm
            .measures()
            .map(|m| {
                Ok(MeasureResult {
                    name: m.name.clone(),
                    description: m.description.clone(),
                    value: m.value(&ctx)?,
                    raw_value: m.raw_value(),
                    evaluator: m.evaluator,
                    normalizer: m.normalizer,
                    rescale: m.rescale,
                    diagnostics: m
                        .diagnostics()
                        .iter()
                        .map(|d| DiagnosticResult {
                            name: d.name().to_string(),
                            matched: d.is_matched(),
                            findings: d.count(),
                        })
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let product_factors = qm
            .factors()
            .map(|f| {
                Ok(FactorResult {
                    name: f.name.clone(),
                    description: f.description.clone(),
                    value: qm.factor_value(&f.name, &ctx)?,
                    polarity: f.polarity,
                    combinator: f.combinator,
                    thresholds: f.thresholds.map(|t| t.as_array()).unwrap_or_default(),
                    measures: f.measures().map(str::to_string).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let quality_aspects = qm
            .aspects()
            .map(|a| {
                Ok(WeightedResult {
                    name: a.name.clone(),
                    description: a.description.clone(),
                    value: qm.aspect_value(&a.name, &ctx)?,
                    weights: a.weights.clone().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tqi = qm.tqi();
        let tqi = WeightedResult {
            name: tqi.name.clone(),
            description: tqi.description.clone(),
            value: qm.tqi_value(&ctx)?,
            weights: tqi.weights.clone().unwrap_or_default(),
        };

        Ok(Evaluation {
            model: qm.name.clone(),
            project: self.name.clone(),
            size: self.size,
            tqi,
            quality_aspects,
            product_factors,
            measures,
        })
    }
}

/// Analyze and evaluate each root independently. A failure in one project
/// is logged and reported without affecting the others.
pub fn evaluate_roots(
    roots: &[PathBuf],
    prototype: &QualityModel,
    tools: &[Box<dyn ToolAdapter>],
    size: &dyn SizeMetric,
) -> Vec<(PathBuf, Result<Evaluation>)> {
    roots
        .iter()
        .map(|root| {
            let outcome = Project::from_root(root, prototype).and_then(|mut p| {
                p.analyze(tools, size)?;
                p.evaluate()
            });
            if let Err(e) = &outcome {
                warn!(project = %root.display(), "evaluation failed: {e}");
            }
            (root.clone(), outcome)
        })
        .collect()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
