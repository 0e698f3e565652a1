//! Snapshot of every node value computed for one project.

use serde::Serialize;

use crate::model::{Combinator, MeasureEvaluator, Normalizer, Polarity, Rescale, WeightMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub model: String,
    pub project: String,
    pub size: Option<f64>,
    pub tqi: WeightedResult,
    pub quality_aspects: Vec<WeightedResult>,
    pub product_factors: Vec<FactorResult>,
    pub measures: Vec<MeasureResult>,
}

/// Tqi or quality aspect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedResult {
    pub name: String,
    pub description: String,
    pub value: f64,
    pub weights: WeightMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorResult {
    pub name: String,
    pub description: String,
    pub value: f64,
    pub polarity: Polarity,
    pub combinator: Combinator,
    pub thresholds: [f64; 3],
    pub measures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureResult {
    pub name: String,
    pub description: String,
    pub value: f64,
    pub raw_value: f64,
    pub evaluator: MeasureEvaluator,
    pub normalizer: Normalizer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescale: Option<Rescale>,
    pub diagnostics: Vec<DiagnosticResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticResult {
    pub name: String,
    /// False when no tool reported this rule.
    pub matched: bool,
    pub findings: usize,
}

#[cfg(test)]
impl Evaluation {
    pub fn aspect(&self, name: &str) -> Option<&WeightedResult> {
        self.quality_aspects.iter().find(|a| a.name == name)
    }

    pub fn factor(&self, name: &str) -> Option<&FactorResult> {
        self.product_factors.iter().find(|f| f.name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&MeasureResult> {
        self.measures.iter().find(|m| m.name == name)
    }
}
