//! Measures: reduce a set of diagnostics to one normalized scalar.
//!
//! A measure never caches its value. Every call to [`Measure::value`]
//! re-reads the current findings, runs the raw-value evaluator, then the
//! normalizer with the project context, then the calibrated rescale if any.

use serde::{Deserialize, Serialize};

use super::finding::Diagnostic;
use crate::error::{Error, Result};

/// Project context passed to normalizers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalContext {
    /// Size metric of the project (e.g. lines of code), when known.
    pub size: Option<f64>,
}

impl EvalContext {
    #[cfg(test)]
    pub fn with_size(size: f64) -> Self {
        Self { size: Some(size) }
    }
}

/// Raw-value function over a measure's diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasureEvaluator {
    /// Total number of findings across all diagnostics.
    #[default]
    FindingCount,
    /// Sum of finding severities.
    SeveritySum,
    /// Highest single severity, 0 when there are no findings.
    MaxSeverity,
}

impl MeasureEvaluator {
    pub fn raw_value(&self, diagnostics: &[Diagnostic]) -> f64 {
        let findings = diagnostics.iter().flat_map(|d| d.findings());
        match self {
            Self::FindingCount => diagnostics.iter().map(|d| d.count()).sum::<usize>() as f64,
            Self::SeveritySum => findings.map(|f| f.severity).sum(),
            Self::MaxSeverity => findings.map(|f| f.severity).fold(0.0, f64::max),
        }
    }
}

/// Maps a raw value plus project context onto the normalized scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalizer {
    #[default]
    Identity,
    /// `raw / size * scale`, e.g. findings per thousand lines with `scale = 1000`.
    PerSize {
        #[serde(default = "default_scale")]
        scale: f64,
    },
    /// Fixed-scale linear rescale into [0, 1], clamped.
    MinMax { min: f64, max: f64 },
}

fn default_scale() -> f64 {
    1.0
}

impl Normalizer {
    pub fn normalize(&self, node: &str, raw: f64, ctx: &EvalContext) -> Result<f64> {
        match *self {
            Self::Identity => Ok(raw),
            Self::PerSize { scale } => {
                if raw == 0.0 {
                    return Ok(0.0);
                }
                match ctx.size {
                    Some(size) if size > 0.0 => Ok(raw / size * scale),
                    Some(size) => Err(Error::evaluation(
                        node,
                        format!("size normalizer needs a positive size metric, got {size}"),
                    )),
                    None => Err(Error::evaluation(
                        node,
                        "size normalizer needs a size metric but none was set",
                    )),
                }
            }
            Self::MinMax { min, max } => Ok(min_max(raw, min, max)),
        }
    }
}

fn min_max(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= 0.0 {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Linear rescale of a normalized value into [0, 1], clamped. `min` and
/// `max` are in the units the measure's normalizer produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rescale {
    pub min: f64,
    pub max: f64,
}

impl Rescale {
    pub fn apply(&self, value: f64) -> f64 {
        min_max(value, self.min, self.max)
    }

    /// `self` was measured on the output of `inner`; express it on the
    /// input of `inner` so the two collapse into one rescale.
    pub fn after(self, inner: Rescale) -> Rescale {
        let span = (inner.max - inner.min).max(0.0);
        Rescale {
            min: inner.min + self.min.clamp(0.0, 1.0) * span,
            max: inner.min + self.max.clamp(0.0, 1.0) * span,
        }
    }
}

/// Leaf-level tree node aggregating diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub name: String,
    pub description: String,
    pub evaluator: MeasureEvaluator,
    pub normalizer: Normalizer,
    pub rescale: Option<Rescale>,
    diagnostics: Vec<Diagnostic>,
}

impl Measure {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            evaluator: MeasureEvaluator::default(),
            normalizer: Normalizer::default(),
            rescale: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_evaluator(mut self, evaluator: MeasureEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Attach a diagnostic by name. Re-adding an existing name is a no-op.
    pub fn with_diagnostic(mut self, name: impl Into<String>) -> Self {
        self.add_diagnostic(name);
        self
    }

    pub fn add_diagnostic(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.diagnostics.iter().any(|d| d.name() == name) {
            self.diagnostics.push(Diagnostic::unmatched(name));
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> impl Iterator<Item = &mut Diagnostic> {
        self.diagnostics.iter_mut()
    }

    pub fn raw_value(&self) -> f64 {
        self.evaluator.raw_value(&self.diagnostics)
    }

    pub fn value(&self, ctx: &EvalContext) -> Result<f64> {
        let normalized = self.normalizer.normalize(&self.name, self.raw_value(), ctx)?;
        Ok(self.rescale.map_or(normalized, |r| r.apply(normalized)))
    }

    /// Install a rescale measured on this measure's current values.
    pub fn calibrate(&mut self, observed: Rescale) {
        self.rescale = Some(match self.rescale {
            Some(current) => observed.after(current),
            None => observed,
        });
    }

    #[cfg(test)]
    pub fn finding_count(&self) -> usize {
        self.diagnostics.iter().map(|d| d.count()).sum()
    }
}

#[cfg(test)]
#[path = "measure_test.rs"]
mod tests;
