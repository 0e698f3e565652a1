//! The quality-model tree.
//!
//! Nodes live in flat name-indexed tables, one per level, and refer to
//! their children by name:
//!
//! ```text
//! Tqi ──weights──▶ QualityAspect ──weights──▶ ProductFactor ──thresholds──▶ Measure ──▶ Diagnostic
//! ```
//!
//! The Tqi's children are all quality aspects of the model. Every value
//! accessor recomputes from the current diagnostics; nothing is cached.
//! A model owns all of its data, so `clone()` is a full deep copy and two
//! clones never observe each other's findings.

pub mod factor;
pub mod finding;
pub mod measure;
pub mod weights;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{Error, Result};
pub use factor::{Combinator, Polarity, ProductFactor, Thresholds};
pub use finding::{Diagnostic, DiagnosticSet, Finding};
pub use measure::{EvalContext, Measure, MeasureEvaluator, Normalizer, Rescale};
pub use weights::{WeightMap, check_weights, weighted_sum};

/// Weighted aggregation of product factors.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityAspect {
    pub name: String,
    pub description: String,
    pub weights: Option<WeightMap>,
    factors: BTreeSet<String>,
}

impl QualityAspect {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            weights: None,
            factors: BTreeSet::new(),
        }
    }

    pub fn with_factor(mut self, name: impl Into<String>) -> Self {
        self.factors.insert(name.into());
        self
    }

    #[cfg(test)]
    pub fn with_weights(mut self, weights: WeightMap) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn factors(&self) -> impl Iterator<Item = &str> {
        self.factors.iter().map(String::as_str)
    }
}

/// Root node; its children are every quality aspect of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Tqi {
    pub name: String,
    pub description: String,
    pub weights: Option<WeightMap>,
}

impl Tqi {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            weights: None,
        }
    }

    #[cfg(test)]
    pub fn with_weights(mut self, weights: WeightMap) -> Self {
        self.weights = Some(weights);
        self
    }
}

/// Outcome of folding tool output into a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Incoming diagnostic names that matched at least one model diagnostic.
    pub matched: BTreeSet<String>,
    /// Incoming diagnostic names the model does not reference.
    pub dropped: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct QualityModel {
    pub name: String,
    pub description: String,
    tqi: Tqi,
    aspects: BTreeMap<String, QualityAspect>,
    factors: BTreeMap<String, ProductFactor>,
    measures: BTreeMap<String, Measure>,
}

impl QualityModel {
    pub fn builder(name: impl Into<String>, tqi: Tqi) -> QualityModelBuilder {
        QualityModelBuilder {
            name: name.into(),
            description: String::new(),
            tqi,
            aspects: Vec::new(),
            factors: Vec::new(),
            measures: Vec::new(),
        }
    }

    pub fn tqi(&self) -> &Tqi {
        &self.tqi
    }

    pub fn aspects(&self) -> impl Iterator<Item = &QualityAspect> {
        self.aspects.values()
    }

    pub fn factors(&self) -> impl Iterator<Item = &ProductFactor> {
        self.factors.values()
    }

    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.measures.values()
    }

    pub fn aspect(&self, name: &str) -> Option<&QualityAspect> {
        self.aspects.get(name)
    }

    pub fn factor(&self, name: &str) -> Option<&ProductFactor> {
        self.factors.get(name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.get(name)
    }

    /// A copy with the same structure and constants but no findings.
    pub fn fresh_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.reset_findings();
        copy
    }

    pub fn reset_findings(&mut self) {
        for m in self.measures.values_mut() {
            for d in m.diagnostics_mut() {
                d.reset();
            }
        }
    }

    /// Every diagnostic name referenced by some measure.
    pub fn diagnostic_names(&self) -> BTreeSet<&str> {
        self.measures
            .values()
            .flat_map(|m| m.diagnostics().iter().map(Diagnostic::name))
            .collect()
    }

    /// Replace the findings of every model diagnostic whose name appears in
    /// `incoming`. Unknown incoming names are dropped.
    pub fn merge_diagnostics(&mut self, incoming: &DiagnosticSet) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for (name, diagnostic) in incoming {
            let mut hit = false;
            for measure in self.measures.values_mut() {
                for d in measure.diagnostics_mut() {
                    if d.name() == name {
                        d.replace_findings(diagnostic);
                        hit = true;
                    }
                }
            }
            if hit {
                summary.matched.insert(name.clone());
            } else {
                debug!(diagnostic = %name, "dropping diagnostic not referenced by the model");
                summary.dropped.insert(name.clone());
            }
        }
        summary
    }

    pub fn measure_value(&self, name: &str, ctx: &EvalContext) -> Result<f64> {
        self.measures
            .get(name)
            .ok_or_else(|| Error::evaluation(name, "unknown measure"))?
            .value(ctx)
    }

    pub fn factor_value(&self, name: &str, ctx: &EvalContext) -> Result<f64> {
        let factor = self
            .factors
            .get(name)
            .ok_or_else(|| Error::evaluation(name, "unknown product factor"))?;
        let values = factor
            .measures()
            .map(|m| self.measure_value(m, ctx))
            .collect::<Result<Vec<_>>>()?;
        factor.utility(&values)
    }

    pub fn aspect_value(&self, name: &str, ctx: &EvalContext) -> Result<f64> {
        let aspect = self
            .aspects
            .get(name)
            .ok_or_else(|| Error::evaluation(name, "unknown quality aspect"))?;
        weighted_sum(
            &aspect.name,
            aspect.weights.as_ref(),
            aspect.factors(),
            |child| self.factor_value(child, ctx),
        )
    }

    pub fn tqi_value(&self, ctx: &EvalContext) -> Result<f64> {
        weighted_sum(
            &self.tqi.name,
            self.tqi.weights.as_ref(),
            self.aspects.keys().map(String::as_str),
            |child| self.aspect_value(child, ctx),
        )
    }

    /// Names of nodes that still lack weights or thresholds.
    pub fn missing_calibration(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.tqi.weights.is_none() {
            missing.push(self.tqi.name.clone());
        }
        missing.extend(
            self.aspects
                .values()
                .filter(|a| a.weights.is_none())
                .map(|a| a.name.clone()),
        );
        missing.extend(
            self.factors
                .values()
                .filter(|f| f.thresholds.is_none())
                .map(|f| f.name.clone()),
        );
        missing
    }

    /// Fail with every uncalibrated node listed.
    pub fn check_calibrated(&self) -> Result<()> {
        let nodes = self.missing_calibration();
        if nodes.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingCalibration { nodes })
        }
    }

    /// Set the weights of the Tqi or of a quality aspect, validated against its children.
    pub fn set_weights(&mut self, node: &str, weights: WeightMap) -> Result<()> {
        if node == self.tqi.name {
            check_weights(node, &weights, self.aspects.keys().map(String::as_str))?;
            self.tqi.weights = Some(weights);
            return Ok(());
        }
        let aspect = self.aspects.get_mut(node).ok_or_else(|| {
            Error::config(format!("'{node}' is neither the TQI nor a quality aspect"))
        })?;
        check_weights(node, &weights, aspect.factors())?;
        aspect.weights = Some(weights);
        Ok(())
    }

    pub fn set_thresholds(&mut self, factor: &str, thresholds: Thresholds) -> Result<()> {
        let pf = self
            .factors
            .get_mut(factor)
            .ok_or_else(|| Error::config(format!("unknown product factor '{factor}'")))?;
        pf.thresholds = Some(thresholds);
        Ok(())
    }

    pub fn measure_mut(&mut self, measure: &str) -> Result<&mut Measure> {
        self.measures
            .get_mut(measure)
            .ok_or_else(|| Error::config(format!("unknown measure '{measure}'")))
    }
}

/// Collects nodes and checks the structure in [`QualityModelBuilder::build`].
#[derive(Debug)]
pub struct QualityModelBuilder {
    name: String,
    description: String,
    tqi: Tqi,
    aspects: Vec<QualityAspect>,
    factors: Vec<ProductFactor>,
    measures: Vec<Measure>,
}

impl QualityModelBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn aspect(mut self, aspect: QualityAspect) -> Self {
        self.aspects.push(aspect);
        self
    }

    pub fn factor(mut self, factor: ProductFactor) -> Self {
        self.factors.push(factor);
        self
    }

    pub fn measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn build(self) -> Result<QualityModel> {
        let measures = unique_by_name("measure", self.measures, |m| &m.name, |_, _| false)?;
        let factors = unique_by_name("product factor", self.factors, |f| &f.name, |a, b| a == b)?;
        let aspects = unique_by_name("quality aspect", self.aspects, |a| &a.name, |_, _| false)?;

        if aspects.is_empty() {
            return Err(Error::config("quality model has no quality aspects"));
        }
        for f in factors.values() {
            if f.representative_measure().is_none() {
                return Err(Error::config(format!(
                    "product factor '{}' has no measures",
                    f.name
                )));
            }
            for m in f.measures() {
                if !measures.contains_key(m) {
                    return Err(Error::config(format!(
                        "product factor '{}' references unknown measure '{m}'",
                        f.name
                    )));
                }
            }
        }
        for a in aspects.values() {
            if a.factors.is_empty() {
                return Err(Error::config(format!(
                    "quality aspect '{}' has no product factors",
                    a.name
                )));
            }
            for f in a.factors() {
                if !factors.contains_key(f) {
                    return Err(Error::config(format!(
                        "quality aspect '{}' references unknown product factor '{f}'",
                        a.name
                    )));
                }
            }
            if let Some(w) = &a.weights {
                check_weights(&a.name, w, a.factors())?;
            }
        }
        if let Some(w) = &self.tqi.weights {
            check_weights(&self.tqi.name, w, aspects.keys().map(String::as_str))?;
        }

        Ok(QualityModel {
            name: self.name,
            description: self.description,
            tqi: self.tqi,
            aspects,
            factors,
            measures,
        })
    }
}

/// Index nodes by name. A repeated name is collapsed when `same` says the two
/// declarations are the same node, otherwise it is a configuration error.
fn unique_by_name<T>(
    level: &str,
    nodes: Vec<T>,
    name: impl Fn(&T) -> &String,
    same: impl Fn(&T, &T) -> bool,
) -> Result<BTreeMap<String, T>> {
    let mut out: BTreeMap<String, T> = BTreeMap::new();
    for node in nodes {
        let key = name(&node).clone();
        match out.get(&key) {
            Some(existing) if same(existing, &node) => {
                debug!(%level, name = %key, "collapsing repeated declaration");
            }
            Some(_) => {
                return Err(Error::config(format!("duplicate {level} name '{key}'")));
            }
            None => {
                out.insert(key, node);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
