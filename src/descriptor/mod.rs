//! Quality-model descriptor files.
//!
//! A descriptor is the serialized form of a [`QualityModel`] prototype:
//! tree structure, strategies, and (once calibrated) weights and thresholds.
//! JSON and TOML are both accepted, picked by file extension. Findings are
//! never part of a descriptor.

mod merge;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    Combinator, Measure, MeasureEvaluator, Normalizer, Polarity, ProductFactor, QualityAspect,
    QualityModel, Rescale, Thresholds, Tqi, WeightMap,
};
pub use merge::{BoundTarget, apply_bounds, apply_weights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tqi: TqiDescriptor,
    pub quality_aspects: Vec<AspectDescriptor>,
    pub product_factors: Vec<FactorDescriptor>,
    pub measures: Vec<MeasureDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TqiDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightMap>,
    pub product_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub polarity: Polarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    #[serde(default)]
    pub combinator: Combinator,
    pub measures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub evaluator: MeasureEvaluator,
    #[serde(default)]
    pub normalizer: Normalizer,
    /// Benchmark-derived rescale applied after the normalizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescale: Option<Rescale>,
    pub diagnostics: Vec<String>,
}

impl ModelDescriptor {
    pub fn from_model(qm: &QualityModel) -> Self {
        let tqi = qm.tqi();
        Self {
            name: qm.name.clone(),
            description: qm.description.clone(),
            tqi: TqiDescriptor {
                name: tqi.name.clone(),
                description: tqi.description.clone(),
                weights: tqi.weights.clone(),
            },
            quality_aspects: qm
                .aspects()
                .map(|a| AspectDescriptor {
                    name: a.name.clone(),
                    description: a.description.clone(),
                    weights: a.weights.clone(),
                    product_factors: a.factors().map(str::to_string).collect(),
                })
                .collect(),
            product_factors: qm
                .factors()
                .map(|f| FactorDescriptor {
                    name: f.name.clone(),
                    description: f.description.clone(),
                    polarity: f.polarity,
                    thresholds: f.thresholds,
                    combinator: f.combinator,
                    measures: f.measures().map(str::to_string).collect(),
                })
                .collect(),
            measures: qm
                .measures()
                .map(|m| MeasureDescriptor {
                    name: m.name.clone(),
                    description: m.description.clone(),
                    evaluator: m.evaluator,
                    normalizer: m.normalizer,
                    rescale: m.rescale,
                    diagnostics: m.diagnostics().iter().map(|d| d.name().to_string()).collect(),
                })
                .collect(),
        }
    }

    pub fn into_model(self) -> Result<QualityModel> {
        let mut tqi = Tqi::new(self.tqi.name, self.tqi.description);
        tqi.weights = self.tqi.weights;

        let mut builder = QualityModel::builder(self.name, tqi).description(self.description);
        for m in self.measures {
            let mut measure = Measure::new(m.name, m.description)
                .with_evaluator(m.evaluator)
                .with_normalizer(m.normalizer);
            measure.rescale = m.rescale;
            for d in m.diagnostics {
                measure.add_diagnostic(d);
            }
            builder = builder.measure(measure);
        }
        for f in self.product_factors {
            let mut factor =
                ProductFactor::new(f.name, f.description, f.polarity).with_combinator(f.combinator);
            factor.thresholds = f.thresholds;
            for m in f.measures {
                factor = factor.with_measure(m);
            }
            builder = builder.factor(factor);
        }
        for a in self.quality_aspects {
            let mut aspect = QualityAspect::new(a.name, a.description);
            aspect.weights = a.weights;
            for f in a.product_factors {
                aspect = aspect.with_factor(f);
            }
            builder = builder.aspect(aspect);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(Error::config(format!(
            "{}: descriptor must be a .json or .toml file",
            path.display()
        ))),
    }
}

pub fn parse(content: &str, path: &Path) -> Result<ModelDescriptor> {
    match format_of(path)? {
        Format::Json => serde_json::from_str(content).map_err(|e| Error::parse(path, e)),
        Format::Toml => toml::from_str(content).map_err(|e| Error::parse(path, e)),
    }
}

pub fn render(descriptor: &ModelDescriptor, path: &Path) -> Result<String> {
    match format_of(path)? {
        Format::Json => Ok(serde_json::to_string_pretty(descriptor)?),
        Format::Toml => toml::to_string_pretty(descriptor).map_err(|e| {
            Error::config(format!("{}: cannot encode descriptor: {e}", path.display()))
        }),
    }
}

/// Read a descriptor file and build the model prototype it describes.
pub fn load(path: &Path) -> Result<QualityModel> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse(&content, path)?.into_model()
}

/// Write `qm` as a descriptor, creating parent directories as needed.
pub fn save(qm: &QualityModel, path: &Path) -> Result<()> {
    let content = render(&ModelDescriptor::from_model(qm), path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
