//! Folding calibration output back into a model prototype.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calibration::{Bound, WeightResult};
use crate::error::{Error, Result};
use crate::model::{QualityModel, Rescale, Thresholds};

/// Where benchmark bounds end up in the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BoundTarget {
    /// `[low, (low + high) / 2, high]` on each product factor.
    #[default]
    Thresholds,
    /// Rescale on each measure, after its normalizer; factors compare the
    /// rescaled values against `[0, 0.5, 1]`.
    Normalizer,
}

/// Install AHP weights. Unknown nodes, child-set mismatches and bad sums are fatal.
pub fn apply_weights(qm: &mut QualityModel, results: &[WeightResult]) -> Result<()> {
    for r in results {
        qm.set_weights(&r.node, r.weights.clone())?;
        info!(node = %r.node, "applied weights");
    }
    Ok(())
}

/// Install benchmark bounds keyed by measure name.
pub fn apply_bounds(
    qm: &mut QualityModel,
    bounds: &BTreeMap<String, Bound>,
    target: BoundTarget,
) -> Result<()> {
    if let Some(unknown) = bounds.keys().find(|m| qm.measure(m).is_none()) {
        return Err(Error::config(format!(
            "benchmark bound for unknown measure '{unknown}'"
        )));
    }

    match target {
        BoundTarget::Normalizer => {
            for (measure, b) in bounds {
                qm.measure_mut(measure)?.calibrate(Rescale {
                    min: b.low,
                    max: b.high,
                });
            }
            let mut rescaled = Vec::new();
            for factor in qm.factors() {
                let (bounded, unbounded): (Vec<&str>, Vec<&str>) =
                    factor.measures().partition(|m| bounds.contains_key(*m));
                if bounded.is_empty() {
                    warn!(factor = %factor.name, "no benchmark bounds for any measure; thresholds unchanged");
                    continue;
                }
                if !unbounded.is_empty() {
                    warn!(
                        factor = %factor.name,
                        measures = %unbounded.join(", "),
                        "measures without benchmark bounds are compared unscaled"
                    );
                }
                rescaled.push(factor.name.clone());
            }
            let unit = Thresholds::new(0.0, 0.5, 1.0)?;
            for factor in rescaled {
                qm.set_thresholds(&factor, unit)?;
            }
        }
        BoundTarget::Thresholds => {
            let mut updates = Vec::new();
            for factor in qm.factors() {
                let spans: Vec<&Bound> = factor.measures().filter_map(|m| bounds.get(m)).collect();
                if spans.is_empty() {
                    warn!(factor = %factor.name, "no benchmark bounds for any measure; thresholds unchanged");
                    continue;
                }
                let low = spans.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
                let high = spans.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
                updates.push((factor.name.clone(), Thresholds::from_bounds(low, high)?));
            }
            for (factor, thresholds) in updates {
                qm.set_thresholds(&factor, thresholds)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
