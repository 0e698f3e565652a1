//! Weighted aggregation shared by quality aspects and the TQI root.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Child name to weight.
pub type WeightMap = BTreeMap<String, f64>;

/// Allowed deviation of a weight map's sum from 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-3;

/// Check that `weights` covers exactly `children` and sums to 1.
pub fn check_weights<'a>(
    node: &str,
    weights: &WeightMap,
    children: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let children: BTreeSet<&str> = children.into_iter().collect();
    let keys: BTreeSet<&str> = weights.keys().map(String::as_str).collect();

    let unweighted: Vec<&str> = children.difference(&keys).copied().collect();
    if !unweighted.is_empty() {
        return Err(Error::config(format!(
            "'{node}': children without a weight: {}",
            unweighted.join(", ")
        )));
    }
    let unknown: Vec<&str> = keys.difference(&children).copied().collect();
    if !unknown.is_empty() {
        return Err(Error::config(format!(
            "'{node}': weights for unknown children: {}",
            unknown.join(", ")
        )));
    }

    if let Some((child, w)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
        return Err(Error::config(format!(
            "'{node}': weight of '{child}' must be a non-negative number, got {w}"
        )));
    }

    let sum: f64 = weights.values().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(Error::config(format!(
            "'{node}': weights sum to {sum:.6}, expected 1 ± {WEIGHT_TOLERANCE}"
        )));
    }
    Ok(())
}

/// `Σ weight[child] * value(child)`, after checking the map against `children`.
pub fn weighted_sum<'a>(
    node: &str,
    weights: Option<&WeightMap>,
    children: impl IntoIterator<Item = &'a str>,
    mut value: impl FnMut(&str) -> Result<f64>,
) -> Result<f64> {
    let weights = weights.ok_or_else(|| Error::MissingCalibration {
        nodes: vec![node.to_string()],
    })?;
    check_weights(node, weights, children)?;
    let mut total = 0.0;
    for (child, w) in weights {
        total += w * value(child)?;
    }
    Ok(total)
}

#[cfg(test)]
#[path = "weights_test.rs"]
mod tests;
