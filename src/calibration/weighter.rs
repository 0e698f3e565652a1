//! Derive node weights from a directory of comparison-matrix files.
//!
//! One file per weighted node. The header row names the node followed by
//! its children in column order; the body is the ratio matrix, optionally
//! with a leading row label:
//!
//! ```text
//! TQI,Security,Maintainability,Reliability
//! Security,1,3,5
//! Maintainability,1/3,1,2
//! Reliability,1/5,1/2,1
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::ahp::ComparisonMatrix;
use crate::error::{Error, Result};
use crate::model::{QualityModel, WeightMap};

/// Weights derived for one parent node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightResult {
    pub node: String,
    pub weights: WeightMap,
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub consistency_ratio: f64,
    /// Set when the consistency ratio exceeds the accepted threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl WeightResult {
    pub fn is_consistent(&self) -> bool {
        self.warning.is_none()
    }
}

/// Parse a comparison-matrix file body. `source` is only used in messages.
pub fn parse_matrix(content: &str, source: &Path) -> Result<ComparisonMatrix> {
    let mut rows = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(split_fields);

    let header = rows
        .next()
        .ok_or_else(|| Error::parse(source, "empty comparison matrix file"))?;
    let Some((node, children)) = header.split_first() else {
        return Err(Error::parse(source, "missing header row"));
    };
    if node.is_empty() {
        return Err(Error::parse(source, "header row must start with the node name"));
    }
    let children: Vec<String> = children.to_vec();
    let n = children.len();

    let mut values = Vec::with_capacity(n);
    for (i, fields) in rows.enumerate() {
        let ratios = if fields.len() == n + 1 {
            let label = &fields[0];
            if children.get(i) != Some(label) {
                return Err(Error::parse(
                    source,
                    format!(
                        "row {} is labelled '{label}' but the header expects '{}'",
                        i + 1,
                        children.get(i).map(String::as_str).unwrap_or("<none>")
                    ),
                ));
            }
            &fields[1..]
        } else {
            &fields[..]
        };
        let row = ratios
            .iter()
            .map(|f| parse_ratio(f).ok_or_else(|| Error::parse(source, format!("'{f}' is not a ratio"))))
            .collect::<Result<Vec<f64>>>()?;
        values.push(row);
    }

    ComparisonMatrix::new(node.clone(), children, values).map_err(|e| e.in_file(source))
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|f| f.trim().trim_matches('"').trim().to_string())
        .collect()
}

/// Decimal (`0.5`) or fraction (`1/3`).
fn parse_ratio(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => s.parse().ok(),
    }
}

/// Matrix files in `dir`, sorted, hidden files skipped.
fn matrix_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::config(format!(
            "comparison-matrix directory {} does not exist",
            dir.display()
        )));
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.'))
        })
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(Error::config(format!(
            "comparison-matrix directory {} is empty",
            dir.display()
        )));
    }
    Ok(files)
}

/// Weights for one matrix, checked against the model's declared structure.
pub fn weigh_matrix(
    matrix: &ComparisonMatrix,
    qm: &QualityModel,
    consistency_threshold: f64,
) -> Result<WeightResult> {
    let node = matrix.node();
    let expected: Vec<&str> = if node == qm.tqi().name {
        qm.aspects().map(|a| a.name.as_str()).collect()
    } else if let Some(aspect) = qm.aspect(node) {
        aspect.factors().collect()
    } else {
        return Err(Error::config(format!(
            "comparison matrix for '{node}' does not match any weighted node in model '{}'",
            qm.name
        )));
    };
    let mut declared: Vec<&str> = matrix.children().iter().map(String::as_str).collect();
    declared.sort_unstable();
    let mut expected = expected;
    expected.sort_unstable();
    if declared != expected {
        return Err(Error::config(format!(
            "comparison matrix for '{node}' compares [{}] but the model declares [{}]",
            declared.join(", "),
            expected.join(", ")
        )));
    }

    let priority = matrix.priority_vector()?;
    debug!(node = %node, iterations = priority.iterations, "priority vector converged");
    let warning = (priority.consistency_ratio > consistency_threshold).then(|| {
        format!(
            "consistency ratio {:.3} exceeds {consistency_threshold}; judgments for '{node}' may be contradictory",
            priority.consistency_ratio
        )
    });
    if let Some(w) = &warning {
        warn!(node = %node, "{w}");
    }

    Ok(WeightResult {
        node: node.to_string(),
        weights: matrix
            .children()
            .iter()
            .cloned()
            .zip(priority.weights)
            .collect(),
        lambda_max: priority.lambda_max,
        consistency_index: priority.consistency_index,
        consistency_ratio: priority.consistency_ratio,
        warning,
    })
}

/// Read every matrix in `dir` and derive one [`WeightResult`] per file.
pub fn elicit_weights(
    dir: &Path,
    qm: &QualityModel,
    consistency_threshold: f64,
) -> Result<Vec<WeightResult>> {
    let mut results: Vec<WeightResult> = Vec::new();
    for path in matrix_files(dir)? {
        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let matrix = parse_matrix(&content, &path)?;
        if results.iter().any(|r| r.node == matrix.node()) {
            return Err(Error::config(format!(
                "{}: second comparison matrix for '{}'",
                path.display(),
                matrix.node()
            )));
        }
        let result = weigh_matrix(&matrix, qm, consistency_threshold)
            .map_err(|e| e.in_file(&path))?;
        info!(node = %result.node, cr = result.consistency_ratio, "derived weights");
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
#[path = "weighter_test.rs"]
mod tests;
