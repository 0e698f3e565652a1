//! Analytic Hierarchy Process: priority vectors from pairwise judgments.
//!
//! Given a positive reciprocal matrix `A` the priority vector is the
//! principal eigenvector `w` (`A·w = λ_max·w`, `Σw = 1`). It is found by
//! seeding with the row means of the column-normalized matrix and then
//! running power iteration until the vector stops moving.
//!
//! Consistency follows Saaty: `CI = (λ_max − n) / (n − 1)` and
//! `CR = CI / RI[n]`. A ratio above 0.1 usually means the judgments
//! contradict each other.

use crate::error::{Error, Result};

/// Saaty's random consistency index for n = 1..=15.
pub const RANDOM_INDEX: [f64; 15] = [
    0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.48, 1.56, 1.57, 1.59,
];

/// Default acceptable consistency ratio.
pub const CONSISTENCY_THRESHOLD: f64 = 0.1;

const CONVERGENCE_TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;
const DIAGONAL_TOLERANCE: f64 = 1e-9;
/// Judgments such as 0.333 for 1/3 are accepted as reciprocal.
const RECIPROCAL_TOLERANCE: f64 = 1e-2;

pub fn random_index(n: usize) -> f64 {
    match n {
        0 => 0.0,
        n if n <= RANDOM_INDEX.len() => RANDOM_INDEX[n - 1],
        _ => RANDOM_INDEX[RANDOM_INDEX.len() - 1],
    }
}

/// Square matrix of pairwise ratios among a parent node's children.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMatrix {
    node: String,
    children: Vec<String>,
    values: Vec<Vec<f64>>,
}

/// Derived weights plus consistency statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Priority {
    pub weights: Vec<f64>,
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub consistency_ratio: f64,
    pub iterations: usize,
}

impl ComparisonMatrix {
    /// Validate shape, positivity, unit diagonal and reciprocity.
    pub fn new(node: impl Into<String>, children: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self> {
        let node = node.into();
        let n = children.len();
        if n == 0 {
            return Err(Error::config(format!("'{node}': comparison matrix has no children")));
        }
        if values.len() != n {
            return Err(Error::config(format!(
                "'{node}': header lists {n} children but the matrix has {} rows",
                values.len()
            )));
        }
        if let Some((i, row)) = values.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(Error::config(format!(
                "'{node}': matrix is not square, row {} has {} entries, expected {n}",
                i + 1,
                row.len()
            )));
        }
        for i in 0..n {
            for j in 0..n {
                let v = values[i][j];
                if !v.is_finite() || v <= 0.0 {
                    return Err(Error::config(format!(
                        "'{node}': entry ({}, {}) must be a positive ratio, got {v}",
                        i + 1,
                        j + 1
                    )));
                }
            }
            if (values[i][i] - 1.0).abs() > DIAGONAL_TOLERANCE {
                return Err(Error::config(format!(
                    "'{node}': diagonal entry for '{}' must be 1, got {}",
                    children[i], values[i][i]
                )));
            }
            for j in (i + 1)..n {
                if (values[i][j] * values[j][i] - 1.0).abs() > RECIPROCAL_TOLERANCE {
                    return Err(Error::config(format!(
                        "'{node}': entries for '{}' vs '{}' are not reciprocal ({} and {})",
                        children[i], children[j], values[i][j], values[j][i]
                    )));
                }
            }
        }
        Ok(Self {
            node,
            children,
            values,
        })
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn size(&self) -> usize {
        self.children.len()
    }

    fn multiply(&self, w: &[f64]) -> Vec<f64> {
        self.values
            .iter()
            .map(|row| row.iter().zip(w).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// Row means of the column-normalized matrix.
    fn seed(&self) -> Vec<f64> {
        let n = self.size();
        let col_sums: Vec<f64> = (0..n)
            .map(|j| self.values.iter().map(|row| row[j]).sum())
            .collect();
        self.values
            .iter()
            .map(|row| row.iter().zip(&col_sums).map(|(v, s)| v / s).sum::<f64>() / n as f64)
            .collect()
    }

    pub fn priority_vector(&self) -> Result<Priority> {
        let n = self.size();
        let mut w = self.seed();
        let mut iterations = 0;
        while iterations < MAX_ITERATIONS {
            iterations += 1;
            let next = normalize(self.multiply(&w));
            let delta = next
                .iter()
                .zip(&w)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            w = next;
            if delta < CONVERGENCE_TOLERANCE {
                break;
            }
        }

        if let Some(bad) = w.iter().position(|x| !x.is_finite() || *x <= 0.0) {
            return Err(Error::config(format!(
                "'{}': degenerate judgments, eigenvector entry for '{}' is {}",
                self.node, self.children[bad], w[bad]
            )));
        }

        let aw = self.multiply(&w);
        let lambda_max = aw.iter().zip(&w).map(|(a, b)| a / b).sum::<f64>() / n as f64;
        let consistency_index = if n > 1 {
            ((lambda_max - n as f64) / (n - 1) as f64).max(0.0)
        } else {
            0.0
        };
        let ri = random_index(n);
        let consistency_ratio = if ri > 0.0 { consistency_index / ri } else { 0.0 };

        Ok(Priority {
            weights: w,
            lambda_max,
            consistency_index,
            consistency_ratio,
            iterations,
        })
    }
}

fn normalize(v: Vec<f64>) -> Vec<f64> {
    let sum: f64 = v.iter().sum();
    v.into_iter().map(|x| x / sum).collect()
}

#[cfg(test)]
#[path = "ahp_test.rs"]
mod tests;
