//! Corpus benchmarking: derive per-measure bounds from the normalized
//! values observed across many reference projects.
//!
//! Each project is analyzed against its own copy of the model, so projects
//! run in parallel and only the final value lists are combined.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::QualityModel;
use crate::project::Project;
use crate::tools::{SizeMetric, ToolAdapter, discover_projects};

/// Lower and upper normalized value accepted for one measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

/// How the observed values of one measure become a [`Bound`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundStrategy {
    /// Literal minimum and maximum, no outlier trimming.
    #[default]
    Naive,
    /// Linear-interpolated percentiles, both in `0..=100`.
    Percentile { lower: f64, upper: f64 },
    /// `mean ± k·σ`, clipped to the observed range.
    #[serde(rename = "zscore")]
    ZScore { k: f64 },
}

impl BoundStrategy {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Naive => Ok(()),
            Self::Percentile { lower, upper } => {
                if (0.0..=100.0).contains(&lower) && (0.0..=100.0).contains(&upper) && lower <= upper {
                    Ok(())
                } else {
                    Err(Error::config(format!(
                        "percentile bounds must satisfy 0 <= lower <= upper <= 100, got {lower} and {upper}"
                    )))
                }
            }
            Self::ZScore { k } => {
                if k.is_finite() && k > 0.0 {
                    Ok(())
                } else {
                    Err(Error::config(format!("zscore k must be positive, got {k}")))
                }
            }
        }
    }

    /// `None` when there are no values.
    pub fn bound(&self, values: &[f64]) -> Option<Bound> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let (low, high) = match *self {
            Self::Naive => (min, max),
            Self::Percentile { lower, upper } => {
                (percentile(&sorted, lower), percentile(&sorted, upper))
            }
            Self::ZScore { k } => {
                let n = sorted.len() as f64;
                let mean = sorted.iter().sum::<f64>() / n;
                let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let sd = var.sqrt();
                ((mean - k * sd).max(min), (mean + k * sd).min(max))
            }
        };
        Some(Bound { low, high })
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

impl fmt::Display for BoundStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive => write!(f, "naive"),
            Self::Percentile { lower, upper } => write!(f, "percentile:{lower}:{upper}"),
            Self::ZScore { k } => write!(f, "zscore:{k}"),
        }
    }
}

/// `naive`, `percentile[:LOWER:UPPER]` (default 5:95) or `zscore[:K]` (default 2).
impl FromStr for BoundStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let kind = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let params = parts
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|_| Error::config(format!("invalid strategy parameter '{p}' in '{s}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        let strategy = match (kind.as_str(), params.as_slice()) {
            ("naive", []) => Self::Naive,
            ("percentile", []) => Self::Percentile { lower: 5.0, upper: 95.0 },
            ("percentile", [lower, upper]) => Self::Percentile { lower: *lower, upper: *upper },
            ("zscore", []) => Self::ZScore { k: 2.0 },
            ("zscore", [k]) => Self::ZScore { k: *k },
            _ => {
                return Err(Error::config(format!(
                    "unknown bound strategy '{s}' (expected naive, percentile[:L:U] or zscore[:K])"
                )));
            }
        };
        strategy.validate()?;
        Ok(strategy)
    }
}

/// A project or a single measure of a project that did not contribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectFailure {
    pub project: PathBuf,
    /// `None` when the whole project was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkOutcome {
    pub strategy: BoundStrategy,
    pub projects_analyzed: usize,
    pub bounds: BTreeMap<String, Bound>,
    /// Every normalized value observed, in project order.
    pub samples: BTreeMap<String, Vec<f64>>,
    pub failures: Vec<ProjectFailure>,
}

/// What one project contributed: its measure values or why it was skipped.
struct ProjectRun {
    root: PathBuf,
    values: Vec<(String, f64)>,
    failures: Vec<ProjectFailure>,
    skipped: bool,
}

pub struct Benchmarker<'a> {
    tools: &'a [Box<dyn ToolAdapter>],
    size: &'a dyn SizeMetric,
    strategy: BoundStrategy,
    jobs: usize,
}

impl<'a> Benchmarker<'a> {
    pub fn new(tools: &'a [Box<dyn ToolAdapter>], size: &'a dyn SizeMetric) -> Self {
        Self {
            tools,
            size,
            strategy: BoundStrategy::default(),
            jobs: 0,
        }
    }

    pub fn with_strategy(mut self, strategy: BoundStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Worker count for the corpus loop; 0 keeps rayon's default.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Discover projects under `corpus` by `marker` and benchmark them.
    pub fn derive_bounds(
        &self,
        corpus: &Path,
        marker: &str,
        prototype: &QualityModel,
    ) -> Result<BenchmarkOutcome> {
        let roots = discover_projects(corpus, marker)?;
        if roots.is_empty() {
            return Err(Error::config(format!(
                "no projects with marker '{marker}' found under {}",
                corpus.display()
            )));
        }
        info!(projects = roots.len(), corpus = %corpus.display(), "benchmarking corpus");
        self.derive_from_roots(&roots, prototype)
    }

    pub fn derive_from_roots(
        &self,
        roots: &[PathBuf],
        prototype: &QualityModel,
    ) -> Result<BenchmarkOutcome> {
        self.strategy.validate()?;
        let runs: Vec<ProjectRun> = if self.jobs == 0 {
            roots.par_iter().map(|r| self.run_project(r, prototype)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| Error::config(format!("cannot start {} workers: {e}", self.jobs)))?;
            pool.install(|| roots.par_iter().map(|r| self.run_project(r, prototype)).collect())
        };

        let mut outcome = BenchmarkOutcome {
            strategy: self.strategy,
            ..BenchmarkOutcome::default()
        };
        for m in prototype.measures() {
            outcome.samples.insert(m.name.clone(), Vec::new());
        }
        for run in runs {
            if !run.skipped {
                outcome.projects_analyzed += 1;
            }
            for (measure, value) in run.values {
                outcome.samples.entry(measure).or_default().push(value);
            }
            outcome.failures.extend(run.failures);
        }

        for (measure, values) in &outcome.samples {
            match self.strategy.bound(values) {
                Some(b) => {
                    outcome.bounds.insert(measure.clone(), b);
                }
                None => warn!(measure = %measure, "no benchmark values observed; no bound derived"),
            }
        }
        info!(
            analyzed = outcome.projects_analyzed,
            failed = outcome.failures.len(),
            "benchmark finished"
        );
        Ok(outcome)
    }

    fn run_project(&self, root: &Path, prototype: &QualityModel) -> ProjectRun {
        let mut run = ProjectRun {
            root: root.to_path_buf(),
            values: Vec::new(),
            failures: Vec::new(),
            skipped: false,
        };

        let analyzed = Project::from_root(root, prototype).and_then(|mut p| {
            p.analyze(self.tools, self.size)?;
            Ok(p)
        });
        let project = match analyzed {
            Ok(p) => p,
            Err(e) => {
                warn!(project = %root.display(), "skipping project: {e}");
                run.skipped = true;
                run.failures.push(ProjectFailure {
                    project: run.root.clone(),
                    measure: None,
                    message: e.to_string(),
                });
                return run;
            }
        };

        for m in project.model().measures() {
            match project.measure_value(&m.name) {
                Ok(v) if v.is_finite() => run.values.push((m.name.clone(), v)),
                Ok(v) => exclude(&mut run, &m.name, format!("non-finite value {v}")),
                Err(e) => exclude(&mut run, &m.name, e.to_string()),
            }
        }
        run
    }
}

fn exclude(run: &mut ProjectRun, measure: &str, message: String) {
    warn!(project = %run.root.display(), measure = %measure, "excluding value: {message}");
    run.failures.push(ProjectFailure {
        project: run.root.clone(),
        measure: Some(measure.to_string()),
        message,
    });
}

#[cfg(test)]
#[path = "benchmark_test.rs"]
mod tests;
