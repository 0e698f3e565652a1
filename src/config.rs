//! `qindex.toml`: external tools, size metric and calibration settings.
//!
//! ```toml
//! [[tools]]
//! name = "lint"
//! command = "my-linter"
//! args = ["--json", "{root}"]
//! timeout_secs = 120
//!
//! [size]
//! kind = "loc"
//!
//! [benchmark]
//! marker = ".git"
//! strategy = { kind = "percentile", lower = 5.0, upper = 95.0 }
//! apply_to = "thresholds"
//!
//! [weights]
//! consistency_threshold = 0.1
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::{BoundStrategy, CONSISTENCY_THRESHOLD};
use crate::descriptor::BoundTarget;
use crate::error::{Error, Result};
use crate::tools::{CommandSize, CommandTool, LinesOfCode, SizeMetric, ToolAdapter};

pub const CONFIG_FILE: &str = "qindex.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tools: Vec<ToolConfig>,
    pub size: SizeConfig,
    pub benchmark: BenchmarkConfig,
    pub weights: WeightsConfig,
}

/// One external analyzer. `{root}` in `args` is replaced by the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeConfig {
    /// Built-in non-blank line counter.
    #[default]
    Loc,
    /// External command printing a single number.
    Command {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Entry whose presence marks a project root inside the corpus.
    pub marker: String,
    pub strategy: BoundStrategy,
    pub apply_to: BoundTarget,
    /// Corpus workers; 0 uses one per core.
    pub jobs: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            marker: ".git".to_string(),
            strategy: BoundStrategy::default(),
            apply_to: BoundTarget::default(),
            jobs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightsConfig {
    pub consistency_threshold: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: CONSISTENCY_THRESHOLD,
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::parse(path, e))?;
        config.validate().map_err(|e| e.in_file(path))?;
        Ok(config)
    }

    /// Load `explicit` (which must exist) or `qindex.toml` from the working
    /// directory, falling back to defaults when the latter is absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded configuration");
                Self::parse(&content, &path)
            }
            Err(e) if e.kind() == ErrorKind::NotFound && explicit.is_none() => {
                debug!("no {CONFIG_FILE} found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for t in &self.tools {
            if t.name.trim().is_empty() {
                return Err(Error::config("tool name must not be empty"));
            }
            if !names.insert(t.name.as_str()) {
                return Err(Error::config(format!("tool '{}' is configured twice", t.name)));
            }
            if t.command.trim().is_empty() {
                return Err(Error::config(format!("tool '{}' has no command", t.name)));
            }
            if t.timeout_secs == 0 {
                return Err(Error::config(format!("tool '{}' needs a positive timeout", t.name)));
            }
        }
        if let SizeConfig::Command {
            command,
            timeout_secs,
            ..
        } = &self.size
        {
            if command.trim().is_empty() {
                return Err(Error::config("size command must not be empty"));
            }
            if *timeout_secs == 0 {
                return Err(Error::config("size command needs a positive timeout"));
            }
        }
        if self.benchmark.marker.is_empty() {
            return Err(Error::config("benchmark marker must not be empty"));
        }
        self.benchmark.strategy.validate()?;
        let threshold = self.weights.consistency_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(Error::config(format!(
                "consistency_threshold must be positive, got {threshold}"
            )));
        }
        Ok(())
    }

    pub fn tool_adapters(&self) -> Vec<Box<dyn ToolAdapter>> {
        self.tools
            .iter()
            .map(|t| {
                Box::new(CommandTool::new(
                    t.name.clone(),
                    t.command.clone(),
                    t.args.clone(),
                    Duration::from_secs(t.timeout_secs),
                )) as Box<dyn ToolAdapter>
            })
            .collect()
    }

    pub fn size_metric(&self) -> Box<dyn SizeMetric> {
        match &self.size {
            SizeConfig::Loc => Box::new(LinesOfCode),
            SizeConfig::Command {
                command,
                args,
                timeout_secs,
            } => Box::new(CommandSize::new(
                command.clone(),
                args.clone(),
                Duration::from_secs(*timeout_secs),
            )),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
