//! Error taxonomy shared by evaluation and calibration.
//!
//! Configuration problems and missing calibration constants are fatal.
//! Tool failures are reported per project and per tool so that callers
//! running a corpus can skip one project without aborting the rest.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Structural or calibration-input problem; never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Nodes that need weights or thresholds before evaluation.
    #[error("missing calibration constants on: {}", nodes.join(", "))]
    MissingCalibration { nodes: Vec<String> },

    #[error("evaluation error in '{node}': {message}")]
    Evaluation { node: String, message: String },

    #[error("tool '{tool}' failed on {}: {message}", project.display())]
    Tool {
        tool: String,
        project: PathBuf,
        message: String,
    },

    #[error("tool '{tool}' timed out after {secs}s on {}", project.display())]
    Timeout {
        tool: String,
        project: PathBuf,
        secs: u64,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn evaluation(node: &str, message: impl Into<String>) -> Self {
        Self::Evaluation {
            node: node.to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Prefix a configuration error with the file it came from.
    pub fn in_file(self, path: &std::path::Path) -> Self {
        match self {
            Self::Config(message) => Self::Config(format!("{}: {message}", path.display())),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
