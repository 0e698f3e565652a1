//! External-process tool adapters.
//!
//! The process is started with `{root}` in its arguments replaced by the
//! project root and must print a JSON document on stdout:
//!
//! ```json
//! {"diagnostics": [{"name": "long-method", "findings": [{"id": "f1", "severity": 2, "location": "src/a.rs:10"}]}]}
//! ```
//!
//! Each invocation is bounded by its own timeout; a process that overruns
//! is killed and reported without affecting other invocations.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use super::{SizeMetric, ToolAdapter};
use crate::error::{Error, Result};
use crate::model::finding::extend_diagnostics;
use crate::model::{Diagnostic, DiagnosticSet, Finding};

#[derive(Debug, Deserialize)]
struct ToolOutput {
    diagnostics: Vec<DiagnosticOutput>,
}

#[derive(Debug, Deserialize)]
struct DiagnosticOutput {
    name: String,
    #[serde(default)]
    findings: Vec<Finding>,
}

/// Parse the stdout document of a diagnostic-producing tool.
pub fn parse_tool_output(stdout: &str) -> std::result::Result<DiagnosticSet, serde_json::Error> {
    let output: ToolOutput = serde_json::from_str(stdout)?;
    let mut set = DiagnosticSet::new();
    for d in output.diagnostics {
        let incoming = DiagnosticSet::from([(
            d.name.clone(),
            Diagnostic::with_findings(d.name, d.findings),
        )]);
        extend_diagnostics(&mut set, incoming);
    }
    Ok(set)
}

#[derive(Debug, Clone)]
struct Invocation {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Invocation {
    fn run(&self, root: &Path) -> Result<String> {
        let root_str = root.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{root}", &root_str))
            .collect();

        let tool_error = |message: String| Error::Tool {
            tool: self.name.clone(),
            project: root.to_path_buf(),
            message,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| tool_error(format!("cannot start process runtime: {e}")))?;
        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .current_dir(root)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Dropping the `output` future on timeout kills the child.
        let output = runtime
            .block_on(async { tokio::time::timeout(self.timeout, cmd.output()).await })
            .map_err(|_| Error::Timeout {
                tool: self.name.clone(),
                project: root.to_path_buf(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| tool_error(format!("cannot start '{}': {e}", self.program)))?;

        let status = output.status;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| tool_error(format!("stdout is not UTF-8: {e}")))?;

        if !status.success() {
            return Err(tool_error(format!(
                "exited with {status}: {}",
                stderr.trim()
            )));
        }
        Ok(stdout)
    }
}

/// Runs an external analyzer and parses its diagnostics from stdout.
#[derive(Debug, Clone)]
pub struct CommandTool {
    invocation: Invocation,
}

impl CommandTool {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            invocation: Invocation {
                name: name.into(),
                program: program.into(),
                args,
                timeout,
            },
        }
    }
}

impl ToolAdapter for CommandTool {
    fn name(&self) -> &str {
        &self.invocation.name
    }

    fn analyze(&self, root: &Path) -> Result<DiagnosticSet> {
        let stdout = self.invocation.run(root)?;
        parse_tool_output(&stdout).map_err(|e| Error::Tool {
            tool: self.invocation.name.clone(),
            project: root.to_path_buf(),
            message: format!("invalid diagnostics output: {e}"),
        })
    }
}

/// Runs an external command that prints the project size as a number.
#[derive(Debug, Clone)]
pub struct CommandSize {
    invocation: Invocation,
}

impl CommandSize {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            invocation: Invocation {
                name: "size".into(),
                program: program.into(),
                args,
                timeout,
            },
        }
    }
}

impl SizeMetric for CommandSize {
    fn size(&self, root: &Path) -> Result<f64> {
        let stdout = self.invocation.run(root)?;
        stdout.trim().parse::<f64>().map_err(|e| Error::Tool {
            tool: self.invocation.name.clone(),
            project: root.to_path_buf(),
            message: format!("size output '{}' is not a number: {e}", stdout.trim()),
        })
    }
}

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;
