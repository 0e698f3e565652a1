//! Boundary with the static-analysis tools.
//!
//! A [`ToolAdapter`] turns a project root into named diagnostics; a
//! [`SizeMetric`] reports the project's size. Adapters for one project run
//! in parallel, and their results are folded together on the calling
//! thread afterwards.

pub mod command;
pub mod corpus;
pub mod loc;

use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::model::DiagnosticSet;
use crate::model::finding::extend_diagnostics;
pub use command::{CommandSize, CommandTool};
pub use corpus::discover_projects;
pub use loc::LinesOfCode;

pub trait ToolAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Run the tool on `root` and return its findings keyed by diagnostic name.
    fn analyze(&self, root: &Path) -> Result<DiagnosticSet>;
}

pub trait SizeMetric: Send + Sync {
    fn size(&self, root: &Path) -> Result<f64>;
}

/// Run every adapter on `root` and fold their output into one set.
/// The first failing adapter's error is returned.
pub fn run_tools(tools: &[Box<dyn ToolAdapter>], root: &Path) -> Result<DiagnosticSet> {
    let outputs: Vec<Result<DiagnosticSet>> = tools
        .par_iter()
        .map(|tool| {
            debug!(tool = tool.name(), root = %root.display(), "running tool");
            tool.analyze(root)
        })
        .collect();

    let mut merged = DiagnosticSet::new();
    for output in outputs {
        extend_diagnostics(&mut merged, output?);
    }
    Ok(merged)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
