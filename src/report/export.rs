use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::project::Evaluation;

pub const EXPORT_SUFFIX: &str = "_evalResults.json";

/// Results file layout: the evaluation snapshot plus when it was written.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub exported_at: DateTime<Utc>,
    #[serde(flatten)]
    pub evaluation: &'a Evaluation,
}

pub fn export_path(dir: &Path, project: &str) -> PathBuf {
    dir.join(format!("{project}{EXPORT_SUFFIX}"))
}

/// Write `<project>_evalResults.json` into `dir`, creating it if needed.
pub fn export_evaluation(ev: &Evaluation, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let path = export_path(dir, &ev.project);
    let doc = ExportDocument {
        exported_at: Utc::now(),
        evaluation: ev,
    };
    let body = serde_json::to_string_pretty(&doc)?;
    fs::write(&path, body).map_err(|e| Error::io(&path, e))?;
    info!(path = %path.display(), "exported evaluation");
    Ok(path)
}
