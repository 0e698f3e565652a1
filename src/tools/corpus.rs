use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::loc::walk;
use crate::error::{Error, Result};

/// Every directory below `root` that contains an entry named `marker`,
/// sorted. `root` itself is never a project even when it holds the marker.
/// `.git` directories are not searched, but a `.git` marker is still
/// detected next to them.
pub fn discover_projects(root: &Path, marker: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::config(format!(
            "corpus root {} is not a directory",
            root.display()
        )));
    }
    if marker.is_empty() {
        return Err(Error::config("project-root marker must not be empty"));
    }

    let mut roots = BTreeSet::new();
    for entry in walk(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        if entry.file_type().is_some_and(|ft| ft.is_dir()) && entry.path().join(marker).exists() {
            roots.insert(entry.into_path());
        }
    }
    Ok(roots.into_iter().collect())
}

#[cfg(test)]
#[path = "corpus_test.rs"]
mod tests;
