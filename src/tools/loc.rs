//! Built-in size metric: non-blank lines across the project's text files.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use ignore::WalkBuilder;
use tracing::warn;

use super::SizeMetric;
use crate::error::{Error, Result};

/// Check whether a reader points to a binary file by looking for null bytes
/// in the first 512 bytes. Resets the reader position to the start afterward.
pub fn is_binary_reader<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; 512];
    let n = reader.read(&mut header)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(header[..n].contains(&0))
}

/// Build a directory walker that respects `.gitignore` and skips `.git`.
pub fn walk(path: &Path) -> ignore::Walk {
    WalkBuilder::new(path)
        .hidden(false)
        .follow_links(false)
        .filter_entry(|entry| {
            !(entry.file_type().is_some_and(|ft| ft.is_dir()) && entry.file_name() == ".git")
        })
        .build()
}

/// Count non-blank lines in one file; `None` for binary files.
fn count_file(path: &Path) -> io::Result<Option<usize>> {
    let mut file = File::open(path)?;
    if is_binary_reader(&mut file)? {
        return Ok(None);
    }
    let mut count = 0;
    for line in BufReader::new(file).split(b'\n') {
        if line?.iter().any(|b| !b.is_ascii_whitespace()) {
            count += 1;
        }
    }
    Ok(Some(count))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinesOfCode;

impl SizeMetric for LinesOfCode {
    fn size(&self, root: &Path) -> Result<f64> {
        if !root.is_dir() {
            return Err(Error::io(
                root,
                io::Error::new(io::ErrorKind::NotFound, "project root is not a directory"),
            ));
        }
        let mut total = 0usize;
        for entry in walk(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("{e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            match count_file(entry.path()) {
                Ok(Some(n)) => total += n,
                Ok(None) => {}
                Err(e) => warn!(file = %entry.path().display(), "{e}"),
            }
        }
        Ok(total as f64)
    }
}

#[cfg(test)]
#[path = "loc_test.rs"]
mod tests;
