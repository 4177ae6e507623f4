//! # Notebook
//!
//! The notebook is the lead researcher's evidence store for one run: an
//! ordered, duplicate-free list of relevant excerpts. Its insertion order is
//! the order the excerpts are handed to the report writer.
//!
//! Accepted excerpts are also mirrored to a plain-text audit file, one per
//! line. The file is never read back; the in-memory notebook is authoritative.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

// =============================================================================
// DURABLE LOG
// =============================================================================
/// Append-only text file mirroring accepted notebook entries.
#[derive(Debug)]
pub struct NotebookLog {
    path: PathBuf,
    file: File,
}

impl NotebookLog {
    /// Create (or truncate) the log file, creating parent directories as needed.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        debug!(path = %path.display(), "Notebook log truncated");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and flush it to disk.
    pub fn append(&mut self, entry: &str) -> io::Result<()> {
        writeln!(self.file, "{}", entry)?;
        self.file.flush()
    }
}

// =============================================================================
// NOTEBOOK
// =============================================================================
#[derive(Debug, Default)]
pub struct Notebook {
    entries: Vec<String>,
    seen: HashSet<String>,
    log: Option<NotebookLog>,
}

impl Notebook {
    /// An in-memory notebook with no audit file.
    pub fn new() -> Self {
        Self::default()
    }

    /// A notebook that mirrors every accepted entry to `log`.
    pub fn with_log(log: NotebookLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    /// Add an excerpt unless an identical one is already present.
    ///
    /// Returns `true` if the excerpt was new. A failed write to the audit
    /// file is logged and otherwise ignored.
    pub fn insert(&mut self, excerpt: impl Into<String>) -> bool {
        let excerpt = excerpt.into();
        if self.seen.contains(&excerpt) {
            return false;
        }

        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.append(&excerpt) {
                warn!(path = %log.path().display(), error = %e, "Failed to mirror notebook entry");
            }
        }

        self.seen.insert(excerpt.clone());
        self.entries.push(excerpt);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
