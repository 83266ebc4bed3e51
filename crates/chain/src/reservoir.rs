//! Reservoir store — named static reference documents supplying guidance
//! content to protocol steps.
//!
//! Loading is idempotent: the same unmodified source yields identical
//! trimmed text. Missing documents are `NotFound`; the chain runner
//! catches this per access binding and omits the subsection rather than
//! aborting the step.

use protochain_core::error::ReservoirError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves reservoir filenames against a single directory.
#[derive(Debug, Clone)]
pub struct ReservoirStore {
    dir: PathBuf,
}

impl ReservoirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a reservoir document by filename, trimmed of leading and
    /// trailing whitespace.
    pub fn load(&self, filename: &str) -> Result<String, ReservoirError> {
        let path = self.dir.join(filename);
        if !path.exists() {
            return Err(ReservoirError::NotFound { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ReservoirError::Io {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!(file = %path.display(), "Loaded reservoir document");
        Ok(content.trim().to_string())
    }

    /// List available reservoir documents (sorted for deterministic
    /// output). Used for diagnostics.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter_map(|e| e.file_name().into_string().ok())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}
