//! Working memory — the single accumulating text log shared across all
//! steps of one chain run.
//!
//! Backed by a flat UTF-8 file. Append-only in practice: the only reset
//! happens at chain start. Invariants:
//!
//! - The buffer always starts with a fixed header
//! - Sections are delimited (`---` rule + `### Title` line) and ordered by
//!   append time
//! - No section is ever edited or removed once appended
//!
//! Every mutation rewrites the file wholesale; there are no partial
//! writes. Single-threaded, single-chain design — the log is owned by one
//! runner for the duration of a chain and is not safe for concurrent
//! chains without external locking, which is not provided.

use protochain_core::error::StoreError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The fixed header every buffer starts with.
pub const MEMORY_HEADER: &str = "# Working Memory\n";

/// Label introducing the raw user input section written on reset.
pub const USER_INPUT_LABEL: &str = "[User Input]:";

/// A file-backed working-memory log.
#[derive(Debug, Clone)]
pub struct WorkingMemoryLog {
    path: PathBuf,
}

impl WorkingMemoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the entire buffer with the fixed header plus the raw user
    /// input.
    pub fn reset(&self, user_input: &str) -> Result<(), StoreError> {
        let content = format!("{MEMORY_HEADER}\n{USER_INPUT_LABEL}\n{user_input}\n");
        self.write(&content)
    }

    /// Append a uniformly delimited section to the end of the buffer.
    /// Never reorders or deletes.
    pub fn append(&self, section_title: &str, body: &str) -> Result<(), StoreError> {
        let current = self.read();
        let section = format!("\n\n---\n### {section_title}\n\n{body}\n");
        self.write(&format!("{current}{section}"))?;
        debug!(section = %section_title, "Appended working-memory section");
        Ok(())
    }

    /// The full current buffer, or empty if never initialized.
    pub fn read(&self) -> String {
        std::fs::read_to_string(&self.path).unwrap_or_default()
    }

    /// Parse the raw user input back out of the buffer, if present.
    ///
    /// The input section runs from `[User Input]:` to the first `---` rule
    /// (or the end of the buffer).
    pub fn user_input(&self) -> Option<String> {
        let content = self.read();
        let start = content.find(USER_INPUT_LABEL)? + USER_INPUT_LABEL.len();
        let rest = &content[start..];
        let end = rest.find("\n---").unwrap_or(rest.len());
        let input = rest[..end].trim();
        if input.is_empty() {
            None
        } else {
            Some(input.to_string())
        }
    }

    /// Titles of all appended sections, in append order.
    pub fn section_titles(&self) -> Vec<String> {
        self.read()
            .lines()
            .filter_map(|line| line.strip_prefix("### "))
            .map(|title| title.trim().to_string())
            .collect()
    }

    fn write(&self, content: &str) -> Result<(), StoreError> {
        std::fs::write(&self.path, content).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}
