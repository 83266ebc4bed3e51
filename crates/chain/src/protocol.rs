//! Protocol definitions — one immutable descriptor per chain step.
//!
//! A protocol carries its instruction text (loaded from the patterns
//! directory at construction time — a missing instruction file is a hard
//! failure, unlike reservoir access bindings which fail soft per binding),
//! an ordered list of access bindings, and its execution flags.

use protochain_config::{ProtocolConfig, WORKING_MEMORY_SOURCE};
use protochain_core::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Where an access binding pulls its content from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessSource {
    /// The shared working-memory log, read at resolution time
    WorkingMemory,
    /// A named reservoir document
    Reservoir(String),
}

impl AccessSource {
    /// Parse a source identifier: the working-memory sentinel
    /// (case-insensitive) or a reservoir filename.
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.eq_ignore_ascii_case(WORKING_MEMORY_SOURCE) {
            AccessSource::WorkingMemory
        } else {
            AccessSource::Reservoir(trimmed.to_string())
        }
    }
}

impl std::fmt::Display for AccessSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessSource::WorkingMemory => write!(f, "{WORKING_MEMORY_SOURCE}"),
            AccessSource::Reservoir(name) => write!(f, "{name}"),
        }
    }
}

/// A (label, source) pair declaring what context a protocol pulls in.
/// Declaration order is preserved and significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessBinding {
    pub label: String,
    pub source: AccessSource,
}

/// An immutable descriptor for one chain step.
///
/// Constructed once at startup and reused across runs. Fields are private;
/// nothing mutates a definition after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolDefinition {
    name: String,
    instructions: String,
    accesses: Vec<AccessBinding>,
    included: bool,
    requires_commentary: bool,
}

impl ProtocolDefinition {
    /// Create a definition from already-loaded instruction text.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        accesses: Vec<AccessBinding>,
        included: bool,
        requires_commentary: bool,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            accesses,
            included,
            requires_commentary,
        }
    }

    /// Build a definition from configuration, reading the instruction
    /// document from the patterns directory.
    ///
    /// A missing or unreadable instruction file is a construction-time
    /// failure for the protocol itself.
    pub fn from_config(
        config: &ProtocolConfig,
        patterns_dir: &Path,
    ) -> Result<Self, ProtocolError> {
        let path = patterns_dir.join(&config.instructions_file);
        if !path.exists() {
            return Err(ProtocolError::InstructionsMissing {
                protocol: config.name.clone(),
                path,
            });
        }

        let instructions = std::fs::read_to_string(&path)
            .map_err(|e| ProtocolError::InstructionsUnreadable {
                protocol: config.name.clone(),
                path: path.clone(),
                reason: e.to_string(),
            })?
            .trim()
            .to_string();

        debug!(protocol = %config.name, file = %path.display(), "Loaded protocol instructions");

        let accesses = config
            .accesses
            .iter()
            .map(|a| AccessBinding {
                label: a.label.clone(),
                source: AccessSource::parse(&a.source),
            })
            .collect();

        Ok(Self {
            name: config.name.clone(),
            instructions,
            accesses,
            included: config.included,
            requires_commentary: config.requires_commentary,
        })
    }

    /// Build the full chain from configuration, in declared order.
    pub fn load_all(
        configs: &[ProtocolConfig],
        patterns_dir: &Path,
    ) -> Result<Vec<Self>, ProtocolError> {
        configs
            .iter()
            .map(|c| Self::from_config(c, patterns_dir))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn accesses(&self) -> &[AccessBinding] {
        &self.accesses
    }

    pub fn included(&self) -> bool {
        self.included
    }

    pub fn requires_commentary(&self) -> bool {
        self.requires_commentary
    }
}
