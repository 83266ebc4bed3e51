//! Configuration loading, validation, and management for Protochain.
//!
//! Loads configuration from `protochain.toml` in the working directory
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "protochain.toml";

/// The working-memory sentinel accepted as an access-binding source.
pub const WORKING_MEMORY_SOURCE: &str = "working-memory";

/// The root configuration structure.
///
/// Maps directly to `protochain.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Filesystem layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// The protocol chain, in execution order
    #[serde(default = "default_protocols")]
    pub protocols: Vec<ProtocolConfig>,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    8096
}
fn default_true() -> bool {
    true
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("paths", &self.paths)
            .field("protocols", &self.protocols)
            .finish()
    }
}

/// Filesystem layout for instruction documents, reservoirs, and the
/// working-memory file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding protocol instruction documents
    #[serde(default = "default_patterns_dir")]
    pub patterns_dir: PathBuf,

    /// Directory holding reservoir reference documents
    #[serde(default = "default_reservoir_dir")]
    pub reservoir_dir: PathBuf,

    /// The flat working-memory file
    #[serde(default = "default_working_memory_file")]
    pub working_memory_file: PathBuf,
}

fn default_patterns_dir() -> PathBuf {
    PathBuf::from("patterns")
}
fn default_reservoir_dir() -> PathBuf {
    PathBuf::from("reservoir")
}
fn default_working_memory_file() -> PathBuf {
    PathBuf::from("instance.md")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            patterns_dir: default_patterns_dir(),
            reservoir_dir: default_reservoir_dir(),
            working_memory_file: default_working_memory_file(),
        }
    }
}

/// Configuration for one protocol step in the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Unique protocol name (e.g., "Extract")
    pub name: String,

    /// Instruction document, relative to the patterns directory
    pub instructions_file: String,

    /// Whether this protocol executes; when false it is skipped
    /// deterministically and records an empty result
    #[serde(default = "default_true")]
    pub included: bool,

    /// Whether to collect free-text commentary before building the prompt
    #[serde(default)]
    pub requires_commentary: bool,

    /// Ordered access bindings: what context this protocol pulls in
    #[serde(default)]
    pub accesses: Vec<AccessConfig>,
}

/// One (label, source) access binding. `source` is either a reservoir
/// filename or the working-memory sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    pub label: String,
    pub source: String,
}

impl AccessConfig {
    fn new(label: &str, source: &str) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }
}

/// The canonical four-step chain.
pub fn default_protocols() -> Vec<ProtocolConfig> {
    vec![
        ProtocolConfig {
            name: "Extract".into(),
            instructions_file: "Extract.md".into(),
            included: true,
            requires_commentary: false,
            accesses: vec![AccessConfig::new("Intuition Reservoir", "Intuition_Reservoir.md")],
        },
        ProtocolConfig {
            name: "Atomize".into(),
            instructions_file: "Atomize.md".into(),
            included: true,
            requires_commentary: false,
            accesses: vec![AccessConfig::new("Intuition Reservoir", "Intuition_Reservoir.md")],
        },
        ProtocolConfig {
            name: "Reflect".into(),
            instructions_file: "Reflect.md".into(),
            included: true,
            requires_commentary: false,
            accesses: vec![
                AccessConfig::new("Newly Atomized Abstractions", WORKING_MEMORY_SOURCE),
                AccessConfig::new("Abstraction Theory", "Abstraction_Theory.md"),
                AccessConfig::new("Intuition Reservoir", "Intuition_Reservoir.md"),
            ],
        },
        ProtocolConfig {
            name: "Integrate".into(),
            instructions_file: "Integrate.md".into(),
            included: true,
            requires_commentary: false,
            accesses: vec![
                AccessConfig::new("Reflect Protocol Output", WORKING_MEMORY_SOURCE),
                AccessConfig::new("New Abstractions", WORKING_MEMORY_SOURCE),
                AccessConfig::new("Abstraction Theory", "Abstraction_Theory.md"),
                AccessConfig::new("Intuition Reservoir", "Intuition_Reservoir.md"),
            ],
        },
    ]
}

impl AppConfig {
    /// Load configuration from `protochain.toml` in the current directory.
    ///
    /// Also checks environment variables:
    /// - `PROTOCHAIN_API_KEY` (highest priority)
    /// - `ANTHROPIC_API_KEY`
    /// - `PROTOCHAIN_MODEL` overrides the default model
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("PROTOCHAIN_API_KEY")
                .ok()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("PROTOCHAIN_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        let mut seen = HashSet::new();
        for protocol in &self.protocols {
            if protocol.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "protocol name must not be empty".into(),
                ));
            }
            if !seen.insert(protocol.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate protocol name '{}'",
                    protocol.name
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            paths: PathsConfig::default(),
            protocols: default_protocols(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for protochain_core::Error {
    fn from(err: ConfigError) -> Self {
        protochain_core::Error::Config {
            message: err.to_string(),
        }
    }
}
