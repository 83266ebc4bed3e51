//! Error types for the Protochain domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Protochain operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Reservoir errors ---
    #[error("Reservoir error: {0}")]
    Reservoir(#[from] ReservoirError),

    // --- Working-memory store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Interactive input errors ---
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    // --- Protocol definition errors ---
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors loading a reservoir document.
///
/// Missing reservoirs are fail-soft at the access-binding level: the chain
/// runner logs a warning and omits the subsection rather than aborting the
/// step.
#[derive(Debug, Error)]
pub enum ReservoirError {
    #[error("Reservoir document not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read reservoir document {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// Errors from the working-memory store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write working memory {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Errors from the interactive input collaborator.
#[derive(Debug, Error)]
pub enum InputError {
    /// The user cancelled input collection. No user input means no chain
    /// can start, so this terminates the invocation.
    #[error("Input collection aborted: {0}")]
    Aborted(String),

    #[error("Editor failed: {0}")]
    EditorFailed(String),
}

/// Errors constructing a protocol definition.
///
/// Unlike reservoir access bindings, a protocol's own instruction file is
/// fail-hard: the definition cannot be constructed without it.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Instructions for protocol '{protocol}' not found: {path}")]
    InstructionsMissing { protocol: String, path: PathBuf },

    #[error("Failed to read instructions for protocol '{protocol}' from {path}: {reason}")]
    InstructionsUnreadable {
        protocol: String,
        path: PathBuf,
        reason: String,
    },
}
