//! Interactive input collaborator trait.
//!
//! Supplies the raw user input a chain runs against and, for protocols
//! that ask for it, free-text commentary collected just before prompt
//! assembly. Implementations may block on user interaction (an editor, a
//! prompt); the contract is only "returns a string, eventually".

use crate::error::InputError;
use async_trait::async_trait;

/// Source of raw user input and per-protocol commentary.
#[async_trait]
pub trait InputCollaborator: Send + Sync {
    /// Obtain the raw user input text for a chain run.
    ///
    /// Cancellation is a hard failure (`InputError::Aborted`) — without
    /// input there is no chain to run.
    async fn user_input(&self) -> std::result::Result<String, InputError>;

    /// Obtain free-text commentary for the named protocol.
    ///
    /// Cancellation yields empty commentary rather than an error; the step
    /// proceeds without it.
    async fn commentary(&self, protocol_name: &str) -> std::result::Result<String, InputError>;
}

/// A fixed-text collaborator for non-interactive runs.
pub struct StaticInput {
    input: String,
    commentary: String,
}

impl StaticInput {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            commentary: String::new(),
        }
    }

    pub fn with_commentary(mut self, commentary: impl Into<String>) -> Self {
        self.commentary = commentary.into();
        self
    }
}

#[async_trait]
impl InputCollaborator for StaticInput {
    async fn user_input(&self) -> std::result::Result<String, InputError> {
        Ok(self.input.clone())
    }

    async fn commentary(&self, _protocol_name: &str) -> std::result::Result<String, InputError> {
        Ok(self.commentary.clone())
    }
}
