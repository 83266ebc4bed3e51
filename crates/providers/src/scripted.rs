//! Scripted provider — a deterministic offline completion backend.
//!
//! Pops queued responses in order; once exhausted it echoes a digest of
//! the prompt it received. Every request is recorded, which lets tests
//! assert on the exact prompts the chain runner assembled. Also backs
//! `protochain run --offline`.

use async_trait::async_trait;
use protochain_core::error::ProviderError;
use protochain_core::provider::{CompletionRequest, CompletionResponse, Provider, Usage};
use std::collections::VecDeque;
use std::sync::Mutex;

const ECHO_DIGEST_CHARS: usize = 160;

/// An offline provider with scripted responses.
pub struct ScriptedProvider {
    name: String,
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Create a provider that always echoes a prompt digest.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create a provider that returns the given responses in order, then
    /// falls back to echoing.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            name: "scripted".into(),
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// How many requests this provider has served.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The recorded requests, in arrival order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn echo(prompt: &str) -> String {
        let digest: String = prompt.chars().take(ECHO_DIGEST_CHARS).collect();
        format!("[offline] received {} chars: {}…", prompt.chars().count(), digest)
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Self::echo(&request.prompt));

        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (text.len() / 4) as u32;

        self.requests.lock().unwrap().push(request);

        Ok(CompletionResponse {
            text,
            usage: Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
            model: self.name.clone(),
        })
    }
}
