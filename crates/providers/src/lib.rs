//! LLM completion provider implementations for Protochain.
//!
//! All providers implement the `protochain_core::Provider` trait. The
//! chain runner never knows which backend it is talking to.

pub mod anthropic;
pub mod scripted;

pub use anthropic::AnthropicProvider;
pub use scripted::ScriptedProvider;

use protochain_config::AppConfig;
use protochain_core::error::ProviderError;
use protochain_core::provider::Provider;
use std::sync::Arc;

/// Build the default provider from configuration.
///
/// Requires an API key (config file or environment); without one no
/// completion backend can be constructed.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key found; set PROTOCHAIN_API_KEY or ANTHROPIC_API_KEY".into(),
        )
    })?;
    Ok(Arc::new(AnthropicProvider::new(api_key)))
}
