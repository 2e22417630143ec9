//! Streaming text-generation backends.

pub mod gemini;
pub mod mock;
pub mod openai;
pub(crate) mod sse;

pub use gemini::GeminiClient;
pub use mock::MockProvider;
pub use openai::OpenAiClient;

use crate::llm::LlmClient;
use anyhow::Result;
use recovery_core::config::LlmConfig;
use std::sync::Arc;

/// Build the configured client. A missing API key falls back to the mock
/// provider so the coach stays usable offline.
pub fn build_client(cfg: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let key_var = match cfg.provider.as_str() {
        "gemini" => "GEMINI_API_KEY",
        "openai" => "OPENAI_API_KEY",
        "mock" => return Ok(Arc::new(MockProvider::new(&cfg.model))),
        other => anyhow::bail!("Unknown LLM provider: {} (expected gemini, openai or mock)", other),
    };

    let Some(api_key) = std::env::var(key_var).ok().filter(|k| !k.trim().is_empty()) else {
        tracing::warn!("{} not set, using the mock provider", key_var);
        return Ok(Arc::new(MockProvider::new(&cfg.model)));
    };

    let base_url = cfg.base_url.as_deref();
    let client: Arc<dyn LlmClient> = match cfg.provider.as_str() {
        "openai" => Arc::new(OpenAiClient::new(&cfg.model, &api_key, base_url)?),
        _ => Arc::new(GeminiClient::new(&cfg.model, &api_key, base_url)?),
    };
    tracing::info!("Using {} provider with model {}", client.name(), cfg.model);
    Ok(client)
}
