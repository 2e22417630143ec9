use crate::api_types::{Message, StreamEvent};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

/// Sampling parameters for a completion.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    /// Maximum tokens to generate (will be clamped to provider limits)
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl From<&recovery_core::config::LlmConfig> for CompletionParams {
    fn from(cfg: &recovery_core::config::LlmConfig) -> Self {
        Self {
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Start a streaming completion. An empty `system` sends no system
    /// instruction. Errors before the first byte are returned; errors after
    /// arrive as `StreamEvent::Error`.
    async fn stream_complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<Receiver<StreamEvent>>;

    fn name(&self) -> &'static str;
}
