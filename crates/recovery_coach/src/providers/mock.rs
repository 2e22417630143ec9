//! Mock provider: deterministic streamed replies, no API key needed.

use crate::api_types::{Message, Role, StreamEvent};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    chunk_delay: Duration,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            chunk_delay: Duration::from_millis(40),
        }
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    fn reply(&self, system: &str, messages: &[Message]) -> String {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
            .unwrap_or("");
        let mode = if system.is_empty() { "análisis" } else { "coach" };
        format!(
            "(Mock {} {}) He recibido: «{}». ¡Sigue así, paso a paso! 💪",
            self.model, mode, last_user
        )
    }
}

/// Split into word-sized deltas, keeping the separators.
fn chunk_words(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn stream_complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        _params: CompletionParams,
    ) -> Result<mpsc::Receiver<StreamEvent>> {
        let (tx, rx) = mpsc::channel(32);
        let chunks = chunk_words(&self.reply(system, &messages));
        let delay = self.chunk_delay;
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(StreamEvent::TextDelta(chunk)).await.is_err() {
                    return;
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            let _ = tx
                .send(StreamEvent::Done {
                    stop_reason: Some("STOP".into()),
                })
                .await;
        });
        Ok(rx)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
