//! The text-generation capability the chat orchestrator consumes.
//!
//! A generator never fails from the caller's point of view: upstream
//! errors are turned into a final apology fragment. Every fragment carries
//! the full text accumulated so far, not just the newest delta.

use async_trait::async_trait;
use recovery_core::{ChatTurn, Role};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api_types::{Message, StreamEvent};
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{coach_system_instruction, sensation_prompt};

/// Shown to the user when the upstream call fails.
pub const APOLOGY: &str = "He tenido un problema de conexión. ¿Podrías intentarlo de nuevo?";

/// Lazy, finite, non-restartable sequence of cumulative reply snapshots.
/// Dropping it abandons the reply.
pub type FragmentStream = mpsc::Receiver<String>;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Reply to `message` given the transcript before it.
    async fn continue_conversation(&self, history: &[ChatTurn], message: &str) -> FragmentStream;

    /// Short supportive advice for a described sensation. No history.
    async fn analyze_sensation(&self, sensation: &str) -> FragmentStream;
}

/// Upstream history starts at the first user turn; assistant-only priming
/// (the welcome message) is dropped.
pub fn sanitize_history(history: &[ChatTurn]) -> &[ChatTurn] {
    match history.iter().position(|t| t.role == Role::User) {
        Some(first_user) => &history[first_user..],
        None => &[],
    }
}

/// [`TextGenerator`] over a streaming [`LlmClient`].
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    system: String,
    params: CompletionParams,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>, params: CompletionParams) -> Self {
        Self {
            client,
            system: coach_system_instruction(),
            params,
        }
    }

    async fn stream(&self, system: &str, messages: Vec<Message>) -> FragmentStream {
        let (tx, rx) = mpsc::channel(32);
        match self
            .client
            .stream_complete(system, messages, self.params.clone())
            .await
        {
            Ok(events) => {
                tokio::spawn(accumulate(events, tx));
            }
            Err(e) => {
                tracing::error!("Error calling {} API: {:#}", self.client.name(), e);
                // Fresh channel with spare capacity, cannot be full.
                let _ = tx.try_send(APOLOGY.to_string());
            }
        }
        rx
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn continue_conversation(&self, history: &[ChatTurn], message: &str) -> FragmentStream {
        let mut messages: Vec<Message> = sanitize_history(history).iter().map(Message::from).collect();
        messages.push(Message::user(message));
        self.stream(&self.system, messages).await
    }

    async fn analyze_sensation(&self, sensation: &str) -> FragmentStream {
        let messages = vec![Message::user(sensation_prompt(sensation))];
        self.stream("", messages).await
    }
}

/// Fold deltas into cumulative snapshots until the stream ends.
async fn accumulate(mut events: mpsc::Receiver<StreamEvent>, tx: mpsc::Sender<String>) {
    let mut text = String::new();
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::TextDelta(delta) => {
                if delta.is_empty() {
                    continue;
                }
                text.push_str(&delta);
                if tx.send(text.clone()).await.is_err() {
                    tracing::debug!("Reply abandoned by the reader");
                    return;
                }
            }
            StreamEvent::Done { stop_reason } => {
                tracing::debug!("Reply finished ({:?}, {} chars)", stop_reason, text.len());
                return;
            }
            StreamEvent::Error(e) => {
                tracing::error!("Text generation failed mid-stream: {}", e);
                let last = if text.is_empty() {
                    APOLOGY.to_string()
                } else {
                    format!("{}\n\n{}", text, APOLOGY)
                };
                let _ = tx.send(last).await;
                return;
            }
        }
    }
}
