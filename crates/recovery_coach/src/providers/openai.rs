use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;

use super::sse::SseBuffer;
use crate::api_types::{Message, Role, StreamEvent};
use crate::llm::{CompletionParams, LlmClient};
use crate::retry::{with_retry, RetryConfig};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Any OpenAI-compatible `/chat/completions` endpoint, streamed.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    pub fn new(model: &str, api_key: &str, base_url: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(15))
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            retry: RetryConfig::default(),
        })
    }
}

/// OpenAI puts the system prompt in as the first message.
pub(crate) fn build_body(
    model: &str,
    system: &str,
    messages: &[Message],
    params: &CompletionParams,
) -> Value {
    let mut openai_messages = Vec::with_capacity(messages.len() + 1);
    if !system.is_empty() {
        openai_messages.push(json!({ "role": "system", "content": system }));
    }
    for m in messages {
        let role = match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        openai_messages.push(json!({ "role": role, "content": m.text }));
    }

    json!({
        "model": model,
        "messages": openai_messages,
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
        "stream": true,
    })
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    #[tracing::instrument(skip(self, system, messages, params), fields(model = %self.model))]
    async fn stream_complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<mpsc::Receiver<StreamEvent>> {
        let payload = build_body(&self.model, system, &messages, &params);
        let url = format!("{}/chat/completions", self.base_url);

        let client = &self.client;
        let api_key = &self.api_key;
        let response = with_retry(&self.retry, "OpenAI", || async {
            client
                .post(&url)
                .bearer_auth(api_key)
                .json(&payload)
                .send()
                .await
                .context("Failed to send streaming request to OpenAI")
        })
        .await?;

        let (tx, rx) = mpsc::channel(64);
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            if let Err(e) = parse_openai_sse(byte_stream, &tx).await {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            }
        });
        Ok(rx)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Parse OpenAI `data:` lines. `[DONE]` ends the stream.
pub(crate) async fn parse_openai_sse<S>(byte_stream: S, tx: &mpsc::Sender<StreamEvent>) -> Result<()>
where
    S: futures_util::Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Unpin + Send,
{
    let mut stream = byte_stream;
    let mut buffer = SseBuffer::new();
    let mut stop_reason: Option<String> = None;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Error reading SSE chunk")?;
        buffer.push_bytes(&chunk);

        for data in buffer.extract_data() {
            if data == "[DONE]" {
                let _ = tx.send(StreamEvent::Done { stop_reason }).await;
                return Ok(());
            }
            let Ok(v) = serde_json::from_str::<Value>(&data) else {
                tracing::debug!("Skipping unparseable OpenAI chunk");
                continue;
            };
            if let Some(err) = v.get("error") {
                let message = err["message"].as_str().unwrap_or("unknown error");
                let _ = tx.send(StreamEvent::Error(message.to_string())).await;
                return Ok(());
            }
            let choice = &v["choices"][0];
            if let Some(text) = choice["delta"]["content"].as_str() {
                if !text.is_empty() && tx.send(StreamEvent::TextDelta(text.to_string())).await.is_err() {
                    return Ok(());
                }
            }
            if let Some(reason) = choice["finish_reason"].as_str() {
                stop_reason = Some(reason.to_string());
            }
        }
    }

    let _ = tx.send(StreamEvent::Done { stop_reason }).await;
    Ok(())
}
