use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::sse::SseBuffer;
use crate::api_types::{Message, Role, StreamEvent};
use crate::llm::{CompletionParams, LlmClient};
use crate::retry::{with_retry, RetryConfig};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini `streamGenerateContent` over SSE.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(model: &str, api_key: &str, base_url: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .connect_timeout(std::time::Duration::from_secs(15))
                .timeout(std::time::Duration::from_secs(120))
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

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

/// Gemini names the assistant role `model`.
fn to_contents(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            json!({ "role": role, "parts": [{ "text": m.text }] })
        })
        .collect()
}

pub(crate) fn build_body(system: &str, messages: &[Message], params: &CompletionParams) -> Value {
    let mut body = json!({
        "contents": to_contents(messages),
        "generationConfig": {
            "temperature": params.temperature,
            "maxOutputTokens": params.max_tokens,
        },
    });
    if !system.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    #[tracing::instrument(skip(self, system, messages, params), fields(model = %self.model))]
    async fn stream_complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<mpsc::Receiver<StreamEvent>> {
        let body = build_body(system, &messages, &params);
        let url = self.url();
        tracing::debug!(
            "Gemini request: {} turns, temperature={:.2}",
            messages.len(),
            params.temperature
        );

        let client = &self.client;
        let api_key = &self.api_key;
        let response = with_retry(&self.retry, "Gemini", || async {
            client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send()
                .await
                .context("Failed to send streaming request to Gemini")
        })
        .await?;

        let (tx, rx) = mpsc::channel(64);
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            if let Err(e) = parse_gemini_sse(byte_stream, &tx).await {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            }
        });
        Ok(rx)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Parse a Gemini SSE byte stream into StreamEvents.
///
/// Every `data:` payload is a partial `GenerateContentResponse`; text lives
/// in `candidates[0].content.parts[*].text` and the last chunk carries
/// `finishReason`. An `error` object aborts the stream.
pub(crate) async fn parse_gemini_sse<S>(byte_stream: S, tx: &mpsc::Sender<StreamEvent>) -> Result<()>
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
            let v: Value = match serde_json::from_str(&data) {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!("Skipping unparseable Gemini chunk: {}", e);
                    continue;
                }
            };

            if let Some(err) = v.get("error") {
                let message = err
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown error");
                let _ = tx.send(StreamEvent::Error(message.to_string())).await;
                return Ok(());
            }

            let candidate = &v["candidates"][0];
            if let Some(parts) = candidate["content"]["parts"].as_array() {
                let text: String = parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect();
                if !text.is_empty() && tx.send(StreamEvent::TextDelta(text)).await.is_err() {
                    return Ok(());
                }
            }
            if let Some(reason) = candidate["finishReason"].as_str() {
                stop_reason = Some(reason.to_string());
            }
        }
    }

    let _ = tx.send(StreamEvent::Done { stop_reason }).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: create a fake byte stream from raw SSE chunks
    fn fake_stream(
        chunks: &[&str],
    ) -> impl futures_util::Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Unpin + Send
    {
        let items: Vec<_> = chunks
            .iter()
            .map(|c| Ok(bytes::Bytes::from(c.to_string())))
            .collect();
        futures_util::stream::iter(items)
    }

    async fn collect(chunks: &[&str]) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::channel(32);
        parse_gemini_sse(fake_stream(chunks), &tx).await.unwrap();
        drop(tx);
        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn test_gemini_sse_text_deltas() {
        let events = collect(&[
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hola\"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\", ¿qué tal?\"}]},\"finishReason\":\"STOP\"}]}\r\n\r\n",
        ])
        .await;
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("Hola".into()),
                StreamEvent::TextDelta(", ¿qué tal?".into()),
                StreamEvent::Done {
                    stop_reason: Some("STOP".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_gemini_sse_split_across_chunks() {
        let events = collect(&[
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"te",
            "xt\":\"Ánimo\"}]}}]}\n\n",
        ])
        .await;
        assert_eq!(events[0], StreamEvent::TextDelta("Ánimo".into()));
    }

    #[tokio::test]
    async fn test_gemini_sse_error_payload() {
        let events = collect(&[
            "data: {\"error\":{\"code\":503,\"message\":\"The model is overloaded\"}}\n\n",
        ])
        .await;
        assert_eq!(
            events,
            vec![StreamEvent::Error("The model is overloaded".into())]
        );
    }

    #[test]
    fn test_body_maps_roles_and_system() {
        let msgs = vec![Message::user("hola"), Message::assistant("¡hola!")];
        let body = build_body("persona", &msgs, &CompletionParams::default());
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "persona");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);

        let body = build_body("", &msgs, &CompletionParams::default());
        assert!(body.get("systemInstruction").is_none());
    }
}
