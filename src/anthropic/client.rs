use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use tracing::{debug, trace, warn};

use super::types::{Delta, MessageRequest, StreamApiEvent};
use crate::config::{AnthropicConfig, GenerationConfig, RequestConfig};
use crate::error::{AnthropicError, AnthropicResult, StreamError, StreamResult};
use crate::stream::ChunkProducer;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API (streaming only).
///
/// A failed stream is surfaced once and never retried here; re-triggering
/// generation is the caller's decision.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
    generation: GenerationConfig,
    timeout_ms: u64,
}

impl AnthropicClient {
    /// Create a new client
    pub fn new(
        config: &AnthropicConfig,
        request_config: RequestConfig,
        generation: GenerationConfig,
    ) -> AnthropicResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(AnthropicError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            generation,
            timeout_ms: request_config.timeout_ms,
        })
    }

    /// Open a streaming generation and return a producer of text deltas.
    pub async fn stream_message(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> AnthropicResult<SseProducer> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessageRequest::streaming(
            self.generation.model.clone(),
            self.generation.max_tokens,
            system_prompt,
            user_message,
        );

        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            "Opening streaming generation"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnthropicError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    AnthropicError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AnthropicError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(SseProducer::new(response.bytes_stream()))
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>;

/// Chunk producer over the SSE byte stream of a Messages response.
///
/// Byte frame boundaries carry no meaning: partial SSE lines are buffered
/// until their newline arrives, then `data:` payloads decode into stream
/// events and text deltas queue up as chunks.
pub struct SseProducer {
    bytes: ByteStream,
    buffer: String,
    pending: VecDeque<String>,
    done: bool,
}

impl std::fmt::Debug for SseProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseProducer")
            .field("buffer", &self.buffer)
            .field("pending", &self.pending)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl SseProducer {
    fn new(bytes: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static) -> Self {
        Self {
            bytes: Box::pin(bytes),
            buffer: String::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Decode every complete SSE line currently buffered.
    fn drain_buffer(&mut self) -> StreamResult<()> {
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim_end_matches('\r').to_string();
            self.buffer.drain(..=pos);

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim_start();
            if data.is_empty() {
                continue;
            }

            match serde_json::from_str::<StreamApiEvent>(data) {
                Ok(StreamApiEvent::ContentBlockDelta {
                    delta: Delta::TextDelta { text },
                }) => self.pending.push_back(text),
                Ok(StreamApiEvent::MessageStop) => self.done = true,
                Ok(StreamApiEvent::Error { error }) => {
                    warn!(error = %error.message, "Stream error event received");
                    return Err(StreamError::Producer {
                        message: error.message,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    // Control lines we cannot decode are skipped, like any
                    // other malformed stream content.
                    trace!(error = %e, "Skipping undecodable SSE data line");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChunkProducer for SseProducer {
    async fn next_chunk(&mut self) -> StreamResult<Option<String>> {
        loop {
            if let Some(text) = self.pending.pop_front() {
                return Ok(Some(text));
            }
            if self.done {
                return Ok(None);
            }

            match self.bytes.next().await {
                Some(Ok(bytes)) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                    self.drain_buffer()?;
                }
                Some(Err(e)) => {
                    return Err(StreamError::Transport(AnthropicError::Http(e)));
                }
                None => {
                    self.done = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> AnthropicClient {
        let config = AnthropicConfig {
            api_key: "test_key".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
        };
        AnthropicClient::new(&config, RequestConfig::default(), GenerationConfig::default())
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = test_client();
        assert_eq!(client.base_url(), "https://api.anthropic.com");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = AnthropicConfig {
            api_key: "test_key".to_string(),
            base_url: "https://api.anthropic.com/".to_string(),
        };
        let client =
            AnthropicClient::new(&config, RequestConfig::default(), GenerationConfig::default())
                .unwrap();
        assert_eq!(client.base_url(), "https://api.anthropic.com");
    }

    #[tokio::test]
    async fn test_sse_producer_reassembles_split_frames() {
        // One SSE data line split across two byte frames.
        let frames: Vec<Result<bytes::Bytes, reqwest::Error>> = vec![
            Ok(bytes::Bytes::from(
                "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_del",
            )),
            Ok(bytes::Bytes::from(
                "ta\",\"text\":\"hello\"}}\n\ndata: {\"type\":\"message_stop\"}\n\n",
            )),
        ];
        let mut producer = SseProducer::new(futures_util::stream::iter(frames));

        assert_eq!(producer.next_chunk().await.unwrap(), Some("hello".to_string()));
        assert_eq!(producer.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sse_producer_skips_control_events() {
        let body = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{}}\n\n",
            "event: ping\n",
            "data: {\"type\":\"ping\"}\n\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"a\"}}\n\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        let frames: Vec<Result<bytes::Bytes, reqwest::Error>> =
            vec![Ok(bytes::Bytes::from(body))];
        let mut producer = SseProducer::new(futures_util::stream::iter(frames));

        assert_eq!(producer.next_chunk().await.unwrap(), Some("a".to_string()));
        assert_eq!(producer.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sse_producer_surfaces_error_event() {
        let body = concat!(
            "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
        );
        let frames: Vec<Result<bytes::Bytes, reqwest::Error>> =
            vec![Ok(bytes::Bytes::from(body))];
        let mut producer = SseProducer::new(futures_util::stream::iter(frames));

        let err = producer.next_chunk().await.unwrap_err();
        assert!(err.to_string().contains("Overloaded"));
    }

    #[tokio::test]
    async fn test_sse_producer_end_without_stop_completes() {
        let body = "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"x\"}}\n\n";
        let frames: Vec<Result<bytes::Bytes, reqwest::Error>> =
            vec![Ok(bytes::Bytes::from(body))];
        let mut producer = SseProducer::new(futures_util::stream::iter(frames));

        assert_eq!(producer.next_chunk().await.unwrap(), Some("x".to_string()));
        assert_eq!(producer.next_chunk().await.unwrap(), None);
    }
}
