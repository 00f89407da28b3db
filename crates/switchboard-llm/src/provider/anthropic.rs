//! Anthropic Messages API adapter

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use http::header::{HeaderMap, HeaderName};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{Adapter, endpoint, secret_header, static_header};
use crate::convert::anthropic::{build_request, messages_shape};
use crate::error::LlmError;
use crate::normalize::normalize;
use crate::protocol::anthropic::AnthropicStreamEvent;
use crate::stream::{ChunkSink, StreamParser, frames};
use crate::transport::{BodyStream, HttpRequest};
use crate::types::{CompletionResponse, Message, Options};

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const API_VERSION: &str = "2023-06-01";

/// Event type carrying generated text
const CONTENT_BLOCK_DELTA: &str = "content_block_delta";

pub struct AnthropicAdapter {
    api_key: SecretString,
    base_url: Url,
}

impl AnthropicAdapter {
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(api_key: SecretString, base_url: Option<Url>) -> Self {
        let base_url = base_url.unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));
        Self { api_key, base_url }
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            secret_header(self.api_key.expose_secret())?,
        );

        let (name, value) = static_header("anthropic-version", API_VERSION);
        headers.insert(name, value);

        Ok(headers)
    }
}

impl Adapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn build_request(&self, messages: &[Message], streaming: bool, options: &Options) -> Result<HttpRequest, LlmError> {
        let url = endpoint(&self.base_url, "/messages")?;
        let body = build_request(messages, streaming, options);

        HttpRequest::post_json(url, self.headers()?, &body)
    }

    /// Messages API replies first, then the generic shapes
    fn parse_response(&self, body: &Bytes) -> Result<CompletionResponse, LlmError> {
        messages_shape(body).map_or_else(|| normalize(body).map_err(LlmError::Decode), Ok)
    }

    fn stream_parser(&self) -> Option<Arc<dyn StreamParser>> {
        Some(Arc::new(AnthropicStreamParser))
    }
}

/// Emits the text of `content_block_delta` events
///
/// Every other event type (message start/stop, pings, tool input deltas)
/// is ignored. The stream ends when the body does.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicStreamParser;

#[async_trait]
impl StreamParser for AnthropicStreamParser {
    async fn parse(&self, body: BodyStream, sink: &mut dyn ChunkSink) -> Result<(), LlmError> {
        let mut frames = frames(body);

        while let Some(frame) = frames.next().await {
            let frame = frame?;

            let event: AnthropicStreamEvent = match serde_json::from_str(frame.data()) {
                Ok(event) => event,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable stream line");
                    continue;
                }
            };

            if event.event_type != CONTENT_BLOCK_DELTA {
                continue;
            }

            if let Some(text) = event.delta.and_then(|delta| delta.text).filter(|text| !text.is_empty()) {
                sink.write_chunk(text).await?;
            }
        }

        Ok(())
    }
}
