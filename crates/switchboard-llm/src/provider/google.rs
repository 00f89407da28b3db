//! Google Gemini adapter

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use http::StatusCode;
use http::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{Adapter, endpoint};
use crate::convert::google::{blocked_reason, build_request, into_completion};
use crate::error::{ApiError, ContentBlockedError, LlmError};
use crate::protocol::google::{GeminiError, GeminiResponse};
use crate::stream::{ChunkSink, StreamParser, frames};
use crate::transport::{BodyStream, HttpRequest};
use crate::types::{CompletionResponse, Message, Options};

/// Default Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Finish reasons after which no further content follows
const TERMINAL_FINISH_REASONS: &[&str] = &["STOP", "MAX_TOKENS"];

pub struct GeminiAdapter {
    api_key: SecretString,
    base_url: Url,
}

impl GeminiAdapter {
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(api_key: SecretString, base_url: Option<Url>) -> Self {
        let base_url = base_url.unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));
        Self { api_key, base_url }
    }

    /// Model-specific URL; the key travels as a query parameter
    fn model_url(&self, model: &str, streaming: bool) -> Result<Url, LlmError> {
        let method = if streaming {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        let mut url = endpoint(&self.base_url, &format!("/models/{model}:{method}"))?;

        {
            let mut query = url.query_pairs_mut();
            if streaming {
                query.append_pair("alt", "sse");
            }
            query.append_pair("key", self.api_key.expose_secret());
        }

        Ok(url)
    }
}

impl Adapter for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    fn build_request(&self, messages: &[Message], streaming: bool, options: &Options) -> Result<HttpRequest, LlmError> {
        let model = options
            .model()
            .ok_or_else(|| LlmError::InvalidRequest("gemini requires a model".to_owned()))?;

        let url = self.model_url(model, streaming)?;
        let body = build_request(messages, options);

        HttpRequest::post_json(url, HeaderMap::new(), &body)
    }

    /// Gemini replies never fall back to raw text
    fn parse_response(&self, body: &Bytes) -> Result<CompletionResponse, LlmError> {
        let mut response: GeminiResponse = serde_json::from_slice(body)
            .map_err(|e| LlmError::MalformedResponse(format!("failed to parse response: {e}")))?;

        if let Some(error) = response.error.take() {
            return Err(api_error(error, body.clone()));
        }

        if let Some(reason) = blocked_reason(&response) {
            tracing::warn!(reason, "gemini blocked the response");
            return Err(ContentBlockedError {
                reason: reason.to_owned(),
                body: body.clone(),
            }
            .into());
        }

        into_completion(response)
    }

    fn stream_parser(&self) -> Option<Arc<dyn StreamParser>> {
        Some(Arc::new(GeminiStreamParser))
    }
}

fn api_error(error: GeminiError, body: Bytes) -> LlmError {
    let status = StatusCode::from_u16(error.code).unwrap_or(StatusCode::BAD_GATEWAY);
    let message = if error.status.is_empty() {
        error.message
    } else {
        format!("{}: {}", error.status, error.message)
    };

    ApiError { status, message, body }.into()
}

/// Emits candidate text from `streamGenerateContent` frames
///
/// An in-stream error object or a refusal ends the stream with an error.
/// A `STOP` or `MAX_TOKENS` finish reason ends it normally.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiStreamParser;

#[async_trait]
impl StreamParser for GeminiStreamParser {
    async fn parse(&self, body: BodyStream, sink: &mut dyn ChunkSink) -> Result<(), LlmError> {
        let mut frames = frames(body);

        while let Some(frame) = frames.next().await {
            let frame = frame?;
            if frame.is_done() {
                return Ok(());
            }

            let mut chunk: GeminiResponse = match serde_json::from_str(frame.data()) {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable stream line");
                    continue;
                }
            };

            if let Some(error) = chunk.error.take() {
                return Err(api_error(error, Bytes::from(frame.data().to_owned())));
            }

            if let Some(reason) = blocked_reason(&chunk) {
                tracing::warn!(reason, "gemini blocked the stream");
                return Err(ContentBlockedError {
                    reason: reason.to_owned(),
                    body: Bytes::from(frame.data().to_owned()),
                }
                .into());
            }

            let Some(candidate) = chunk.candidates.into_iter().next() else {
                continue;
            };

            for text in candidate.content.parts.into_iter().filter_map(|part| part.text) {
                if !text.is_empty() {
                    sink.write_chunk(text).await?;
                }
            }

            if candidate
                .finish_reason
                .as_deref()
                .is_some_and(|reason| TERMINAL_FINISH_REASONS.contains(&reason))
            {
                return Ok(());
            }
        }

        Ok(())
    }
}
