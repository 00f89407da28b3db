//! Vendor adapters
//!
//! An adapter knows how to address one vendor and how to read its replies.
//! It never performs I/O itself; the client sends what the adapter builds.

pub mod anthropic;
pub mod google;
pub mod openai;

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use secrecy::SecretString;
use switchboard_config::Vendor;
use url::Url;

use crate::error::LlmError;
use crate::normalize::normalize;
use crate::stream::StreamParser;
use crate::transport::HttpRequest;
use crate::types::{CompletionResponse, Message, Options};

pub use anthropic::AnthropicAdapter;
pub use google::GeminiAdapter;
pub use openai::{CompatProfile, OpenAiCompatibleAdapter};

/// Vendor-specific request building and reply interpretation
pub trait Adapter: Send + Sync {
    /// Vendor name used in logs and errors
    fn name(&self) -> &str;

    /// Build the HTTP request for a completion
    fn build_request(&self, messages: &[Message], streaming: bool, options: &Options) -> Result<HttpRequest, LlmError>;

    /// Interpret a successful non-streaming reply body
    ///
    /// A [`LlmError::Decode`] result makes the client pass the raw body
    /// through as text; any other error is returned to the caller.
    fn parse_response(&self, body: &Bytes) -> Result<CompletionResponse, LlmError> {
        normalize(body).map_err(LlmError::Decode)
    }

    /// Streaming parser, or `None` if this vendor cannot stream
    fn stream_parser(&self) -> Option<Arc<dyn StreamParser>>;
}

/// Adapter for a vendor, optionally pointed at a different base URL
pub fn adapter_for(vendor: Vendor, api_key: SecretString, base_url: Option<Url>) -> Arc<dyn Adapter> {
    match vendor {
        Vendor::Anthropic => Arc::new(AnthropicAdapter::new(api_key, base_url)),
        Vendor::Gemini => Arc::new(GeminiAdapter::new(api_key, base_url)),
        Vendor::OpenAi => compatible(&openai::OPENAI, api_key, base_url),
        Vendor::GroqCloud => compatible(&openai::GROQ_CLOUD, api_key, base_url),
        Vendor::Mistral => compatible(&openai::MISTRAL, api_key, base_url),
        Vendor::OpenRouter => compatible(&openai::OPEN_ROUTER, api_key, base_url),
        Vendor::Xai => compatible(&openai::XAI, api_key, base_url),
        Vendor::Anannas => compatible(&openai::ANANNAS, api_key, base_url),
        Vendor::Perplexity => compatible(&openai::PERPLEXITY, api_key, base_url),
    }
}

fn compatible(profile: &'static CompatProfile, api_key: SecretString, base_url: Option<Url>) -> Arc<dyn Adapter> {
    Arc::new(OpenAiCompatibleAdapter::new(profile, api_key, base_url))
}

/// Append a path to a base URL without losing the base's own path
pub(crate) fn endpoint(base_url: &Url, path: &str) -> Result<Url, LlmError> {
    let base = base_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}{path}")).map_err(|e| LlmError::InvalidRequest(format!("invalid endpoint URL: {e}")))
}

/// Header value carrying a credential, marked sensitive
pub(crate) fn secret_header(value: &str) -> Result<HeaderValue, LlmError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| LlmError::InvalidRequest("API key is not a valid header value".to_owned()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Static header pair
pub(crate) fn static_header(name: &'static str, value: &'static str) -> (HeaderName, HeaderValue) {
    (HeaderName::from_static(name), HeaderValue::from_static(value))
}
