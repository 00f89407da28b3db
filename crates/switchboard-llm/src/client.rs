//! Vendor-agnostic completion entry points

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use secrecy::SecretString;
use switchboard_config::{DefaultOptions, ProviderConfig, Vendor};

use crate::context::{CallScope, RequestContext};
use crate::error::{ApiError, LlmError};
use crate::provider::{Adapter, adapter_for};
use crate::stream::pipe::{PipeWriter, pipe};
use crate::stream::{CompletionStream, StreamParser};
use crate::transport::{BodyStream, ReqwestTransport, Transport, read_body};
use crate::types::{CompletionResponse, Message, Options, Role};

/// Completion client bound to one vendor
///
/// Cheap to clone; clones share the adapter and the HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    adapter: Arc<dyn Adapter>,
    transport: Arc<dyn Transport>,
    defaults: DefaultOptions,
    timeout: Option<Duration>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("vendor", &self.adapter.name())
            .field("defaults", &self.defaults)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client for any adapter, sending over a default [`ReqwestTransport`]
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            adapter,
            transport: Arc::new(ReqwestTransport::default()),
            defaults: DefaultOptions::default(),
            timeout: None,
        }
    }

    pub fn for_vendor(vendor: Vendor, api_key: impl Into<SecretString>) -> Self {
        Self::new(adapter_for(vendor, api_key.into(), None))
    }

    pub fn openai(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::OpenAi, api_key)
    }

    pub fn anthropic(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::Anthropic, api_key)
    }

    pub fn gemini(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::Gemini, api_key)
    }

    pub fn groq_cloud(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::GroqCloud, api_key)
    }

    pub fn mistral(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::Mistral, api_key)
    }

    pub fn open_router(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::OpenRouter, api_key)
    }

    pub fn xai(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::Xai, api_key)
    }

    pub fn anannas(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::Anannas, api_key)
    }

    pub fn perplexity(api_key: impl Into<SecretString>) -> Self {
        Self::for_vendor(Vendor::Perplexity, api_key)
    }

    /// Client for a configured provider entry
    pub fn from_config(config: &ProviderConfig) -> Self {
        let adapter = adapter_for(config.vendor, config.api_key.clone(), config.base_url.clone());

        Self {
            defaults: config.defaults.clone(),
            timeout: config.timeout,
            ..Self::new(adapter)
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Options applied when a call leaves them unset
    #[must_use]
    pub fn with_defaults(mut self, defaults: DefaultOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Deadline for calls whose context sets none
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// Request a complete reply
    ///
    /// A successful body that matches no known reply shape is returned as
    /// raw text in `content` with an empty role.
    pub async fn create_completion(
        &self,
        context: &RequestContext,
        messages: &[Message],
        options: &Options,
    ) -> Result<CompletionResponse, LlmError> {
        let scope = CallScope::start(context, self.timeout);
        let body = self.send(&scope, messages, options, false).await?;
        let body = scope.run(read_body(body)).await?;

        match self.adapter.parse_response(&body) {
            Ok(response) => Ok(response),
            Err(LlmError::Decode(e)) => {
                tracing::debug!(vendor = self.name(), error = %e, "reply matched no known shape, returning raw body");
                Ok(CompletionResponse::raw(&body))
            }
            Err(e) => Err(e),
        }
    }

    /// Request a reply as a stream of text fragments
    ///
    /// Fails before any network activity if the vendor cannot stream.
    /// Fragments are produced by a background task that stops as soon as
    /// the context is cancelled or the returned stream is closed.
    pub async fn create_completion_stream(
        &self,
        context: &RequestContext,
        messages: &[Message],
        options: &Options,
    ) -> Result<CompletionStream, LlmError> {
        let Some(parser) = self.adapter.stream_parser() else {
            return Err(LlmError::StreamingUnsupported {
                vendor: self.name().to_owned(),
            });
        };

        let scope = CallScope::start(context, self.timeout);
        let body = self.send(&scope, messages, options, true).await?;

        let (writer, stream) = pipe();
        let worker = StreamWorker {
            parser,
            writer,
            scope,
            vendor: self.name().to_owned(),
        };
        tokio::spawn(worker.run(body));

        Ok(stream)
    }

    /// Build, send and status-check a request, returning the unread body
    async fn send(
        &self,
        scope: &CallScope,
        messages: &[Message],
        options: &Options,
        streaming: bool,
    ) -> Result<BodyStream, LlmError> {
        let options = options.or_defaults(&self.defaults);
        let messages = with_system_prompt(messages, &options);
        let request = self.adapter.build_request(&messages, streaming, &options)?;

        tracing::debug!(vendor = self.name(), streaming, model = options.model(), "sending completion request");

        let response = scope.run(self.transport.send(request)).await.inspect_err(|e| {
            if !e.is_interrupted() {
                tracing::error!(vendor = self.name(), error = %e, "upstream request failed");
            }
        })?;

        if response.status.as_u16() < 300 {
            return Ok(response.body);
        }

        let status = response.status;
        let body = match scope.run(read_body(response.body)).await {
            Ok(body) => body,
            Err(e) if e.is_interrupted() => return Err(e),
            Err(_) => Bytes::new(),
        };

        tracing::warn!(vendor = self.name(), status = %status, "upstream returned error");
        Err(ApiError::from_body(status, body).into())
    }
}

/// Prepend the configured system prompt unless the conversation has one
///
/// The caller's messages are never modified.
fn with_system_prompt<'a>(messages: &'a [Message], options: &Options) -> Cow<'a, [Message]> {
    match options.system_prompt() {
        Some(prompt) if messages.first().is_none_or(|first| first.role != Role::System) => {
            let mut prefixed = Vec::with_capacity(messages.len() + 1);
            prefixed.push(Message::system(prompt));
            prefixed.extend_from_slice(messages);
            Cow::Owned(prefixed)
        }
        _ => Cow::Borrowed(messages),
    }
}

/// Background task pumping parsed fragments into the pipe
struct StreamWorker {
    parser: Arc<dyn StreamParser>,
    writer: PipeWriter,
    scope: CallScope,
    vendor: String,
}

impl StreamWorker {
    /// Run until done, cancelled or abandoned by the reader
    ///
    /// The body is dropped before the outcome is reported, so the connection
    /// is released exactly once on every path.
    async fn run(mut self, body: BodyStream) {
        let watcher = self.writer.watcher();

        let outcome = tokio::select! {
            biased;
            error = self.scope.interrupted() => Err(error),
            () = watcher.closed() => Err(LlmError::StreamClosed),
            result = self.parser.parse(body, &mut self.writer) => result,
        };

        drop(watcher);

        match outcome {
            Ok(()) => {
                tracing::debug!(vendor = %self.vendor, "stream completed");
                self.writer.close();
            }
            Err(LlmError::StreamClosed) => {
                tracing::debug!(vendor = %self.vendor, "stream reader went away");
            }
            Err(e) => {
                if !e.is_interrupted() {
                    tracing::warn!(vendor = %self.vendor, error = %e, "stream failed");
                }
                self.writer.close_with_error(e).await;
            }
        }
    }
}
