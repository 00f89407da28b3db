//! Vendor-agnostic LLM completions
//!
//! One canonical conversation model and two entry points (complete reply
//! and streamed text) over `OpenAI`, Anthropic, Gemini and the
//! OpenAI-compatible vendors (`GroqCloud`, Mistral, `OpenRouter`, xAI,
//! Anannas, Perplexity).

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod client;
pub mod context;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod protocol;
pub mod provider;
pub mod stream;
pub mod transport;
pub mod types;

pub use client::Client;
pub use context::RequestContext;
pub use error::{ApiError, ContentBlockedError, LlmError};
pub use provider::{Adapter, adapter_for};
pub use stream::{ChunkSink, CompletionStream, StreamParser};
pub use switchboard_config::{DefaultOptions, Vendor};
pub use transport::{BodyStream, HttpRequest, ReqwestTransport, Transport, TransportResponse};
pub use types::{CompletionResponse, InputSchema, Message, Options, PropertySchema, Role, Tool, ToolCallRequest};
