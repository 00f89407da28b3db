//! Interpretation of non-streaming reply bodies
//!
//! Shapes are tried in order and the first whose acceptance check passes
//! wins:
//!
//! 1. The canonical [`CompletionResponse`] shape, accepted when it carries
//!    a role or at least one tool call.
//! 2. The `OpenAI` `choices[0].message` shape. An empty `choices` array
//!    yields an empty response.
//!
//! When neither applies the decode error is returned; callers fall back to
//! passing the raw body through as text.

use crate::protocol::openai::{OpenAiResponse, OpenAiToolCall};
use crate::types::{CompletionResponse, ToolCallRequest};

/// Run the shape chain over a reply body
pub fn normalize(body: &[u8]) -> Result<CompletionResponse, serde_json::Error> {
    if let Some(response) = canonical_shape(body) {
        return Ok(response);
    }

    choices_shape(body)
}

/// Body already in canonical form
pub fn canonical_shape(body: &[u8]) -> Option<CompletionResponse> {
    serde_json::from_slice::<CompletionResponse>(body)
        .ok()
        .filter(|response| !response.role.is_empty() || response.has_tool_calls())
}

/// Body in the `OpenAI` chat completion form
pub fn choices_shape(body: &[u8]) -> Result<CompletionResponse, serde_json::Error> {
    let response: OpenAiResponse = serde_json::from_slice(body)?;

    let Some(choice) = response.choices.into_iter().next() else {
        return Ok(CompletionResponse::default());
    };

    let message = choice.message;
    Ok(CompletionResponse {
        content: message.content,
        role: message.role,
        tool_calls: message.tool_calls.into_iter().map(ToolCallRequest::from).collect(),
    })
}

impl From<OpenAiToolCall> for ToolCallRequest {
    fn from(call: OpenAiToolCall) -> Self {
        let (name, arguments) = match call.function {
            Some(function) => (function.name, function.arguments),
            None => (call.name.unwrap_or_default(), call.arguments),
        };

        Self {
            id: call.id,
            name,
            arguments: arguments.map(decode_arguments).unwrap_or_default(),
        }
    }
}

/// Arguments sent as a JSON-encoded string are decoded; anything else is kept
fn decode_arguments(arguments: serde_json::Value) -> serde_json::Value {
    match arguments {
        serde_json::Value::String(raw) => serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)),
        other => other,
    }
}
