//! `OpenAI` chat completion wire format, shared by every compatible vendor

use serde::{Deserialize, Serialize};

use super::null_as_default;

// -- Request types --

/// Chat completion request
///
/// Exactly one of `max_tokens` and `max_completion_tokens` is set, and only
/// one of `reasoning_effort` and `reasoning`, depending on the vendor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation messages
    pub messages: Vec<OpenAiMessage>,
    /// Whether to stream the response
    pub stream: bool,
    /// Token limit under its legacy name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Token limit under its current name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Flat reasoning effort hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
    /// Nested reasoning configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<OpenAiReasoning>,
    /// Tool definitions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OpenAiTool>,
}

/// Request message
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: String,
    /// Calls made by an assistant turn
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<OpenAiRequestToolCall>,
    /// Call a tool turn answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Tool call echoed back in conversation history
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequestToolCall {
    pub id: String,
    /// Always "function"
    #[serde(rename = "type")]
    pub call_type: &'static str,
    pub function: OpenAiFunctionArguments,
}

/// Function name and JSON-encoded arguments
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiFunctionArguments {
    pub name: String,
    pub arguments: String,
}

/// Nested reasoning object (`{"effort": "high"}`)
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiReasoning {
    pub effort: String,
}

/// Tool definition
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiTool {
    /// Always "function"
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: OpenAiFunction,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiFunction {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

// -- Response types --

/// Non-streaming chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<OpenAiChoice>,
}

/// A single completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: OpenAiResponseMessage,
}

/// Assistant message inside a choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiResponseMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<OpenAiToolCall>,
}

/// Tool call in a response
///
/// Accepts both the nested `{"function": {"name", "arguments"}}` layout and
/// a flat `{"name", "arguments"}` layout.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiToolCall {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
    #[serde(default)]
    pub function: Option<OpenAiFunctionCall>,
}

/// Nested function call details
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiFunctionCall {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
}

// -- Streaming types --

/// Streaming chunk
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiStreamChunk {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<OpenAiStreamChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiStreamChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub delta: OpenAiStreamDelta,
}

/// Incremental content
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiStreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}
