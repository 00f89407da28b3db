//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};

use super::null_as_default;

// -- Request types --

/// Messages API request
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Maximum tokens to generate (required by the API)
    pub max_tokens: u32,
    /// Top-level system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation messages
    pub messages: Vec<AnthropicMessage>,
    /// Whether to stream the response
    pub stream: bool,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tool definitions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<AnthropicTool>,
}

/// Request message
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: AnthropicContent,
}

/// Message content: plain text, or blocks when tools are involved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    Text(String),
    Blocks(Vec<AnthropicContentBlock>),
}

/// Content block in a request message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

/// Tool definition
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicTool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool input
    pub input_schema: serde_json::Value,
}

// -- Response types --

/// Messages API response
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    /// Object type (always "message")
    #[serde(rename = "type", default)]
    pub response_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<AnthropicResponseBlock>,
}

/// Content block in a response
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    /// Text response
    Text {
        #[serde(default)]
        text: String,
    },
    /// Tool use request
    ToolUse {
        #[serde(default)]
        id: String,
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    /// Block types without a canonical counterpart (e.g. thinking)
    #[serde(other)]
    Other,
}

// -- Streaming types --

/// Server-sent event payload
///
/// Only `content_block_delta` carries generated text; the other event
/// types decode into the same struct and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicStreamEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub delta: Option<AnthropicStreamDelta>,
}

/// Delta payload of a stream event
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicStreamDelta {
    #[serde(default)]
    pub text: Option<String>,
}
