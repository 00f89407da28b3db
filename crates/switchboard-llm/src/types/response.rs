use serde::{Deserialize, Serialize};

use super::ToolCallRequest;
use crate::protocol::null_as_default;

/// Normalized result of a non-streaming call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Author role; empty when the reply could not be interpreted
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    /// Tool invocations requested by the model
    #[serde(
        default,
        alias = "toolCalls",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl CompletionResponse {
    /// Plain assistant text reply
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: "assistant".to_owned(),
            tool_calls: Vec::new(),
        }
    }

    /// Raw passthrough of a body no known shape could interpret
    pub fn raw(body: &[u8]) -> Self {
        Self {
            content: String::from_utf8_lossy(body).into_owned(),
            ..Self::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
