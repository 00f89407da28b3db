//! Canonical types to and from the Anthropic Messages format

use serde_json::Value;

use super::PendingCalls;
use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse,
    AnthropicResponseBlock, AnthropicTool,
};
use crate::types::{CompletionResponse, Message, Options, Role, ToolCallRequest};

/// Token limit sent when the caller sets none; the API requires one
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Build a Messages API request body
///
/// A leading system message moves to the top-level `system` field. Any
/// later system message is passed through in sequence.
pub fn build_request(messages: &[Message], stream: bool, options: &Options) -> AnthropicRequest {
    let (system, rest) = match messages.split_first() {
        Some((first, rest)) if first.role == Role::System => (Some(first.content.clone()), rest),
        _ => (None, messages),
    };

    if options.reasoning_effort().is_some() {
        tracing::debug!("anthropic does not accept a reasoning effort; ignoring it");
    }

    AnthropicRequest {
        model: options.model().map(str::to_owned),
        max_tokens: options.max_completion_tokens().unwrap_or(DEFAULT_MAX_TOKENS),
        system,
        messages: history(rest),
        stream,
        temperature: options.temperature,
        tools: options
            .tools
            .iter()
            .map(|(name, tool)| AnthropicTool {
                name: name.clone(),
                description: Some(tool.description.clone()).filter(|d| !d.is_empty()),
                input_schema: tool.parameters_schema(),
            })
            .collect(),
    }
}

/// Messages in order; tool traffic becomes `tool_use` and `tool_result` blocks
fn history(messages: &[Message]) -> Vec<AnthropicMessage> {
    let mut pending = PendingCalls::default();

    messages
        .iter()
        .map(|message| {
            // tool results travel as user turns
            let role = match message.role {
                Role::Tool => Role::User,
                role => role,
            };

            AnthropicMessage {
                role: role.as_str().to_owned(),
                content: content(message, pending.observe(message)),
            }
        })
        .collect()
}

fn content(message: &Message, answers: Option<&ToolCallRequest>) -> AnthropicContent {
    if let Some(call) = answers {
        return AnthropicContent::Blocks(vec![AnthropicContentBlock::ToolResult {
            tool_use_id: call.id.clone(),
            content: message.content.clone(),
        }]);
    }

    if message.tool_calls.is_empty() {
        return AnthropicContent::Text(message.content.clone());
    }

    let text = (!message.content.is_empty()).then(|| AnthropicContentBlock::Text {
        text: message.content.clone(),
    });
    let calls = message.tool_calls.iter().map(|call| AnthropicContentBlock::ToolUse {
        id: call.id.clone(),
        name: call.name.clone(),
        input: Value::Object(call.arguments_object().unwrap_or_default()),
    });

    AnthropicContent::Blocks(text.into_iter().chain(calls).collect())
}

impl From<AnthropicResponse> for CompletionResponse {
    fn from(response: AnthropicResponse) -> Self {
        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                AnthropicResponseBlock::Text { text } => content.push_str(&text),
                AnthropicResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCallRequest::new(id, name, input));
                }
                AnthropicResponseBlock::Other => {}
            }
        }

        Self {
            content,
            role: response.role,
            tool_calls,
        }
    }
}

/// Body in the Messages API response form
pub fn messages_shape(body: &[u8]) -> Option<CompletionResponse> {
    serde_json::from_slice::<AnthropicResponse>(body)
        .ok()
        .filter(|response| response.response_type == "message")
        .map(CompletionResponse::from)
}
