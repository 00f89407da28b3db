//! Canonical types to the `OpenAI` chat completion format
//!
//! Compatible vendors differ only in a handful of fields; the differences
//! are described by a [`CompatProfile`].

use super::PendingCalls;
use crate::protocol::openai::{
    OpenAiFunction, OpenAiFunctionArguments, OpenAiMessage, OpenAiReasoning, OpenAiRequest, OpenAiRequestToolCall,
    OpenAiTool,
};
use crate::provider::openai::{CompatProfile, ReasoningStyle, TokenLimitField};
use crate::types::{Message, Options, Tool, ToolCallRequest};

/// Build a chat completion request body for a compatible vendor
pub fn build_request(profile: &CompatProfile, messages: &[Message], stream: bool, options: &Options) -> OpenAiRequest {
    let limit = options.max_completion_tokens();
    let effort = options.reasoning_effort().map(str::to_owned);

    let (reasoning_effort, reasoning) = match profile.reasoning {
        ReasoningStyle::Unsupported => (None, None),
        ReasoningStyle::Flat => (effort, None),
        ReasoningStyle::Nested => (None, effort.map(|effort| OpenAiReasoning { effort })),
    };

    OpenAiRequest {
        model: options.model().map(str::to_owned),
        messages: history(messages),
        stream,
        max_tokens: limit.filter(|_| profile.token_limit == TokenLimitField::MaxTokens),
        max_completion_tokens: limit.filter(|_| profile.token_limit == TokenLimitField::MaxCompletionTokens),
        temperature: options.temperature.filter(|_| profile.temperature),
        reasoning_effort,
        reasoning,
        tools: options
            .tools
            .iter()
            .map(|(name, tool)| function_tool(name, tool))
            .collect(),
    }
}

/// Messages in order, with tool calls and the ids their results answer
fn history(messages: &[Message]) -> Vec<OpenAiMessage> {
    let mut pending = PendingCalls::default();

    messages
        .iter()
        .map(|message| OpenAiMessage {
            role: message.role.as_str().to_owned(),
            content: message.content.clone(),
            tool_calls: message.tool_calls.iter().map(OpenAiRequestToolCall::from).collect(),
            tool_call_id: pending.observe(message).map(|call| call.id.clone()),
        })
        .collect()
}

impl From<&ToolCallRequest> for OpenAiRequestToolCall {
    fn from(call: &ToolCallRequest) -> Self {
        Self {
            id: call.id.clone(),
            call_type: "function",
            function: OpenAiFunctionArguments {
                name: call.name.clone(),
                arguments: call.arguments_json(),
            },
        }
    }
}

fn function_tool(name: &str, tool: &Tool) -> OpenAiTool {
    OpenAiTool {
        tool_type: "function",
        function: OpenAiFunction {
            name: name.to_owned(),
            description: Some(tool.description.clone()).filter(|d| !d.is_empty()),
            parameters: tool.parameters_schema(),
        },
    }
}
