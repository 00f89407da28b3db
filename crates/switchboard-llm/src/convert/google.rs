//! Canonical types to and from the Gemini `generateContent` format

use serde_json::{Value, json};

use crate::error::LlmError;
use crate::protocol::google::{
    GeminiContent, GeminiFunctionDeclaration, GeminiGenerationConfig, GeminiParameters, GeminiPart,
    GeminiProperty, GeminiRequest, GeminiResponse, GeminiTool,
};
use crate::types::{CompletionResponse, Message, Options, Role, Tool, ToolCallRequest};

/// Finish and block reasons that mean the vendor refused the content
const BLOCKING_REASONS: &[&str] = &["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

/// Whether a finish or block reason signals a refusal
pub fn is_blocking_reason(reason: &str) -> bool {
    BLOCKING_REASONS.contains(&reason)
}

// -- Outbound: canonical messages -> Gemini request --

/// Build a `generateContent` request body
///
/// System messages become parts of the system instruction, in order, so a
/// leading system message always comes first.
/// Assistant turns use the `model` role. Tool results become
/// `functionResponse` parts addressed to the most recent function call in
/// the conversation.
pub fn build_request(messages: &[Message], options: &Options) -> GeminiRequest {
    let mut system_instruction: Option<GeminiContent> = None;
    let mut contents: Vec<GeminiContent> = Vec::new();

    for message in messages {
        match message.role {
            Role::System => {
                system_instruction
                    .get_or_insert_with(|| GeminiContent {
                        role: None,
                        parts: Vec::new(),
                    })
                    .parts
                    .push(GeminiPart::text(&message.content));
            }
            Role::Tool => {
                let name = last_function_call_name(&contents).unwrap_or_default();
                contents.push(GeminiContent {
                    role: Some("function".to_owned()),
                    parts: vec![GeminiPart::function_response(name, tool_result(&message.content))],
                });
            }
            Role::User | Role::Assistant => {
                let role = if message.role == Role::Assistant { "model" } else { "user" };

                let mut parts = Vec::with_capacity(1 + message.tool_calls.len());
                if !message.content.is_empty() {
                    parts.push(GeminiPart::text(&message.content));
                }
                parts.extend(message.tool_calls.iter().map(|call| {
                    GeminiPart::function_call(&call.name, Value::Object(call.arguments_object().unwrap_or_default()))
                }));

                if !parts.is_empty() {
                    contents.push(GeminiContent {
                        role: Some(role.to_owned()),
                        parts,
                    });
                }
            }
        }
    }

    let generation_config = (options.temperature.is_some() || options.max_completion_tokens().is_some()).then(|| {
        GeminiGenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_completion_tokens(),
        }
    });

    let tools = if options.tools.is_empty() {
        Vec::new()
    } else {
        vec![GeminiTool {
            function_declarations: options
                .tools
                .iter()
                .map(|(name, tool)| function_declaration(name, tool))
                .collect(),
        }]
    };

    GeminiRequest {
        contents,
        system_instruction,
        generation_config,
        tools,
    }
}

/// Name of the first call in the latest content that made one
///
/// A turn with several calls always resolves to its first call.
fn last_function_call_name(contents: &[GeminiContent]) -> Option<String> {
    contents
        .iter()
        .rev()
        .find_map(|content| content.parts.iter().find_map(|part| part.function_call.as_ref()))
        .map(|call| call.name.clone())
}

/// JSON object results pass through; anything else is wrapped
fn tool_result(content: &str) -> Value {
    match serde_json::from_str::<Value>(content) {
        Ok(value @ Value::Object(_)) => value,
        _ => json!({ "result": content }),
    }
}

fn function_declaration(name: &str, tool: &Tool) -> GeminiFunctionDeclaration {
    let parameters = (!tool.input_schema.is_empty()).then(|| GeminiParameters {
        schema_type: "object",
        properties: tool
            .input_schema
            .iter()
            .map(|(name, property)| {
                (
                    name.clone(),
                    GeminiProperty {
                        property_type: property.kind.clone(),
                        description: property.description.clone(),
                    },
                )
            })
            .collect(),
        required: tool.required_properties(),
    });

    GeminiFunctionDeclaration {
        name: name.to_owned(),
        description: tool.description.clone(),
        parameters,
    }
}

// -- Inbound: Gemini response -> canonical --

/// Refusal reason carried by a response or stream frame, if any
///
/// Prompt-level feedback is checked before the first candidate.
pub fn blocked_reason(response: &GeminiResponse) -> Option<&str> {
    let prompt = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
        .filter(|reason| !reason.is_empty());

    prompt.or_else(|| {
        response
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
            .filter(|reason| is_blocking_reason(reason))
    })
}

/// Interpret a decoded non-streaming response
///
/// Fails when the content was refused, when there is no candidate, or when
/// the first candidate has neither text nor function calls.
pub fn into_completion(response: GeminiResponse) -> Result<CompletionResponse, LlmError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(LlmError::MalformedResponse("response contained no candidates".to_owned()));
    };

    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for (index, part) in candidate.content.parts.into_iter().enumerate() {
        if let Some(text) = part.text {
            content.push_str(&text);
        }
        if let Some(call) = part.function_call {
            tool_calls.push(ToolCallRequest::new(format!("call_{index}"), call.name, call.args));
        }
    }

    if content.is_empty() && tool_calls.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_default();
        return Err(LlmError::MalformedResponse(format!(
            "response contained no text (finish reason: {reason})"
        )));
    }

    Ok(CompletionResponse {
        content,
        role: "assistant".to_owned(),
        tool_calls,
    })
}
