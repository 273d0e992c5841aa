//! Translate `OpenAI` Chat Completion responses back into Anthropic Messages responses.
//!
//! Only `choices[0]` is read. Its text becomes a leading `text` block and each
//! usable tool call a `tool_use` block; entries that cannot be used are skipped
//! rather than failing the response. A document with no choices at all is not
//! a completion and is returned as-is.

use serde::Deserialize;
use serde_json::{json, Value};

use super::anthropic_types::{MessagesResponse, ResponseContentBlock, TranslatedResponse, Usage};
use super::ids;
use super::openai_types::{ChatCompletionResponse, ResponseFunction, ResponseToolCall};

/// Translate an `OpenAI` Chat Completion document into an Anthropic Messages response.
///
/// Only the first choice is consulted. A document without any usable choice is
/// handed back untouched as [`TranslatedResponse::Passthrough`].
pub fn openai_to_anthropic(doc: Value) -> TranslatedResponse {
    let resp: ChatCompletionResponse = if doc.is_object() {
        ChatCompletionResponse::deserialize(&doc).unwrap_or_default()
    } else {
        ChatCompletionResponse::default()
    };

    let Some(choice) = resp.choices.first() else {
        return TranslatedResponse::Passthrough(doc);
    };

    let mut content: Vec<ResponseContentBlock> = Vec::new();

    if let Some(text) = choice.message.content.as_deref() {
        if !text.is_empty() {
            content.push(ResponseContentBlock::Text {
                text: text.to_string(),
            });
        }
    }

    content.extend(choice.message.tool_calls.iter().filter_map(translate_tool_call));

    // Clients expect a non-empty content array
    if content.is_empty() {
        content.push(ResponseContentBlock::Text {
            text: String::new(),
        });
    }

    let stop_reason = choice.finish_reason.as_deref().map(map_finish_reason);

    TranslatedResponse::Message(MessagesResponse {
        id: ids::or_generate(resp.id.as_deref(), ids::message_id),
        response_type: "message".to_string(),
        role: "assistant".to_string(),
        content,
        model: resp.model.clone().unwrap_or_default(),
        stop_reason,
        stop_sequence: None,
        usage: Usage {
            input_tokens: resp.usage.prompt_tokens,
            output_tokens: resp.usage.completion_tokens,
        },
    })
}

fn translate_tool_call(call: &ResponseToolCall) -> Option<ResponseContentBlock> {
    let Some(ResponseFunction { name, arguments }) = call.function.as_ref() else {
        tracing::debug!("Skipping tool call without a function object");
        return None;
    };
    if name.is_empty() {
        tracing::debug!("Skipping tool call without a function name");
        return None;
    }

    Some(ResponseContentBlock::ToolUse {
        id: ids::or_generate(call.id.as_deref(), ids::tool_call_id),
        name: name.clone(),
        input: parse_arguments(arguments.as_ref()),
    })
}

/// Decode `function.arguments` into a tool input object.
///
/// Objects are used as-is and absent arguments mean `{}`. Strings are parsed as
/// JSON, whatever value that yields; when parsing fails, or the arguments have
/// any other type, the raw value is wrapped as `{"text": ...}`.
pub fn parse_arguments(arguments: Option<&Value>) -> Value {
    match arguments {
        None | Some(Value::Null) => json!({}),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => parsed,
            Err(_) => json!({ "text": raw }),
        },
        Some(other) => json!({ "text": other.to_string() }),
    }
}

/// Map an `OpenAI` finish_reason to an Anthropic stop_reason. Only tool calls
/// are renamed; everything else passes through.
pub fn map_finish_reason(reason: &str) -> String {
    match reason {
        "tool_calls" => "tool_use".to_string(),
        other => other.to_string(),
    }
}
