//! Translate Anthropic Messages API requests into `OpenAI` Chat Completions requests.
//!
//! A single Anthropic message can expand into several `OpenAI` messages: every
//! `tool_result` block in a user turn becomes its own `tool`-role message, and
//! the turn's text follows them as one trailing user message. Malformed input
//! never fails translation; it degrades to the defaults documented per role.

use std::collections::HashMap;
use std::hash::BuildHasher;

use serde_json::{Number, Value};

use super::anthropic_types::{
    joined_text, ContentBlock, Message, MessageContent, MessagesRequest, Role, Tool,
};
use super::encoding::to_json_text;
use super::ids;
use super::openai_types::{
    ChatCompletionRequest, ChatFunction, ChatMessage, ChatRole, ChatTool, ChatToolCall,
    ChatToolCallFunction,
};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u64 = 1024;

/// Translate an Anthropic Messages API request into an `OpenAI` Chat Completions request.
/// Pure function: takes the request + model mapping, returns the translated request.
pub fn anthropic_to_openai<S: BuildHasher>(
    req: &MessagesRequest,
    model_map: &HashMap<String, String, S>,
) -> ChatCompletionRequest {
    let requested_model = req.model.as_deref().unwrap_or(DEFAULT_MODEL);
    let model = model_map
        .get(requested_model)
        .cloned()
        .unwrap_or_else(|| requested_model.to_string());

    let mut messages = Vec::new();

    // Top-level system prompt leads, same rules as a system-role message.
    messages.extend(translate_system(&req.system));

    if req.messages.is_empty() {
        tracing::warn!("Request has no messages");
    }

    for msg in &req.messages {
        messages.extend(translate_message(msg));
    }

    let tools = if req.tools.is_empty() {
        None
    } else {
        Some(req.tools.iter().map(translate_tool).collect())
    };

    ChatCompletionRequest {
        model,
        max_tokens: req
            .max_tokens
            .clone()
            .unwrap_or_else(|| Number::from(DEFAULT_MAX_TOKENS)),
        temperature: req.temperature,
        top_p: req.top_p,
        stream: req.stream.unwrap_or(false),
        messages,
        tools,
        stop: req.stop_sequences.clone(),
    }
}

fn translate_message(msg: &Message) -> Vec<ChatMessage> {
    match msg.role {
        Role::System => translate_system(&msg.content).into_iter().collect(),
        Role::User => translate_user_message(&msg.content),
        Role::Assistant => translate_assistant_message(&msg.content).into_iter().collect(),
        Role::Unsupported => {
            tracing::warn!("Skipping message with unsupported role");
            Vec::new()
        }
    }
}

fn translate_system(content: &MessageContent) -> Option<ChatMessage> {
    let text = match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => joined_text(blocks)?,
        MessageContent::Null | MessageContent::Other(_) => return None,
    };
    Some(ChatMessage::text(ChatRole::System, text))
}

fn translate_user_message(content: &MessageContent) -> Vec<ChatMessage> {
    let blocks = match content {
        MessageContent::Text(text) => return vec![ChatMessage::text(ChatRole::User, text.clone())],
        MessageContent::Null => return vec![ChatMessage::text(ChatRole::User, "")],
        MessageContent::Other(_) => return Vec::new(),
        MessageContent::Blocks(blocks) => blocks,
    };

    let mut messages: Vec<ChatMessage> = blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
            } => Some(ChatMessage::tool_result(
                tool_use_id.clone(),
                tool_result_to_string(content),
            )),
            ContentBlock::Text { .. } | ContentBlock::ToolUse { .. } | ContentBlock::Unsupported => {
                None
            }
        })
        .collect();

    // All text in the turn, wherever it sat, trails the tool results.
    if let Some(text) = joined_text(blocks) {
        messages.push(ChatMessage::text(ChatRole::User, text));
    }

    messages
}

fn translate_assistant_message(content: &MessageContent) -> Option<ChatMessage> {
    let blocks = match content {
        MessageContent::Text(text) => {
            return Some(ChatMessage::text(ChatRole::Assistant, text.clone()))
        }
        MessageContent::Null => return Some(ChatMessage::text(ChatRole::Assistant, "")),
        MessageContent::Other(_) => return None,
        MessageContent::Blocks(blocks) => blocks,
    };

    let text = joined_text(blocks).unwrap_or_default();

    let tool_calls: Vec<ChatToolCall> = blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } if !name.is_empty() => Some(ChatToolCall {
                id: ids::or_generate(id.as_deref(), ids::tool_call_id),
                call_type: "function".to_string(),
                function: ChatToolCallFunction {
                    name: name.clone(),
                    arguments: tool_input_to_arguments(input.as_ref()),
                },
            }),
            ContentBlock::ToolUse { .. } => {
                tracing::debug!("Dropping tool_use block without a name");
                None
            }
            ContentBlock::Text { .. } | ContentBlock::ToolResult { .. } | ContentBlock::Unsupported => {
                None
            }
        })
        .collect();

    let content = if !text.is_empty() {
        Some(text)
    } else if tool_calls.is_empty() {
        Some(String::new())
    } else {
        None
    };

    Some(ChatMessage {
        role: ChatRole::Assistant,
        content,
        tool_calls: if tool_calls.is_empty() {
            None
        } else {
            Some(tool_calls)
        },
        tool_call_id: None,
    })
}

/// Strings pass through; falsy values (`null`, `false`, `0`, `""`, `[]`, `{}`)
/// become the empty string; anything else is JSON text.
fn tool_result_to_string(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        other if is_falsy(other) => String::new(),
        other => to_json_text(other),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// A missing input is an empty argument object; a string input is assumed to
/// already be JSON text. An explicit `null` stays `null`.
fn tool_input_to_arguments(input: Option<&Value>) -> String {
    match input {
        None => "{}".to_string(),
        Some(Value::String(raw)) => raw.clone(),
        Some(value) => to_json_text(value),
    }
}

fn translate_tool(tool: &Tool) -> ChatTool {
    ChatTool {
        tool_type: "function".to_string(),
        function: ChatFunction {
            name: tool.name.clone(),
            description: tool.description.clone().unwrap_or_default(),
            parameters: tool
                .input_schema
                .clone()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn translate(body: Value) -> Value {
        let req: MessagesRequest = serde_json::from_value(body).unwrap();
        serde_json::to_value(anthropic_to_openai(&req, &HashMap::new())).unwrap()
    }

    #[test]
    fn test_simple_text_request() {
        let out = translate(json!({
            "model": "claude-sonnet-4-20250514",
            "max_tokens": 256,
            "messages": [{"role": "user", "content": "Hello!"}],
        }));

        assert_eq!(out["messages"], json!([{"role": "user", "content": "Hello!"}]));
        assert!(out.get("tools").is_none());
        assert_eq!(out["model"], "claude-sonnet-4-20250514");
        assert_eq!(out["max_tokens"], 256);
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let out = translate(json!({"messages": [{"role": "user", "content": "x"}]}));

        assert_eq!(out["model"], DEFAULT_MODEL);
        assert_eq!(out["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(out["stream"], false);
        assert!(out.get("temperature").is_none());
    }

    #[test]
    fn test_scalar_fields_copied() {
        let out = translate(json!({
            "model": "m",
            "max_tokens": 10,
            "temperature": 0.5,
            "stream": true,
            "messages": [],
        }));

        assert_eq!(out["temperature"], 0.5);
        assert_eq!(out["stream"], true);
    }

    #[test]
    fn test_wrong_typed_fields_degrade() {
        let out = translate(json!({
            "model": 12,
            "max_tokens": "many",
            "temperature": "hot",
            "messages": "not a list",
            "tools": {"name": "x"},
        }));

        assert_eq!(out["model"], DEFAULT_MODEL);
        assert_eq!(out["max_tokens"], DEFAULT_MAX_TOKENS);
        assert!(out.get("temperature").is_none());
        assert_eq!(out["messages"], json!([]));
        assert!(out.get("tools").is_none());
    }

    #[test]
    fn test_no_messages_still_valid() {
        let out = translate(json!({"model": "m", "max_tokens": 5}));
        assert_eq!(out["messages"], json!([]));
        assert_eq!(out["model"], "m");
        assert_eq!(out["max_tokens"], 5);
    }

    #[test]
    fn test_system_message_string_and_blocks() {
        let out = translate(json!({"messages": [
            {"role": "system", "content": "Be brief."},
            {"role": "system", "content": [
                {"type": "text", "text": "One"},
                {"type": "image", "source": {}},
                {"type": "text", "text": "Two"},
            ]},
            {"role": "system", "content": [{"type": "image", "source": {}}]},
            {"role": "system", "content": null},
        ]}));

        assert_eq!(
            out["messages"],
            json!([
                {"role": "system", "content": "Be brief."},
                {"role": "system", "content": "One\nTwo"},
            ])
        );
    }

    #[test]
    fn test_top_level_system_leads() {
        let out = translate(json!({
            "system": [{"type": "text", "text": "You are terse."}],
            "messages": [{"role": "user", "content": "hi"}],
        }));

        assert_eq!(
            out["messages"],
            json!([
                {"role": "system", "content": "You are terse."},
                {"role": "user", "content": "hi"},
            ])
        );
    }

    #[test]
    fn test_user_null_content_is_empty_string() {
        let out = translate(json!({"messages": [{"role": "user", "content": null}]}));
        assert_eq!(out["messages"], json!([{"role": "user", "content": ""}]));
    }

    #[test]
    fn test_tool_results_precede_text() {
        let out = translate(json!({"messages": [{"role": "user", "content": [
            {"type": "text", "text": "first"},
            {"type": "tool_result", "tool_use_id": "call_1", "content": "result 1"},
            {"type": "text", "text": "second"},
            {"type": "tool_result", "tool_use_id": "call_2", "content": "result 2"},
        ]}]}));

        assert_eq!(
            out["messages"],
            json!([
                {"role": "tool", "content": "result 1", "tool_call_id": "call_1"},
                {"role": "tool", "content": "result 2", "tool_call_id": "call_2"},
                {"role": "user", "content": "first\nsecond"},
            ])
        );
    }

    #[test]
    fn test_tool_result_content_serialization() {
        let out = translate(json!({"messages": [{"role": "user", "content": [
            {"type": "tool_result", "tool_use_id": "a", "content": [{"type": "text", "text": "x"}]},
            {"type": "tool_result", "tool_use_id": "b", "content": {"rows": 2}},
            {"type": "tool_result", "tool_use_id": "c", "content": []},
            {"type": "tool_result", "tool_use_id": "d", "content": null},
            {"type": "tool_result", "tool_use_id": "e"},
            {"type": "tool_result", "tool_use_id": "f", "content": 0},
            {"type": "tool_result", "tool_use_id": "g", "content": 3},
        ]}]}));

        let contents: Vec<&str> = out["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(
            contents,
            vec![
                r#"[{"type": "text", "text": "x"}]"#,
                r#"{"rows": 2}"#,
                "",
                "",
                "",
                "",
                "3",
            ]
        );
    }

    #[test]
    fn test_user_blocks_without_text_or_results_emit_nothing() {
        let out = translate(json!({"messages": [{"role": "user", "content": [
            {"type": "image", "source": {}},
        ]}]}));
        assert_eq!(out["messages"], json!([]));
    }

    #[test]
    fn test_assistant_tool_use_only() {
        let out = translate(json!({"messages": [{"role": "assistant", "content": [
            {"type": "tool_use", "id": "call_1", "name": "execute_sql", "input": {"sql_query": "SELECT 1"}},
        ]}]}));

        assert_eq!(
            out["messages"],
            json!([{
                "role": "assistant",
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "execute_sql", "arguments": "{\"sql_query\": \"SELECT 1\"}"},
                }],
            }])
        );
    }

    #[test]
    fn test_assistant_text_and_tools() {
        let out = translate(json!({"messages": [{"role": "assistant", "content": [
            {"type": "text", "text": "Let me look."},
            {"type": "tool_use", "id": "t1", "name": "search", "input": "{\"q\": \"rust\"}"},
            {"type": "tool_use", "id": "t2", "name": "", "input": {}},
            {"type": "tool_use", "id": "t3", "name": "noop"},
        ]}]}));

        let msg = &out["messages"][0];
        assert_eq!(msg["content"], "Let me look.");
        let calls = msg["tool_calls"].as_array().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0]["function"]["arguments"], "{\"q\": \"rust\"}");
        assert_eq!(calls[1]["id"], "t3");
        assert_eq!(calls[1]["function"]["arguments"], "{}");
    }

    #[test]
    fn test_assistant_missing_tool_id_is_generated() {
        let out = translate(json!({"messages": [{"role": "assistant", "content": [
            {"type": "tool_use", "name": "f", "input": {}},
            {"type": "tool_use", "name": "g", "input": {}},
        ]}]}));

        let calls = out["messages"][0]["tool_calls"].as_array().unwrap();
        let a = calls[0]["id"].as_str().unwrap();
        let b = calls[1]["id"].as_str().unwrap();
        assert!(a.starts_with("call_"));
        assert!(b.starts_with("call_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_assistant_empty_and_null_content() {
        let out = translate(json!({"messages": [
            {"role": "assistant", "content": null},
            {"role": "assistant", "content": []},
            {"role": "assistant", "content": [{"type": "tool_use", "name": "", "input": {}}]},
            {"role": "assistant", "content": "plain"},
        ]}));

        assert_eq!(
            out["messages"],
            json!([
                {"role": "assistant", "content": ""},
                {"role": "assistant", "content": ""},
                {"role": "assistant", "content": ""},
                {"role": "assistant", "content": "plain"},
            ])
        );
    }

    #[test]
    fn test_non_text_content_emits_nothing_for_any_role() {
        let out = translate(json!({"messages": [
            {"role": "assistant", "content": 42},
            {"role": "user", "content": 42},
            {"role": "assistant", "content": {"text": "object"}},
            {"role": "assistant", "content": true},
            {"role": "user", "content": "kept"},
        ]}));

        assert_eq!(out["messages"], json!([{"role": "user", "content": "kept"}]));
    }

    #[test]
    fn test_tool_use_input_absent_vs_null() {
        let out = translate(json!({"messages": [
            {"role": "assistant", "content": [
                {"type": "tool_use", "id": "a", "name": "f"},
                {"type": "tool_use", "id": "b", "name": "g", "input": null},
            ]},
        ]}));

        let calls = &out["messages"][0]["tool_calls"];
        assert_eq!(calls[0]["function"]["arguments"], "{}");
        assert_eq!(calls[1]["function"]["arguments"], "null");
    }

    #[test]
    fn test_max_tokens_number_is_copied_as_sent() {
        let out = translate(json!({"max_tokens": 1024.5}));
        assert_eq!(out["max_tokens"], json!(1024.5));

        let out = translate(json!({"max_tokens": -1}));
        assert_eq!(out["max_tokens"], json!(-1));

        let out = translate(json!({"max_tokens": null}));
        assert_eq!(out["max_tokens"], DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_unsupported_roles_are_skipped() {
        let out = translate(json!({"messages": [
            {"role": "developer", "content": "x"},
            {"content": "no role"},
            {"role": "user", "content": "kept"},
        ]}));
        assert_eq!(out["messages"], json!([{"role": "user", "content": "kept"}]));
    }

    #[test]
    fn test_tool_definitions() {
        let out = translate(json!({
            "messages": [],
            "tools": [
                {"name": "get_weather", "description": "Weather", "input_schema": {"type": "object"}},
                {"name": "bare"},
            ],
        }));

        assert_eq!(
            out["tools"],
            json!([
                {"type": "function", "function": {
                    "name": "get_weather", "description": "Weather", "parameters": {"type": "object"},
                }},
                {"type": "function", "function": {
                    "name": "bare", "description": "", "parameters": {},
                }},
            ])
        );
    }

    #[test]
    fn test_empty_tools_omitted() {
        let out = translate(json!({"messages": [], "tools": []}));
        assert!(out.get("tools").is_none());
    }

    #[test]
    fn test_tool_identity_round_trip() {
        let out = translate(json!({"messages": [
            {"role": "assistant", "content": [
                {"type": "tool_use", "id": "toolu_01XYZ", "name": "lookup", "input": {"k": 1}},
            ]},
            {"role": "user", "content": [
                {"type": "tool_result", "tool_use_id": "toolu_01XYZ", "content": "v"},
            ]},
        ]}));

        assert_eq!(out["messages"][0]["tool_calls"][0]["id"], "toolu_01XYZ");
        assert_eq!(out["messages"][1]["tool_call_id"], "toolu_01XYZ");
    }

    #[test]
    fn test_model_mapping() {
        let req: MessagesRequest = serde_json::from_value(json!({
            "model": "claude-sonnet-4-20250514",
            "messages": [],
        }))
        .unwrap();
        let mut model_map = HashMap::new();
        model_map.insert("claude-sonnet-4-20250514".to_string(), "gpt-4o".to_string());

        assert_eq!(anthropic_to_openai(&req, &model_map).model, "gpt-4o");
    }

    #[test]
    fn test_sampling_extras() {
        let out = translate(json!({
            "messages": [],
            "top_p": 0.9,
            "stop_sequences": ["END"],
        }));
        assert_eq!(out["top_p"], 0.9);
        assert_eq!(out["stop"], json!(["END"]));
    }
}
