//! Type definitions for the [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat).
//!
//! Request types are only ever built by us and serialized. Response types are
//! only ever parsed, and parse permissively: any JSON object deserializes into
//! a [`ChatCompletionResponse`], with wrong-typed fields reading as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::lenient::{lenient, lenient_object, objects, positional};

// ---------------------------------------------------------------------------
// Request types (what we send TO the backend)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub max_tokens: Number,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub stream: bool,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn text(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTool {
    #[serde(rename = "type")]
    pub tool_type: String, // always "function"
    pub function: ChatFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String, // "function"
    pub function: ChatToolCallFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatToolCallFunction {
    pub name: String,
    pub arguments: String,
}

// ---------------------------------------------------------------------------
// Response types (what we receive FROM the backend)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "positional")]
    pub choices: Vec<Choice>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub usage: ChatUsage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "lenient_object")]
    pub message: ChoiceMessage,
    /// `Some("")` when the field is absent, `None` when it is `null`.
    #[serde(default = "absent_finish_reason", deserialize_with = "lenient")]
    pub finish_reason: Option<String>,
}

fn absent_finish_reason() -> Option<String> {
    Some(String::new())
}

/// Same as parsing `{}`: no message and an absent finish_reason.
impl Default for Choice {
    fn default() -> Self {
        Self {
            message: ChoiceMessage::default(),
            finish_reason: absent_finish_reason(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "objects")]
    pub tool_calls: Vec<ResponseToolCall>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseToolCall {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    /// `None` when missing or not an object.
    #[serde(default, deserialize_with = "lenient_object")]
    pub function: Option<ResponseFunction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseFunction {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ChatUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub prompt_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub completion_tokens: u64,
}
