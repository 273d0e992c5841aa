use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use super::lenient::{lenient, objects};

// ---------------------------------------------------------------------------
// Request types (what the client sends TO us)
// ---------------------------------------------------------------------------

/// A Messages API request. Every field is optional on the wire; defaults are
/// applied during translation, not here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    /// Any JSON number is forwarded as sent.
    #[serde(default, deserialize_with = "lenient")]
    pub max_tokens: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub top_p: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub stream: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(default)]
    pub system: MessageContent,
    #[serde(default, deserialize_with = "objects")]
    pub messages: Vec<Message>,
    #[serde(default, deserialize_with = "objects")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient")]
    pub role: Role,
    #[serde(default)]
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[default]
    #[serde(other)]
    Unsupported,
}

/// Message content as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MessageContent {
    /// Absent or `null`.
    #[default]
    Null,
    Text(String),
    Blocks(Vec<ContentBlock>),
    /// Any other JSON type; carries no content.
    Other(Value),
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Self::Null,
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::Blocks(
                items
                    .into_iter()
                    .filter(Value::is_object)
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            ),
            other => Self::Other(other),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default, deserialize_with = "lenient")]
        text: String,
    },
    ToolUse {
        #[serde(default, deserialize_with = "lenient")]
        id: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        name: String,
        /// `None` only when the key is absent; an explicit `null` is kept.
        #[serde(default, deserialize_with = "present")]
        input: Option<Value>,
    },
    ToolResult {
        #[serde(default, deserialize_with = "lenient")]
        tool_use_id: String,
        #[serde(default)]
        content: Value,
    },
    /// Images, thinking, documents and anything newer. Ignored by translation.
    #[serde(other)]
    Unsupported,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tool {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Option<Value>,
}

// ---------------------------------------------------------------------------
// Response types (what we send BACK to the client)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub response_type: String, // "message"
    pub role: String, // "assistant"
    pub content: Vec<ResponseContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Outcome of response translation. Serializes as whichever document it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranslatedResponse {
    Message(MessagesResponse),
    /// A backend document without choices, returned untouched.
    Passthrough(Value),
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
                error_type: error_type.to_string(),
            },
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new("invalid_request_error", msg)
    }

    pub fn proxy_error(msg: impl Into<String>) -> Self {
        Self::new("proxy_error", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new("not_found_error", msg)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ContentBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Newline-joined text of every `text` block, or `None` if there are none.
pub fn joined_text(blocks: &[ContentBlock]) -> Option<String> {
    let parts: Vec<&str> = blocks.iter().filter_map(ContentBlock::as_text).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
