//! Canonical chat message types
//!
//! The output side of normalization: one shape-stable chunk type regardless
//! of which provider the gateway routed to, plus the outbound message type
//! serialized into gateway requests.

use crate::types::TokenUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Role of a message in the conversation
///
/// Roles outside the canonical set are preserved verbatim in `Other` so a
/// provider-specific role survives the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageRole {
    /// System message (instructions)
    System,
    /// User message (human input)
    User,
    /// Assistant message (model response)
    Assistant,
    /// Legacy function-result message
    Function,
    /// Tool message (tool execution result)
    Tool,
    /// Provider-specific role, preserved verbatim
    Other(String),
}

impl MessageRole {
    /// Map a wire role string onto the canonical set
    pub fn from_wire(name: &str) -> Self {
        match name {
            "system" => MessageRole::System,
            "user" => MessageRole::User,
            "assistant" => MessageRole::Assistant,
            "function" => MessageRole::Function,
            "tool" => MessageRole::Tool,
            other => MessageRole::Other(other.to_string()),
        }
    }

    /// Get the wire representation of this role
    pub fn as_wire(&self) -> &str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Function => "function",
            MessageRole::Tool => "tool",
            MessageRole::Other(name) => name,
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

impl From<String> for MessageRole {
    fn from(name: String) -> Self {
        MessageRole::from_wire(&name)
    }
}

impl From<MessageRole> for String {
    fn from(role: MessageRole) -> Self {
        role.as_wire().to_string()
    }
}

/// One fragment of a tool call as it arrives in a stream.
///
/// `args` is raw JSON-fragment text, never parsed here. `index` is the join
/// key: fragments sharing an index belong to the same logical call and are
/// concatenated in arrival order by the collection step, not by the
/// normalizer or assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ToolCallChunk {
    /// Tool name, usually only on the first fragment of a call
    pub name: Option<String>,
    /// JSON-fragment text of the arguments
    pub args: Option<String>,
    /// Call ID, usually only on the first fragment of a call
    pub id: Option<String>,
    /// Position of the logical call this fragment belongs to
    pub index: Option<u32>,
}

/// A completed tool call, produced by the collection step once all
/// fragments of one index have been joined and the argument text parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID (generated when the provider never supplied one)
    pub id: String,
    /// Tool name
    pub name: String,
    /// Parsed arguments; kept as a JSON string when the joined fragment
    /// text is not valid JSON
    pub arguments: Value,
}

/// Canonical message chunk: the normalized form of one raw unit.
///
/// Used for both streaming deltas and batch messages; a batch message is
/// just a chunk whose fields happen to be complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageChunk {
    /// Message role, `Assistant` when the raw unit named none
    pub role: MessageRole,
    /// Text content, empty when absent
    pub content: String,
    /// Provider passthrough fields (`reasoning_content`, legacy
    /// `function_call`, and anything else the provider attached)
    #[serde(default)]
    pub additional: HashMap<String, Value>,
    /// Tool-call fragments in payload order
    #[serde(default)]
    pub tool_call_chunks: Vec<ToolCallChunk>,
    /// Usage metadata, present only on units whose raw payload carried it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<TokenUsage>,
}

impl Default for MessageChunk {
    fn default() -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            additional: HashMap::new(),
            tool_call_chunks: Vec::new(),
            usage_metadata: None,
        }
    }
}

impl MessageChunk {
    /// Check if this chunk carries any tool-call fragments
    pub fn has_tool_call_chunks(&self) -> bool {
        !self.tool_call_chunks.is_empty()
    }
}

/// A fully assembled batch response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The normalized message (usage rides on `message.usage_metadata`)
    pub message: MessageChunk,
    /// Model that produced the response
    pub model: Option<String>,
    /// Response ID from the provider
    pub id: Option<String>,
    /// Creation timestamp, when the provider reported one
    pub created: Option<DateTime<Utc>>,
    /// Finish reason of the first choice
    pub finish_reason: Option<String>,
}

/// An outbound message in the conversation, serialized into gateway
/// requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
    /// Tool call ID (for tool messages)
    pub tool_call_id: Option<String>,
    /// Name (for function/tool messages)
    pub name: Option<String>,
    /// Extra fields carried onto the wire verbatim (tool calls for
    /// assistant history, provider-specific keys)
    #[serde(default)]
    pub additional: HashMap<String, Value>,
}

impl ChatMessage {
    /// Create a new system message
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_call_id: None,
            name: None,
            additional: HashMap::new(),
        }
    }

    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_call_id: None,
            name: None,
            additional: HashMap::new(),
        }
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
            name: None,
            additional: HashMap::new(),
        }
    }

    /// Create a new tool message
    pub fn tool<S: Into<String>>(content: S, tool_call_id: S) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            name: None,
            additional: HashMap::new(),
        }
    }

    /// Attach an extra wire field
    pub fn with_additional<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.additional.insert(key.into(), value.into());
        self
    }

    /// Serialize to the gateway wire shape
    pub fn to_wire(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert("role".to_string(), Value::String(self.role.as_wire().to_string()));
        body.insert("content".to_string(), Value::String(self.content.clone()));
        if let Some(tool_call_id) = &self.tool_call_id {
            body.insert("tool_call_id".to_string(), Value::String(tool_call_id.clone()));
        }
        if let Some(name) = &self.name {
            body.insert("name".to_string(), Value::String(name.clone()));
        }
        for (key, value) in &self.additional {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}
