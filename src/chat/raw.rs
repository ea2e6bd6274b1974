//! Raw gateway payloads in both of their wire shapes
//!
//! The gateway hands over either loose JSON (decoded straight off the
//! wire) or typed payloads it already deserialized. Both shapes must be
//! accepted without a prior schema check, so every payload is wrapped in a
//! view that resolves the shape once; field access after that point is
//! shape-agnostic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A function-call fragment: name and raw argument text, both optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawFunction {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

/// One tool-call entry as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawToolCall {
    pub id: Option<String>,
    pub index: Option<u32>,
    #[serde(rename = "type")]
    pub call_type: Option<String>,
    pub function: Option<RawFunction>,
}

/// Typed message body. Serves as both a full message and a streaming
/// delta: the wire shapes are identical, deltas just populate fewer
/// fields. Unknown keys land in `extra` for passthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawMessage {
    pub role: Option<String>,
    pub content: Option<String>,
    pub function_call: Option<RawFunction>,
    pub tool_calls: Option<Vec<RawToolCall>>,
    pub reasoning_content: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// One choice of a completion payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawChoice {
    pub index: Option<u32>,
    pub message: Option<RawMessage>,
    pub delta: Option<RawMessage>,
    pub finish_reason: Option<String>,
}

/// Typed completion envelope, shared by batch responses and stream chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CompletionPayload {
    pub id: Option<String>,
    pub model: Option<String>,
    pub created: Option<i64>,
    #[serde(default)]
    pub choices: Vec<RawChoice>,
    pub usage: Option<Value>,
}

/// One raw response or stream chunk as handed over by the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Loose JSON decoded straight off the wire
    Json(Value),
    /// A typed payload from gateways that deserialize before handing over
    Typed(CompletionPayload),
}

/// Stream chunks share the batch envelope shape
pub type RawChunk = RawResponse;

impl RawResponse {
    /// The message/delta unit of the first choice, in whichever shape the
    /// envelope carries. A `message` takes precedence over a `delta`;
    /// chunks with no choices (usage-only terminal chunks) return `None`.
    pub fn unit(&self) -> Option<RawUnit<'_>> {
        match self {
            RawResponse::Json(value) => {
                let choice = value.get("choices")?.get(0)?;
                choice
                    .get("message")
                    .filter(|unit| !unit.is_null())
                    .or_else(|| choice.get("delta").filter(|unit| !unit.is_null()))
                    .map(RawUnit::Json)
            }
            RawResponse::Typed(payload) => {
                let choice = payload.choices.first()?;
                choice
                    .message
                    .as_ref()
                    .or(choice.delta.as_ref())
                    .map(RawUnit::Typed)
            }
        }
    }

    /// The usage record, if the payload carries a truthy one. An absent,
    /// null, or empty-object usage field counts as "not reported".
    pub fn usage(&self) -> Option<&Value> {
        let usage = match self {
            RawResponse::Json(value) => value.get("usage"),
            RawResponse::Typed(payload) => payload.usage.as_ref(),
        }?;
        usage
            .as_object()
            .is_some_and(|record| !record.is_empty())
            .then_some(usage)
    }

    /// Response ID, when reported
    pub fn id(&self) -> Option<&str> {
        match self {
            RawResponse::Json(value) => value.get("id").and_then(Value::as_str),
            RawResponse::Typed(payload) => payload.id.as_deref(),
        }
    }

    /// Model name, when reported
    pub fn model(&self) -> Option<&str> {
        match self {
            RawResponse::Json(value) => value.get("model").and_then(Value::as_str),
            RawResponse::Typed(payload) => payload.model.as_deref(),
        }
    }

    /// Creation time in unix seconds, when reported
    pub fn created(&self) -> Option<i64> {
        match self {
            RawResponse::Json(value) => value.get("created").and_then(Value::as_i64),
            RawResponse::Typed(payload) => payload.created,
        }
    }

    /// Finish reason of the first choice, when reported
    pub fn finish_reason(&self) -> Option<&str> {
        match self {
            RawResponse::Json(value) => value
                .get("choices")?
                .get(0)?
                .get("finish_reason")
                .and_then(Value::as_str),
            RawResponse::Typed(payload) => payload.choices.first()?.finish_reason.as_deref(),
        }
    }
}

/// Names the normalizer extracts explicitly; everything else is
/// provider passthrough.
const KNOWN_UNIT_FIELDS: [&str; 5] = [
    "role",
    "content",
    "function_call",
    "tool_calls",
    "reasoning_content",
];

/// Borrowed view over one message or delta in either shape
#[derive(Debug, Clone, Copy)]
pub enum RawUnit<'a> {
    Json(&'a Value),
    Typed(&'a RawMessage),
}

impl<'a> RawUnit<'a> {
    /// True when a JSON-shaped unit is not an object. The one shape the
    /// normalizer refuses to interpret.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, RawUnit::Json(value) if !value.is_object())
    }

    /// Wire role string, when named
    pub fn role(&self) -> Option<&'a str> {
        match self {
            RawUnit::Json(value) => value.get("role").and_then(Value::as_str),
            RawUnit::Typed(message) => message.role.as_deref(),
        }
    }

    /// Text content, when present
    pub fn content(&self) -> Option<&'a str> {
        match self {
            RawUnit::Json(value) => value.get("content").and_then(Value::as_str),
            RawUnit::Typed(message) => message.content.as_deref(),
        }
    }

    /// Legacy function-call fragment as a JSON value, when present
    pub fn function_call(&self) -> Option<Value> {
        match self {
            RawUnit::Json(value) => value
                .get("function_call")
                .filter(|call| !call.is_null())
                .cloned(),
            RawUnit::Typed(message) => message
                .function_call
                .as_ref()
                .and_then(|call| serde_json::to_value(call).ok()),
        }
    }

    /// Tool-call entries in payload order, `None` when the field is
    /// absent or null
    pub fn tool_calls(&self) -> Option<Vec<RawToolCallView<'a>>> {
        match self {
            RawUnit::Json(value) => {
                let entries = value.get("tool_calls")?.as_array()?;
                Some(entries.iter().map(RawToolCallView::Json).collect())
            }
            RawUnit::Typed(message) => {
                let entries = message.tool_calls.as_ref()?;
                Some(entries.iter().map(RawToolCallView::Typed).collect())
            }
        }
    }

    /// Reasoning/thinking content, when present
    pub fn reasoning_content(&self) -> Option<&'a str> {
        match self {
            RawUnit::Json(value) => value.get("reasoning_content").and_then(Value::as_str),
            RawUnit::Typed(message) => message.reasoning_content.as_deref(),
        }
    }

    /// Provider passthrough fields: everything the normalizer does not
    /// extract explicitly, minus nulls.
    pub fn extra_fields(&self) -> HashMap<String, Value> {
        match self {
            RawUnit::Json(value) => value
                .as_object()
                .map(|record| {
                    record
                        .iter()
                        .filter(|(key, field)| {
                            !KNOWN_UNIT_FIELDS.contains(&key.as_str()) && !field.is_null()
                        })
                        .map(|(key, field)| (key.clone(), field.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            RawUnit::Typed(message) => message
                .extra
                .iter()
                .filter(|(_, field)| !field.is_null())
                .map(|(key, field)| (key.clone(), field.clone()))
                .collect(),
        }
    }
}

/// Borrowed view over one tool-call entry in either shape
#[derive(Debug, Clone, Copy)]
pub enum RawToolCallView<'a> {
    Json(&'a Value),
    Typed(&'a RawToolCall),
}

impl RawToolCallView<'_> {
    /// Call ID, when present
    pub fn id(&self) -> Option<String> {
        match self {
            RawToolCallView::Json(entry) => entry
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string),
            RawToolCallView::Typed(entry) => entry.id.clone(),
        }
    }

    /// Position of the logical call, when present and non-negative
    pub fn index(&self) -> Option<u32> {
        match self {
            RawToolCallView::Json(entry) => entry
                .get("index")
                .and_then(Value::as_u64)
                .map(|index| index as u32),
            RawToolCallView::Typed(entry) => entry.index,
        }
    }

    /// Tool name from the nested function structure, when reachable
    pub fn name(&self) -> Option<String> {
        match self {
            RawToolCallView::Json(entry) => entry
                .get("function")
                .and_then(|function| function.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            RawToolCallView::Typed(entry) => {
                entry.function.as_ref().and_then(|function| function.name.clone())
            }
        }
    }

    /// Raw argument text from the nested function structure, when
    /// reachable
    pub fn args(&self) -> Option<String> {
        match self {
            RawToolCallView::Json(entry) => entry
                .get("function")
                .and_then(|function| function.get("arguments"))
                .and_then(Value::as_str)
                .map(str::to_string),
            RawToolCallView::Typed(entry) => entry
                .function
                .as_ref()
                .and_then(|function| function.arguments.clone()),
        }
    }

    /// True when the nested function structure is entirely missing.
    /// Such an entry still yields a placeholder fragment.
    pub fn function_missing(&self) -> bool {
        match self {
            RawToolCallView::Json(entry) => {
                !entry.get("function").is_some_and(Value::is_object)
            }
            RawToolCallView::Typed(entry) => entry.function.is_none(),
        }
    }
}
