//! Normalization of raw message/delta units
//!
//! Pure transformation from one raw unit (full message or streaming
//! delta, either wire shape) into a canonical [`MessageChunk`]. Usage
//! metadata is attached later by the assembler, never here.

use crate::chat::messages::{MessageChunk, MessageRole, ToolCallChunk};
use crate::chat::raw::RawUnit;
use crate::error::{BridgeError, BridgeResult};
use serde_json::Value;
use tracing::warn;

/// Normalize one raw unit into a canonical message chunk.
///
/// Missing optional fields degrade to defaults: an absent role becomes
/// `Assistant`, absent content becomes the empty string, and an absent
/// tool-call list becomes an empty one. The single loud failure is a
/// JSON unit that is not an object: that means the gateway changed its
/// output shape and the payload cannot be interpreted safely.
pub fn chunk_from_unit(unit: RawUnit<'_>) -> BridgeResult<MessageChunk> {
    if unit.is_unreadable() {
        return Err(BridgeError::malformed(
            "message payload is not a JSON object",
        ));
    }

    let role = unit
        .role()
        .map(MessageRole::from_wire)
        .unwrap_or(MessageRole::Assistant);
    let content = unit.content().unwrap_or_default().to_string();

    let mut additional = unit.extra_fields();
    if let Some(function_call) = unit.function_call() {
        additional.insert("function_call".to_string(), function_call);
    }
    if let Some(reasoning) = unit.reasoning_content() {
        // Only set when non-empty, so downstream merging never overwrites
        // accumulated reasoning with an empty value.
        if !reasoning.is_empty() {
            additional.insert(
                "reasoning_content".to_string(),
                Value::String(reasoning.to_string()),
            );
        }
    }

    let mut tool_call_chunks = Vec::new();
    if let Some(entries) = unit.tool_calls() {
        for entry in entries {
            if entry.function_missing() {
                warn!("tool call entry without a function payload, keeping a placeholder fragment");
            }
            tool_call_chunks.push(ToolCallChunk {
                name: entry.name(),
                args: entry.args(),
                id: entry.id(),
                index: entry.index(),
            });
        }
    }

    Ok(MessageChunk {
        role,
        content,
        additional,
        tool_call_chunks,
        usage_metadata: None,
    })
}

/// Normalize a loose-JSON message or delta
pub fn chunk_from_value(value: &Value) -> BridgeResult<MessageChunk> {
    chunk_from_unit(RawUnit::Json(value))
}
