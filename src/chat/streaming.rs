//! Streaming types and downstream collection
//!
//! The assembler emits canonical chunks one at a time and never
//! accumulates. Collection (concatenating content, joining tool-call
//! fragments by index, resolving final usage) is the consumer's step,
//! provided here as utilities over either a sync iterator or an async
//! stream.

use crate::chat::messages::{MessageChunk, MessageRole, ToolCall};
use crate::chat::raw::RawChunk;
use crate::error::BridgeResult;
use crate::types::TokenUsage;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::pin::Pin;
use uuid::Uuid;

/// Stream of raw chunks as produced by the gateway. Finite, one-shot,
/// never restartable.
pub type RawStream = Pin<Box<dyn Stream<Item = BridgeResult<RawChunk>> + Send>>;

/// Stream of canonical message chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = BridgeResult<MessageChunk>> + Send>>;

/// A fully collected streamed message
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedMessage {
    /// Role of the first chunk
    pub role: MessageRole,
    /// Content of every chunk, concatenated in arrival order
    pub content: String,
    /// Completed tool calls, joined by fragment index
    pub tool_calls: Vec<ToolCall>,
    /// Merged passthrough fields (strings concatenate, anything else
    /// last-write-wins)
    pub additional: HashMap<String, Value>,
    /// Usage of the last usage-bearing chunk
    pub usage: Option<TokenUsage>,
}

/// Collect an async chunk stream into one message
pub async fn collect_stream(mut stream: ChunkStream) -> BridgeResult<CollectedMessage> {
    let mut accumulator = ChunkAccumulator::new();
    while let Some(chunk) = stream.next().await {
        accumulator.push(chunk?);
    }
    Ok(accumulator.finish())
}

/// Collect a sync chunk sequence into one message
pub fn collect_iter<I>(chunks: I) -> BridgeResult<CollectedMessage>
where
    I: IntoIterator<Item = BridgeResult<MessageChunk>>,
{
    let mut accumulator = ChunkAccumulator::new();
    for chunk in chunks {
        accumulator.push(chunk?);
    }
    Ok(accumulator.finish())
}

/// In-progress fragments of one logical tool call
#[derive(Debug, Default)]
struct FragmentGroup {
    index: Option<u32>,
    id: Option<String>,
    name: Option<String>,
    args: String,
}

impl FragmentGroup {
    fn finish(self) -> ToolCall {
        let arguments = if self.args.is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            // Unparseable argument text is kept verbatim rather than
            // dropped, so the caller can still see what arrived.
            serde_json::from_str(&self.args)
                .unwrap_or_else(|_| Value::String(self.args.clone()))
        };
        ToolCall {
            id: self
                .id
                .unwrap_or_else(|| format!("call_{}", Uuid::new_v4())),
            name: self.name.unwrap_or_default(),
            arguments,
        }
    }
}

/// Accumulation state for one open stream
#[derive(Debug, Default)]
struct ChunkAccumulator {
    role: Option<MessageRole>,
    content: String,
    groups: Vec<FragmentGroup>,
    additional: HashMap<String, Value>,
    usage: Option<TokenUsage>,
}

impl ChunkAccumulator {
    fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, chunk: MessageChunk) {
        if self.role.is_none() {
            self.role = Some(chunk.role);
        }
        self.content.push_str(&chunk.content);

        for fragment in chunk.tool_call_chunks {
            let position = match fragment.index {
                // Fragments sharing an index belong to one logical call.
                Some(index) => self
                    .groups
                    .iter()
                    .position(|group| group.index == Some(index))
                    .unwrap_or_else(|| {
                        self.groups.push(FragmentGroup {
                            index: Some(index),
                            ..Default::default()
                        });
                        self.groups.len() - 1
                    }),
                // Index-less fragments each stand alone.
                None => {
                    self.groups.push(FragmentGroup::default());
                    self.groups.len() - 1
                }
            };
            let group = &mut self.groups[position];
            if group.id.is_none() {
                group.id = fragment.id;
            }
            if group.name.is_none() {
                group.name = fragment.name;
            }
            if let Some(args) = fragment.args {
                group.args.push_str(&args);
            }
        }

        for (key, incoming) in chunk.additional {
            match self.additional.entry(key) {
                Entry::Occupied(mut entry) => match (entry.get_mut(), incoming) {
                    (Value::String(merged), Value::String(tail)) => merged.push_str(&tail),
                    (slot, incoming) => *slot = incoming,
                },
                Entry::Vacant(entry) => {
                    entry.insert(incoming);
                }
            }
        }

        if let Some(usage) = chunk.usage_metadata {
            self.usage = Some(usage);
        }
    }

    fn finish(self) -> CollectedMessage {
        CollectedMessage {
            role: self.role.unwrap_or(MessageRole::Assistant),
            content: self.content,
            tool_calls: self
                .groups
                .into_iter()
                .map(FragmentGroup::finish)
                .collect(),
            additional: self.additional,
            usage: self.usage,
        }
    }
}
