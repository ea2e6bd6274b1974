//! Chat completion normalization and client glue

pub mod assemble;
pub mod client;
pub mod gateway;
pub mod messages;
pub mod normalize;
pub mod raw;
pub mod streaming;
pub mod usage;

#[cfg(test)]
mod assemble_tests;

#[cfg(test)]
mod client_tests;




pub use assemble::{assemble_chunk, assemble_iter, assemble_response, assemble_stream};
pub use client::ChatClient;
pub use gateway::{CompletionRequest, EmbeddingRequest, Gateway, ModelParameters, StreamOptions};
pub use messages::{ChatMessage, ChatResponse, MessageChunk, MessageRole, ToolCall, ToolCallChunk};
pub use normalize::{chunk_from_unit, chunk_from_value};
pub use raw::{CompletionPayload, RawChunk, RawMessage, RawResponse, RawUnit};
pub use streaming::{ChunkStream, CollectedMessage, RawStream, collect_iter, collect_stream};
pub use usage::usage_from_raw;
