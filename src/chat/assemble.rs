//! Assembly of canonical responses and chunk streams
//!
//! Orchestrates the normalizer and the usage builder per response unit.
//! Batch mode produces one [`ChatResponse`]; streaming mode maps a raw
//! chunk sequence onto a canonical one, lazily, holding no more than the
//! current chunk and never aggregating across chunks.

use crate::chat::messages::{ChatResponse, MessageChunk};
use crate::chat::normalize;
use crate::chat::raw::{RawChunk, RawResponse};
use crate::chat::streaming::{ChunkStream, RawStream};
use crate::chat::usage::usage_from_raw;
use crate::error::BridgeResult;
use chrono::DateTime;
use futures::StreamExt;

/// Assemble one canonical chunk from one raw unit of a stream (or from a
/// batch envelope; the shapes are shared).
///
/// A chunk whose `choices` are empty (the usage-only terminal chunk some
/// providers send) yields an empty assistant chunk so any usage it
/// carries still reaches the consumer. Usage is attached wherever the raw
/// payload reports it; a provider reporting usage on several chunks gets
/// each occurrence attached independently.
pub fn assemble_chunk(raw: &RawChunk) -> BridgeResult<MessageChunk> {
    let mut chunk = match raw.unit() {
        Some(unit) => normalize::chunk_from_unit(unit)?,
        None => MessageChunk::default(),
    };
    if let Some(usage) = raw.usage() {
        chunk.usage_metadata = Some(usage_from_raw(usage));
    }
    Ok(chunk)
}

/// Assemble a batch response.
///
/// Normalizes `choices[0]`'s message (falling back to a `delta` body for
/// providers that respond with one), attaches usage when reported, and
/// carries over the envelope metadata.
pub fn assemble_response(raw: &RawResponse) -> BridgeResult<ChatResponse> {
    let message = assemble_chunk(raw)?;
    Ok(ChatResponse {
        message,
        model: raw.model().map(str::to_string),
        id: raw.id().map(str::to_string),
        created: raw
            .created()
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        finish_reason: raw.finish_reason().map(str::to_string),
    })
}

/// Map a sync raw-chunk sequence onto canonical chunks.
///
/// Order is preserved exactly, nothing is buffered beyond the current
/// chunk, and a failed item propagates in place; chunks already yielded
/// stay valid.
pub fn assemble_iter<I>(chunks: I) -> impl Iterator<Item = BridgeResult<MessageChunk>>
where
    I: IntoIterator<Item = BridgeResult<RawChunk>>,
{
    chunks
        .into_iter()
        .map(|item| item.and_then(|raw| assemble_chunk(&raw)))
}

/// Map an async raw-chunk stream onto canonical chunks.
///
/// Same contract as [`assemble_iter`]; the only suspension point is the
/// pull of the next raw chunk from the gateway. No synthetic terminal
/// chunk is emitted when the source ends.
pub fn assemble_stream(chunks: RawStream) -> ChunkStream {
    Box::pin(chunks.map(|item| item.and_then(|raw| assemble_chunk(&raw))))
}
