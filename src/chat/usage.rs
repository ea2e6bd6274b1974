//! Canonical usage accounting
//!
//! Providers report token usage under different keys, different nesting,
//! or not at all. This module maps whatever usage record the gateway
//! forwarded into one [`TokenUsage`] shape.

use crate::types::TokenUsage;
use serde_json::Value;
use tracing::debug;

/// Build canonical usage from a raw usage record.
///
/// Basic counts default to zero when absent. The provider's own
/// `total_tokens` is authoritative even when it disagrees with the sum,
/// since some providers count extra token categories into the total. Detail
/// buckets are populated only for keys the record actually carries, so
/// "not reported" stays distinguishable from "reported zero". A null,
/// empty, or non-object record yields zeroed counts, never a fault.
pub fn usage_from_raw(raw: &Value) -> TokenUsage {
    let Some(record) = raw.as_object() else {
        return TokenUsage::default();
    };

    let count = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_u64)
            .map(|tokens| tokens as u32)
    };

    let input_tokens = count("prompt_tokens").unwrap_or(0);
    let output_tokens = count("completion_tokens").unwrap_or(0);
    let total_tokens = count("total_tokens").unwrap_or(input_tokens + output_tokens);

    let mut usage = TokenUsage {
        input_tokens,
        output_tokens,
        total_tokens,
        ..Default::default()
    };

    usage.input_token_details.audio = count("audio_input_tokens");
    usage.input_token_details.cache_creation = count("cache_creation_input_tokens");
    usage.input_token_details.cache_read = count("cache_read_input_tokens");

    usage.output_token_details.audio = count("audio_output_tokens");
    usage.output_token_details.reasoning = record
        .get("completion_tokens_details")
        .and_then(Value::as_object)
        .and_then(|details| details.get("reasoning_tokens"))
        .and_then(Value::as_u64)
        .map(|tokens| tokens as u32);

    if usage.has_cache_metrics() {
        debug!(
            cache_creation = ?usage.input_token_details.cache_creation,
            cache_read = ?usage.input_token_details.cache_read,
            "prompt cache metrics reported"
        );
    }

    usage
}
