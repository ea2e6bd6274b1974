//! Common types used throughout llm-bridge

use serde::{Deserialize, Serialize};

/// Canonical token usage for one chat completion.
///
/// Providers report usage under different keys, or not at all; the usage
/// builder in [`crate::chat::usage`] maps whatever the gateway forwarded
/// into this shape. Detail buckets stay `None` when a provider does not
/// report them, so callers can tell "not reported" from "reported zero".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub input_tokens: u32,
    /// Number of tokens in the completion
    pub output_tokens: u32,
    /// Total tokens. Taken verbatim from the provider when reported,
    /// otherwise the sum of input and output.
    pub total_tokens: u32,
    /// Breakdown of input tokens (cache, audio)
    #[serde(default, skip_serializing_if = "InputTokenDetails::is_empty")]
    pub input_token_details: InputTokenDetails,
    /// Breakdown of output tokens (audio, reasoning)
    #[serde(default, skip_serializing_if = "OutputTokenDetails::is_empty")]
    pub output_token_details: OutputTokenDetails,
}

impl TokenUsage {
    /// Create a new usage record from basic counts
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            ..Default::default()
        }
    }

    /// Check if this usage carries prompt-cache metrics
    pub fn has_cache_metrics(&self) -> bool {
        self.input_token_details.cache_read.is_some()
            || self.input_token_details.cache_creation.is_some()
    }
}

/// Input-side token breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InputTokenDetails {
    /// Audio input tokens (multimodal models)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<u32>,
    /// Tokens written to the prompt cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_creation: Option<u32>,
    /// Tokens read from the prompt cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read: Option<u32>,
}

impl InputTokenDetails {
    /// True when the provider reported no input-side detail at all
    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.cache_creation.is_none() && self.cache_read.is_none()
    }
}

/// Output-side token breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutputTokenDetails {
    /// Audio output tokens (multimodal models)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<u32>,
    /// Reasoning tokens spent by thinking models
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<u32>,
}

impl OutputTokenDetails {
    /// True when the provider reported no output-side detail at all
    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.reasoning.is_none()
    }
}
