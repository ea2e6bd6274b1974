//! The gateway seam
//!
//! The multi-provider gateway is an external collaborator: given a
//! request it returns one raw response, or a stream of raw chunks, in
//! whichever wire shape it produces. This crate consumes the trait and
//! never implements it outside of test fakes.

use crate::chat::raw::RawResponse;
use crate::chat::streaming::RawStream;
use crate::config::GatewayConfig;
use crate::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Sampling and generation parameters for one model
#[derive(Debug, Clone, Serialize)]
pub struct ModelParameters {
    /// Model name in gateway format (e.g. `openai/gpt-4o`,
    /// `anthropic/claude-sonnet-4-5`)
    pub model: String,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling (for supported models)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Number of completions to request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Frequency penalty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Presence penalty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Seed for deterministic generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o-mini".to_string(),
            max_tokens: None,
            temperature: Some(0.7),
            top_p: None,
            top_k: None,
            n: Some(1),
            stop: None,
            frequency_penalty: None,
            presence_penalty: None,
            seed: None,
        }
    }
}

impl ModelParameters {
    /// Create parameters with just the model name
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            n: None,
            stop: None,
            frequency_penalty: None,
            presence_penalty: None,
            seed: None,
        }
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-p
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set stop sequences
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Streaming options forwarded to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamOptions {
    /// Ask the provider to report usage on the terminal chunk
    pub include_usage: bool,
}

/// One completion request as handed to the gateway.
///
/// `None` fields are dropped during serialization, mirroring how the
/// gateway expects absent rather than null parameters.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Conversation messages in wire shape
    pub messages: Vec<Value>,
    /// Sampling parameters, model name included, flattened onto the
    /// request body
    #[serde(flatten)]
    pub params: ModelParameters,
    /// Whether to stream the response
    pub stream: bool,
    /// Streaming options (usage reporting)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
    /// Upstream credentials and endpoint overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_provider: Option<String>,
    /// Retry budget; the gateway owns the retry loop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Open extension fields forwarded verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CompletionRequest {
    /// Create a request from connection config and model parameters
    pub fn new(config: &GatewayConfig, params: ModelParameters, messages: Vec<Value>) -> Self {
        Self {
            messages,
            params,
            stream: false,
            stream_options: None,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            api_version: config.api_version.clone(),
            organization: config.organization.clone(),
            custom_provider: config.custom_provider.clone(),
            max_retries: config.max_retries,
            extra: HashMap::new(),
        }
    }
}

/// One embedding request as handed to the gateway
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    /// Model name in gateway format
    pub model: String,
    /// Texts to embed
    pub input: Vec<String>,
    /// Output dimensions, when the model supports choosing them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    /// Encoding format (e.g. `float`, `base64`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
    /// Upstream credentials and endpoint overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_provider: Option<String>,
    /// Retry budget; the gateway owns the retry loop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Open extension fields forwarded verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Unified interface to the multi-provider gateway
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send a batch completion request
    async fn complete(&self, request: &CompletionRequest) -> BridgeResult<RawResponse>;

    /// Send a streaming completion request
    async fn complete_stream(&self, request: &CompletionRequest) -> BridgeResult<RawStream>;

    /// Send an embedding request, returning the raw response body
    async fn embed(&self, request: &EmbeddingRequest) -> BridgeResult<Value> {
        let _ = request;
        Err(BridgeError::gateway("embedding not supported by this gateway"))
    }
}
