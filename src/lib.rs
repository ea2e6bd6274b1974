//! llm-bridge
//!
//! Canonical chat-model adapter over multi-provider LLM gateways. A
//! gateway forwards provider responses in whatever shape the upstream
//! produced: OpenAI-style, Anthropic-style, Vertex-style, loose JSON or
//! typed payloads. This crate normalizes those into one canonical message
//! representation, for batch responses and for streams of incremental
//! deltas, and reconciles token-usage accounting across providers that
//! report it differently or not at all.
//!
//! The interesting parts live in [`chat`]: the normalizer
//! ([`chat::normalize`]), the usage builder ([`chat::usage`]), and the
//! assembler ([`chat::assemble`]) that maps raw gateway output onto
//! canonical messages and chunk streams. [`chat::client::ChatClient`] is
//! the thin glue binding them to a [`chat::gateway::Gateway`]
//! implementation. [`embeddings`] and [`loaders`] adapt the gateway's
//! embedding and OCR surfaces with the same connection configuration.

pub mod chat;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod loaders;
pub mod types;

// Re-export commonly used types
pub use chat::{
    ChatClient, ChatMessage, ChatResponse, ChunkStream, CollectedMessage, CompletionRequest,
    Gateway, MessageChunk, MessageRole, ModelParameters, RawChunk, RawResponse, RawStream,
    StreamOptions, ToolCall, ToolCallChunk,
};
pub use config::{GatewayConfig, TimeoutConfig};
pub use embeddings::EmbeddingsClient;
pub use error::{BridgeError, BridgeResult};
pub use loaders::{Document, OcrLoader, OcrMode, OcrSource};
pub use types::{InputTokenDetails, OutputTokenDetails, TokenUsage};
