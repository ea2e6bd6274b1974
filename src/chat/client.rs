//! Chat client glue over the gateway
//!
//! Thin wrapper that builds default request parameters, hands the request
//! to the gateway, and runs the assembler over whatever comes back. All
//! interesting behavior lives in the normalizer, usage builder, and
//! assembler; this type just wires them to a [`Gateway`].

use crate::chat::assemble;
use crate::chat::gateway::{CompletionRequest, Gateway, ModelParameters, StreamOptions};
use crate::chat::messages::{ChatMessage, ChatResponse};
use crate::chat::streaming::ChunkStream;
use crate::config::GatewayConfig;
use crate::error::BridgeResult;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Chat-completion client over a multi-provider gateway.
///
/// # Examples
///
/// ```no_run
/// use llm_bridge::chat::client::ChatClient;
/// use llm_bridge::chat::gateway::{Gateway, ModelParameters};
/// use llm_bridge::chat::messages::ChatMessage;
/// use llm_bridge::config::GatewayConfig;
/// use std::sync::Arc;
///
/// # async fn example(gateway: Arc<dyn Gateway>) -> Result<(), Box<dyn std::error::Error>> {
/// let config = GatewayConfig::new().with_api_key("sk-...");
/// let params = ModelParameters::new("openai/gpt-4o-mini").with_temperature(0.2);
///
/// let client = ChatClient::new(gateway, config, params)?;
/// let response = client.chat(&[ChatMessage::user("Hello!")]).await?;
/// println!("{}", response.message.content);
/// # Ok(())
/// # }
/// ```
pub struct ChatClient {
    gateway: Arc<dyn Gateway>,
    config: GatewayConfig,
    params: ModelParameters,
    streaming: bool,
    stream_usage: bool,
}

impl ChatClient {
    /// Create a new chat client.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway configuration fails validation.
    pub fn new(
        gateway: Arc<dyn Gateway>,
        config: GatewayConfig,
        params: ModelParameters,
    ) -> BridgeResult<Self> {
        config.validate()?;
        debug!(model = %params.model, "created chat client");
        Ok(Self {
            gateway,
            config,
            params,
            streaming: false,
            stream_usage: true,
        })
    }

    /// Put the client into streaming mode.
    ///
    /// In streaming mode, default requests ask the provider to report
    /// usage on the terminal chunk via `stream_options`.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Opt out of usage reporting on streams
    pub fn with_stream_usage(mut self, stream_usage: bool) -> Self {
        self.stream_usage = stream_usage;
        self
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.params.model
    }

    /// Get the gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the default request for a set of messages.
    ///
    /// `stream_options: {include_usage: true}` is included exactly when
    /// the client is in streaming mode and stream usage has not been
    /// disabled; without it most providers never report usage on a
    /// stream.
    pub fn default_request(&self, messages: &[ChatMessage]) -> CompletionRequest {
        let wire_messages = messages.iter().map(ChatMessage::to_wire).collect();
        let mut request = CompletionRequest::new(&self.config, self.params.clone(), wire_messages);
        request.stream = self.streaming;
        if self.streaming && self.stream_usage {
            request.stream_options = Some(StreamOptions {
                include_usage: true,
            });
        }
        request
    }

    /// Send a batch chat completion request
    #[instrument(skip(self, messages), fields(model = %self.params.model))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> BridgeResult<ChatResponse> {
        let mut request = self.default_request(messages);
        request.stream = false;
        request.stream_options = None;

        let raw = self.gateway.complete(&request).await?;
        let response = assemble::assemble_response(&raw)?;

        if let Some(usage) = &response.message.usage_metadata {
            tracing::info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                total_tokens = usage.total_tokens,
                "chat completion finished"
            );
        }

        Ok(response)
    }

    /// Send a streaming chat completion request.
    ///
    /// The returned stream yields canonical chunks in arrival order; a
    /// failure of the underlying gateway stream propagates to the
    /// consumer in place.
    #[instrument(skip(self, messages), fields(model = %self.params.model))]
    pub async fn chat_stream(&self, messages: &[ChatMessage]) -> BridgeResult<ChunkStream> {
        let mut request = self.default_request(messages);
        request.stream = true;
        if self.stream_usage {
            request.stream_options = Some(StreamOptions {
                include_usage: true,
            });
        }

        let raw = self.gateway.complete_stream(&request).await?;
        Ok(assemble::assemble_stream(raw))
    }
}
