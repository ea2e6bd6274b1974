//! Embeddings adapter over the gateway
//!
//! Normalizes the gateway's embedding responses (`data[*].embedding`)
//! into plain vectors, with the same connection configuration the chat
//! client uses.

use crate::chat::gateway::{EmbeddingRequest, Gateway};
use crate::config::GatewayConfig;
use crate::error::{BridgeError, BridgeResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Embedding client over a multi-provider gateway.
///
/// # Examples
///
/// ```no_run
/// use llm_bridge::embeddings::EmbeddingsClient;
/// use llm_bridge::chat::gateway::Gateway;
/// use llm_bridge::config::GatewayConfig;
/// use std::sync::Arc;
///
/// # async fn example(gateway: Arc<dyn Gateway>) -> Result<(), Box<dyn std::error::Error>> {
/// let embeddings = EmbeddingsClient::new(
///     gateway,
///     GatewayConfig::new().with_api_key("sk-..."),
///     "openai/text-embedding-3-small",
/// )?;
/// let vectors = embeddings
///     .embed_documents(&["hello".to_string(), "world".to_string()])
///     .await?;
/// assert_eq!(vectors.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct EmbeddingsClient {
    gateway: Arc<dyn Gateway>,
    config: GatewayConfig,
    model: String,
    dimensions: Option<u32>,
    encoding_format: Option<String>,
    extra: HashMap<String, Value>,
}

impl EmbeddingsClient {
    /// Create a new embeddings client
    pub fn new(
        gateway: Arc<dyn Gateway>,
        config: GatewayConfig,
        model: impl Into<String>,
    ) -> BridgeResult<Self> {
        config.validate()?;
        Ok(Self {
            gateway,
            config,
            model: model.into(),
            dimensions: None,
            encoding_format: None,
            extra: HashMap::new(),
        })
    }

    /// Set output dimensions (models that support choosing them)
    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Set the encoding format (e.g. `float`, `base64`)
    pub fn with_encoding_format(mut self, encoding_format: impl Into<String>) -> Self {
        self.encoding_format = Some(encoding_format.into());
        self
    }

    /// Forward an extra request field verbatim
    pub fn with_extra<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Build the gateway request for a batch of texts
    pub fn request(&self, input: &[String]) -> EmbeddingRequest {
        EmbeddingRequest {
            model: self.model.clone(),
            input: input.to_vec(),
            dimensions: self.dimensions,
            encoding_format: self.encoding_format.clone(),
            api_key: self.config.api_key.clone(),
            api_base: self.config.api_base.clone(),
            api_version: self.config.api_version.clone(),
            organization: self.config.organization.clone(),
            custom_provider: self.config.custom_provider.clone(),
            max_retries: self.config.max_retries,
            extra: self.extra.clone(),
        }
    }

    /// Embed a list of document texts, one vector per text
    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    pub async fn embed_documents(&self, texts: &[String]) -> BridgeResult<Vec<Vec<f32>>> {
        let request = self.request(texts);
        let response = self.gateway.embed(&request).await?;
        vectors_from_response(&response)
    }

    /// Embed a single query text
    pub async fn embed_query(&self, text: &str) -> BridgeResult<Vec<f32>> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(BridgeError::malformed(
                "embedding response contained no vectors",
            ));
        }
        Ok(vectors.remove(0))
    }
}

/// Extract vectors from a raw embedding response.
///
/// Entries are returned in `index` order when the provider reports one,
/// payload order otherwise. A response without a `data` array, or an
/// entry without an `embedding` array, is malformed.
pub fn vectors_from_response(response: &Value) -> BridgeResult<Vec<Vec<f32>>> {
    let entries = response
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            BridgeError::malformed("embedding response is missing the 'data' array")
        })?;

    let mut indexed: Vec<(u64, Vec<f32>)> = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let values = entry
            .get("embedding")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                BridgeError::malformed(format!(
                    "embedding entry {position} is missing the 'embedding' array"
                ))
            })?;
        let vector = values
            .iter()
            .map(|value| value.as_f64().unwrap_or(0.0) as f32)
            .collect();
        let index = entry
            .get("index")
            .and_then(Value::as_u64)
            .unwrap_or(position as u64);
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
