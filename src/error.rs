//! Error types for llm-bridge
//!
//! One error enum covers the whole crate. Field-level anomalies in gateway
//! payloads are absorbed by the normalizer and never surface here; only
//! unit-level shape violations and transport failures become errors.

use thiserror::Error;

/// Result type alias for llm-bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Main error type for llm-bridge
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Errors reported by the gateway while completing a request
    #[error("Gateway error: {message}")]
    Gateway {
        message: String,
        provider: Option<String>,
    },

    /// A gateway payload whose top-level shape cannot be interpreted.
    ///
    /// Raised when a unit is neither a JSON object nor a typed payload,
    /// which means the gateway changed its output contract. Missing
    /// optional fields never produce this error.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// HTTP transport errors (OCR proxy path)
    #[error("HTTP error: {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File system errors (loader inputs)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl BridgeError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a gateway error without provider attribution
    pub fn gateway<S: Into<String>>(message: S) -> Self {
        Self::Gateway {
            message: message.into(),
            provider: None,
        }
    }

    /// Create a gateway error attributed to a provider
    pub fn gateway_for<S: Into<String>, P: Into<String>>(message: S, provider: P) -> Self {
        Self::Gateway {
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    /// Create a malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create an HTTP error with an optional status code
    pub fn http<S: Into<String>>(status: Option<u16>, message: S) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Check if an error is transient and worth retrying.
    ///
    /// Transient errors are connection-level failures and the usual
    /// throttling/availability status codes (408, 429, 5xx). Everything
    /// else returns immediately to the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            BridgeError::Http { status, .. } => match status {
                // No status means the request never completed (connect
                // failure, timeout): retryable.
                None => true,
                Some(code) => matches!(*code, 408 | 429) || *code >= 500,
            },
            BridgeError::Gateway { message, .. } => {
                let lower = message.to_lowercase();
                lower.contains("429")
                    || lower.contains("502")
                    || lower.contains("503")
                    || lower.contains("504")
                    || lower.contains("overloaded")
                    || lower.contains("timeout")
                    || lower.contains("connection")
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
