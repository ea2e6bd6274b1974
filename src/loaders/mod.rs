//! Document loaders backed by the gateway proxy

pub mod ocr;


pub use ocr::{OcrLoader, OcrMode, OcrSource};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A loaded document: text content plus loader metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text content of the document (markdown for OCR output)
    pub page_content: String,
    /// Loader metadata (source, page numbers, model, dimensions)
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    /// Create a new document with empty metadata
    pub fn new<S: Into<String>>(page_content: S) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
