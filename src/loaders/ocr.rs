//! OCR document loading through the gateway proxy
//!
//! Talks HTTP to the proxy's `/ocr` endpoint (the proxy owns the
//! provider-specific OCR configuration) and converts the page-oriented
//! response into [`Document`] values.

use crate::error::{BridgeError, BridgeResult};
use crate::loaders::Document;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{instrument, warn};

/// The one document source of a loader
#[derive(Debug, Clone, PartialEq)]
pub enum OcrSource {
    /// Local file, read and sent as a base64 data URI
    File(PathBuf),
    /// Remote document URL, passed through to the proxy
    Url(String),
    /// Base64 content, wrapped in a PDF data URI unless it already is one
    Base64(String),
    /// Raw bytes, sent as a PDF data URI
    Bytes(Vec<u8>),
}

/// Output mode of the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrMode {
    /// One document holding every page, joined with blank lines
    #[default]
    Single,
    /// One document per page
    Page,
}

/// Load documents through the gateway proxy's OCR endpoint.
///
/// # Examples
///
/// ```no_run
/// use llm_bridge::loaders::{OcrLoader, OcrMode, OcrSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let loader = OcrLoader::new(OcrSource::Url(
///     "https://example.com/report.pdf".to_string(),
/// ))
/// .with_proxy_base_url("https://proxy.internal")
/// .with_model("azure-document")
/// .with_mode(OcrMode::Page);
///
/// let documents = loader.load().await?;
/// for document in documents {
///     println!("{}", document.page_content);
/// }
/// # Ok(())
/// # }
/// ```
pub struct OcrLoader {
    source: OcrSource,
    proxy_base_url: String,
    api_key: Option<String>,
    model: String,
    mode: OcrMode,
    timeout: Duration,
    max_retries: u32,
}

impl OcrLoader {
    /// Create a loader for one document source with default settings
    pub fn new(source: OcrSource) -> Self {
        Self {
            source,
            proxy_base_url: "http://localhost:4000".to_string(),
            api_key: None,
            model: "azure-document".to_string(),
            mode: OcrMode::Single,
            timeout: Duration::from_secs(300),
            max_retries: 3,
        }
    }

    /// Set the proxy base URL (trailing slashes are stripped)
    pub fn with_proxy_base_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the bearer token for proxy authentication
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the OCR model name configured in the proxy
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output mode
    pub fn with_mode(mut self, mode: OcrMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry budget for transient failures
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Validate loader settings
    pub fn validate(&self) -> BridgeResult<()> {
        if !self.proxy_base_url.starts_with("http://")
            && !self.proxy_base_url.starts_with("https://")
        {
            return Err(BridgeError::config(format!(
                "proxy_base_url must start with http:// or https://, got: {}",
                self.proxy_base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(BridgeError::config("timeout must be positive"));
        }
        Ok(())
    }

    /// Build the document payload sent to the proxy.
    ///
    /// Everything that is not already a URL is turned into a base64 data
    /// URI; unknown file types default to PDF.
    pub fn document_payload(&self) -> BridgeResult<Value> {
        let document_url = match &self.source {
            OcrSource::Url(url) => url.clone(),
            OcrSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|err| BridgeError::Io {
                    message: format!("failed to read {}: {err}", path.display()),
                })?;
                let mime = mime_guess::from_path(path)
                    .first_raw()
                    .unwrap_or("application/pdf");
                format!("data:{mime};base64,{}", BASE64.encode(&bytes))
            }
            OcrSource::Base64(content) => {
                if content.starts_with("data:") {
                    content.clone()
                } else {
                    format!("data:application/pdf;base64,{content}")
                }
            }
            OcrSource::Bytes(bytes) => {
                format!("data:application/pdf;base64,{}", BASE64.encode(bytes))
            }
        };

        Ok(json!({
            "type": "document_url",
            "document_url": document_url,
        }))
    }

    async fn try_request(
        &self,
        client: &reqwest::Client,
        url: &str,
        payload: &Value,
    ) -> BridgeResult<Value> {
        let mut request = client.post(url).json(&json!({
            "model": self.model,
            "document": payload,
        }));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|err| {
            BridgeError::http(
                None,
                format!("failed to connect to the OCR proxy at {url}: {err}"),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(500).collect();
            return Err(BridgeError::http(
                Some(status.as_u16()),
                format!("OCR request to {url} failed with status {status}: {truncated}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|err| BridgeError::malformed(format!("OCR response is not JSON: {err}")))
    }

    /// Send the OCR request, retrying transient failures with
    /// exponential backoff and jitter.
    async fn request_ocr(&self, payload: &Value) -> BridgeResult<Value> {
        let url = format!("{}/ocr", self.proxy_base_url);
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| BridgeError::http(None, format!("failed to create HTTP client: {err}")))?;

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            match self.try_request(&client, &url, payload).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if attempt < self.max_retries && error.is_transient() {
                        let base_delay_secs = 2_u64.pow(attempt);
                        let jitter_ms = {
                            let mut rng = rand::thread_rng();
                            rng.gen_range(0..=(base_delay_secs * 500))
                        };
                        let delay =
                            Duration::from_secs(base_delay_secs) + Duration::from_millis(jitter_ms);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.max_retries + 1,
                            delay_secs = delay.as_secs_f64(),
                            error = %error,
                            "OCR request failed, retrying"
                        );
                        sleep(delay).await;
                        last_error = Some(error);
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| BridgeError::http(None, "OCR retry budget exhausted".to_string())))
    }

    /// Convert the proxy response into documents per the configured mode
    pub fn documents_from_response(&self, response: &Value) -> BridgeResult<Vec<Document>> {
        let pages = response
            .get("pages")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                BridgeError::malformed("OCR response is missing the 'pages' array")
            })?;

        let source = match &self.source {
            OcrSource::File(path) => Some(path.display().to_string()),
            OcrSource::Url(url) => Some(url.clone()),
            _ => None,
        };
        let model = response.get("model").and_then(Value::as_str);

        match self.mode {
            OcrMode::Page => {
                let mut documents = Vec::with_capacity(pages.len());
                for (position, page) in pages.iter().enumerate() {
                    let content = page
                        .get("markdown")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    let mut document = Document::new(content).with_metadata(
                        "page",
                        page.get("index")
                            .and_then(Value::as_u64)
                            .unwrap_or(position as u64),
                    );
                    if let Some(dimensions) = page.get("dimensions").and_then(Value::as_object) {
                        if let Some(width) = dimensions.get("width") {
                            document = document.with_metadata("width", width.clone());
                        }
                        if let Some(height) = dimensions.get("height") {
                            document = document.with_metadata("height", height.clone());
                        }
                    }
                    if let Some(source) = &source {
                        document = document.with_metadata("source", source.clone());
                    }
                    if let Some(model) = model {
                        document = document.with_metadata("model", model);
                    }
                    documents.push(document);
                }
                Ok(documents)
            }
            OcrMode::Single => {
                let content = pages
                    .iter()
                    .map(|page| {
                        page.get("markdown")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let mut document =
                    Document::new(content).with_metadata("total_pages", pages.len() as u64);
                if let Some(source) = &source {
                    document = document.with_metadata("source", source.clone());
                }
                if let Some(model) = model {
                    document = document.with_metadata("model", model);
                }
                Ok(vec![document])
            }
        }
    }

    /// Load the configured document through the OCR proxy
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn load(&self) -> BridgeResult<Vec<Document>> {
        self.validate()?;
        let payload = self.document_payload()?;
        let response = self.request_ocr(&payload).await?;
        self.documents_from_response(&response)
    }
}
