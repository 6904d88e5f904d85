//! HTTP transport for recognition requests.

use std::time::Duration;

use async_trait::async_trait;
use inkcalc_core::RecognitionRequest;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;

/// Path of the recognition endpoint, relative to the API base URL.
pub const CALCULATE_PATH: &str = "calculate";

const MAX_ERROR_BODY: usize = 256;

/// Configuration for the recognition service.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Base URL of the recognition API.
    pub api_url: String,
    /// Overall HTTP timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8900".to_string(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Sends one recognition request and returns the raw JSON answer.
#[async_trait]
pub trait RecognitionTransport: Send + Sync {
    /// Perform the request. Payload validation is left to the caller.
    async fn recognize(&self, request: &RecognitionRequest) -> Result<Value, ClientError>;
}

/// `reqwest` transport posting to `<api_url>/calculate`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL is malformed or cannot
    /// carry a path, and [`ClientError::Http`] if the HTTP client fails to
    /// build.
    pub fn new(config: &RecognitionConfig) -> Result<Self, ClientError> {
        let endpoint = endpoint_for(&config.api_url)?;

        let mut builder = Client::builder()
            .user_agent(concat!("inkcalc/", env!("CARGO_PKG_VERSION")))
            // Disable proxy detection to avoid macOS system-configuration panic
            .no_proxy();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }
}

#[async_trait]
impl RecognitionTransport for HttpTransport {
    async fn recognize(&self, request: &RecognitionRequest) -> Result<Value, ClientError> {
        tracing::debug!(
            "POST {} ({} bytes of image, {} bindings)",
            self.endpoint,
            request.image.len(),
            request.dict_of_vars.len()
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Resolve `<base>/calculate`, keeping any path prefix on the base URL.
fn endpoint_for(base_url: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(base_url);
    let mut url = parsed.map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    if url.cannot_be_a_base() {
        let reason = format!("{base_url} cannot be used as a base URL");
        return Err(ClientError::InvalidUrl(reason));
    }
    let path = format!("{}/{CALCULATE_PATH}", url.path().trim_end_matches('/'));
    url.set_path(&path);
    Ok(url)
}
