//! Minimal Elasticsearch REST client
//!
//! Supports scroll-based retrieval and `_bulk` partial updates, the only two
//! operations the pipeline needs. Requests carry a bounded timeout and are
//! retried a bounded number of times with exponential backoff; the client
//! never retries indefinitely.

use crate::config::{IndexConfig, RetryConfig};
use crate::domain::{PiiScanError, ReconciliationError, Result, RetrievalError};
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

use super::models::{BulkResponse, SearchResponse};

/// Elasticsearch client
pub struct EsClient {
    base_url: String,
    client: Client,
    auth_header: Option<String>,
    retry: RetryConfig,
    scroll_keepalive: String,
}

impl EsClient {
    /// Create a client from index configuration
    ///
    /// Builds the underlying HTTP client with the configured timeout, TLS
    /// verification toggle and optional extra CA root, and precomputes the
    /// authorization header.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.verify_tls {
            tracing::warn!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                PiiScanError::Configuration(format!("Failed to read CA certificate '{path}': {e}"))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                PiiScanError::Configuration(format!("Invalid CA certificate '{path}': {e}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| PiiScanError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client,
            auth_header: Self::auth_header_value(config),
            retry: config.retry.clone(),
            scroll_keepalive: config.scroll_keepalive.clone(),
        })
    }

    /// Build the authorization header from configuration
    ///
    /// Precedence: api key, then bearer token, then basic auth.
    fn auth_header_value(config: &IndexConfig) -> Option<String> {
        if let Some(api_key) = &config.api_key {
            return Some(format!("ApiKey {}", api_key.expose_secret()));
        }
        if let Some(bearer) = &config.bearer_token {
            return Some(format!("Bearer {}", bearer.expose_secret()));
        }
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            let credentials = format!("{username}:{}", password.expose_secret());
            let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
            return Some(format!("Basic {encoded}"));
        }
        None
    }

    /// Base URL of the document store
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry an operation with exponential backoff
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = self.retry.initial_delay_ms
                        * (self.retry.backoff_multiplier.powf((attempt - 1) as f64) as u64);
                    let delay_ms = delay_ms.min(self.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let mut request = self.client.post(url).json(body);
        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                PiiScanError::Retrieval(RetrievalError::Timeout(e.to_string()))
            } else {
                PiiScanError::Retrieval(RetrievalError::ConnectionFailed(e.to_string()))
            }
        })
    }

    async fn read_search_response(response: reqwest::Response) -> Result<SearchResponse> {
        match response.status() {
            status if status.is_success() => response
                .json::<SearchResponse>()
                .await
                .map_err(|e| RetrievalError::InvalidResponse(e.to_string()).into()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(RetrievalError::AuthenticationFailed(body).into())
            }
            StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                Err(RetrievalError::ScrollExpired(body).into())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RetrievalError::ServerError {
                    status: status.as_u16(),
                    message: body,
                }
                .into())
            }
        }
    }

    /// Open a scroll cursor over an index
    ///
    /// Issues the initial `_search?scroll=` request with the given query
    /// body and page size.
    pub async fn open_scroll(
        &self,
        index: &str,
        query: &Value,
        size: usize,
    ) -> Result<SearchResponse> {
        let url = format!(
            "{}/{index}/_search?scroll={}",
            self.base_url, self.scroll_keepalive
        );

        let mut body = query.clone();
        if let Some(map) = body.as_object_mut() {
            map.insert("size".to_string(), Value::from(size));
        }

        tracing::debug!(index = index, size = size, "Opening scroll cursor");

        self.retry_request(|| async {
            let response = self.post_json(&url, &body).await?;
            Self::read_search_response(response).await
        })
        .await
    }

    /// Fetch the next page for an open scroll cursor
    pub async fn continue_scroll(&self, scroll_id: &str) -> Result<SearchResponse> {
        let url = format!("{}/_search/scroll", self.base_url);
        let body = serde_json::json!({
            "scroll": self.scroll_keepalive,
            "scroll_id": scroll_id,
        });

        self.retry_request(|| async {
            let response = self.post_json(&url, &body).await?;
            Self::read_search_response(response).await
        })
        .await
    }

    /// Release a scroll cursor on the server
    ///
    /// Best-effort: a failure is logged and swallowed, the cursor expires
    /// on its own after the keepalive window.
    pub async fn clear_scroll(&self, scroll_id: &str) {
        let url = format!("{}/_search/scroll", self.base_url);
        let body = serde_json::json!({ "scroll_id": scroll_id });

        match self.post_json_delete(&url, &body).await {
            Ok(_) => tracing::debug!("Scroll cursor released"),
            Err(e) => tracing::debug!(error = %e, "Failed to release scroll cursor"),
        }
    }

    async fn post_json_delete(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let mut request = self.client.delete(url).json(body);
        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }
        request
            .send()
            .await
            .map_err(|e| PiiScanError::Retrieval(RetrievalError::ConnectionFailed(e.to_string())))
    }

    /// Submit an NDJSON `_bulk` payload of update actions
    ///
    /// Transport and HTTP-level failures are reconciliation errors; the
    /// caller decomposes item-level errors from the returned response.
    pub async fn bulk(&self, ndjson: String) -> Result<BulkResponse> {
        let url = format!("{}/_bulk", self.base_url);

        self.retry_request(|| async {
            let mut request = self
                .client
                .post(&url)
                .header("Content-Type", "application/x-ndjson")
                .body(ndjson.clone());
            if let Some(auth) = &self.auth_header {
                request = request.header("Authorization", auth);
            }

            let response = request.send().await.map_err(|e| {
                PiiScanError::Reconciliation(ReconciliationError::BulkRequestFailed(e.to_string()))
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let truncated: String = body.chars().take(4000).collect();
                return Err(ReconciliationError::BulkRequestFailed(format!(
                    "status {status}: {truncated}"
                ))
                .into());
            }

            response
                .json::<BulkResponse>()
                .await
                .map_err(|e| ReconciliationError::InvalidResponse(e.to_string()).into())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use secrecy::Secret;

    #[test]
    fn test_auth_header_basic() {
        let config = IndexConfig {
            username: Some("elastic".to_string()),
            password: Some(Secret::new("secret".to_string().into())),
            ..IndexConfig::default()
        };

        let header = EsClient::auth_header_value(&config).unwrap();
        assert!(header.starts_with("Basic "));
        // base64("elastic:secret")
        assert_eq!(header, "Basic ZWxhc3RpYzpzZWNyZXQ=");
    }

    #[test]
    fn test_auth_header_api_key_takes_precedence() {
        let config = IndexConfig {
            username: Some("elastic".to_string()),
            password: Some(Secret::new("secret".to_string().into())),
            api_key: Some(Secret::new("a2V5".to_string().into())),
            ..IndexConfig::default()
        };

        let header = EsClient::auth_header_value(&config).unwrap();
        assert_eq!(header, "ApiKey a2V5");
    }

    #[test]
    fn test_auth_header_absent_without_credentials() {
        let config = IndexConfig::default();
        assert!(EsClient::auth_header_value(&config).is_none());
    }

    #[test]
    fn test_missing_ca_cert_is_a_configuration_error() {
        let config = IndexConfig {
            ca_cert: Some("/nonexistent/ca.pem".to_string()),
            ..IndexConfig::default()
        };

        let err = EsClient::new(&config).err().unwrap();
        assert!(matches!(err, PiiScanError::Configuration(ref msg)
            if msg.contains("/nonexistent/ca.pem")));
    }

    #[test]
    fn test_garbage_ca_cert_is_a_configuration_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a pem").unwrap();

        let config = IndexConfig {
            ca_cert: Some(file.path().to_string_lossy().into_owned()),
            ..IndexConfig::default()
        };

        let err = EsClient::new(&config).err().unwrap();
        assert!(matches!(err, PiiScanError::Configuration(ref msg)
            if msg.contains("Invalid CA certificate")));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = IndexConfig {
            url: "http://localhost:9200/".to_string(),
            ..IndexConfig::default()
        };
        let client = EsClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9200");
    }
}
