use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::common::{ApiQueryParams, ApiResource};
use super::error::ApiError;
use super::resource_api::ResourceApi;

pub const DEFAULT_ENDPOINT: &str = "https://allquiet.app/api/public/v1";
const API_KEY_HEADER: &str = "x-api-key";

/// AllQuiet public API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

pub fn user_agent() -> String {
    format!("terraform-provider-allquiet/{}", env!("CARGO_PKG_VERSION"))
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, ApiError> {
        Self::with_config(endpoint, api_key, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        endpoint: &str,
        api_key: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let url = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "{}: scheme must be http or https",
                endpoint
            )));
        }

        let mut key = HeaderValue::from_str(api_key).map_err(|_| ApiError::InvalidApiKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent())
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: url.as_str().trim_end_matches('/').to_string(),
                retry_config,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Typed CRUD access to one REST collection
    pub fn api<R: ApiResource>(&self) -> ResourceApi<'_, R> {
        ResourceApi::new(self)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_with_retry("GET", path, || {
            self.inner.http_client.get(self.url(path))
        })
        .await
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.get(&full_path).await
    }

    /// Execute a POST request. Creates are not idempotent so they are sent
    /// exactly once.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!(method = "POST", path, "API request");
        let response = self
            .inner
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.handle_response("POST", path, response).await
    }

    /// Execute a PUT request with retry logic
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_with_retry("PUT", path, || {
            self.inner.http_client.put(self.url(path)).json(body)
        })
        .await
    }

    /// Execute a DELETE request with retry logic
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_with_retry("DELETE", path, || {
            self.inner.http_client.delete(self.url(path))
        })
        .await
    }

    /// Execute request with retry logic on rate limiting, server errors and
    /// connection failures
    async fn execute_with_retry<T, F>(
        &self,
        method: &str,
        path: &str,
        build_request: F,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let config = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    config
                        .initial_backoff_ms
                        .saturating_mul(2_u64.saturating_pow(attempt - 1)),
                    config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying {} {} after {}ms (attempt {})",
                    method,
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            tracing::debug!(method, path, attempt, "API request");
            let result = build_request().send().await;

            let retryable = match &result {
                Ok(response) => is_retryable_status(response.status()),
                Err(e) => e.is_connect() || e.is_timeout(),
            };
            if retryable && attempt < config.max_retries {
                attempt += 1;
                continue;
            }

            return match result {
                Ok(response) => self.handle_response(method, path, response).await,
                Err(e) => Err(self.map_send_error(e)),
            };
        }
    }

    fn map_send_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.inner.retry_config.timeout_seconds)
        } else {
            ApiError::RequestError(error)
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(method, path, status = status.as_u16(), "API response body: {}", text);

        if status.is_success() {
            return parse_body(&text);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::error!(method, path, status = status.as_u16(), "API rejected the API key");
                Err(ApiError::AuthError)
            }
            _ => {
                tracing::error!(method, path, status = status.as_u16(), "API request failed");
                Err(ApiError::ApiError {
                    status: status.as_u16(),
                    message: text,
                })
            }
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Empty bodies (204 on delete) parse as JSON null, which `()` and `Option`
/// accept
fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let body = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
        ApiError::ParseError(e.to_string())
    })
}
