//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - Automatic retry with exponential backoff on 5xx/429
/// - TLS support by default
pub struct ReqwestHttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent("lyrics-companion-core/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a new HTTP client around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the transient-failure retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    async fn convert_response(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (key.to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn is_transient(status: u16) -> bool {
        status >= 500 || status == 429
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut attempt = 1u32;
        loop {
            debug!(
                attempt,
                max_attempts = self.retry.max_attempts,
                url = %request.url,
                "Executing HTTP request"
            );

            let send_result = self.build_request(request.clone()).send().await;

            match send_result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if Self::is_transient(status) && attempt < self.retry.max_attempts {
                        warn!(status, attempt, "HTTP request failed with retryable status");
                    } else {
                        return Self::convert_response(response).await;
                    }
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(BridgeError::OperationFailed(format!(
                            "HTTP request failed after {} attempts: {}",
                            attempt, e
                        )));
                    }
                    warn!(attempt, error = %e, "HTTP request failed, retrying");
                }
            }

            sleep(self.retry.delay_before(attempt)).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Put),
            reqwest::Method::PUT
        );
    }

    #[test]
    fn test_transient_statuses() {
        assert!(ReqwestHttpClient::is_transient(500));
        assert!(ReqwestHttpClient::is_transient(503));
        assert!(ReqwestHttpClient::is_transient(429));
        assert!(!ReqwestHttpClient::is_transient(404));
        assert!(!ReqwestHttpClient::is_transient(204));
    }
}
