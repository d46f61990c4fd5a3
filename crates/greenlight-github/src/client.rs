//! HTTP client wrapper with rate limiting

use crate::error::{Error, Result};
use governor::{Quota, RateLimiter};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Request timeout for GitHub API calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared rate limiter for API requests
pub type ApiRateLimiter = Arc<
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>,
>;

/// HTTP client wrapper for API requests with optional rate limiting
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    rate_limiter: Option<ApiRateLimiter>,
}

impl HttpClient {
    fn build_client() -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(format!("greenlight/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?)
    }

    /// Create a new HTTP client (no rate limiting)
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Self::build_client()?,
            rate_limiter: None,
        })
    }

    /// Create a new HTTP client with rate limiting
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum requests per second
    pub fn with_rate_limit(requests_per_second: u32) -> Result<Self> {
        let rate = NonZeroU32::new(requests_per_second)
            .ok_or_else(|| Error::other("Rate limit must be at least one request per second"))?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client: Self::build_client()?,
            rate_limiter: Some(rate_limiter),
        })
    }

    pub fn is_rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Wait for rate limiter if enabled
    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }

    /// Send a request and fail on non-success statuses
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<reqwest::Response> {
        self.wait_for_rate_limit().await;

        let mut request = self.client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%method, url, status = status.as_u16(), "github api request");

        // Handle rate limiting (HTTP 429)
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimitExceeded(url.to_string()));
        }

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// Make a GET request with custom headers and return the response text
    pub async fn get_text_with_headers(&self, url: &str, headers: HeaderMap) -> Result<String> {
        let response = self.send(Method::GET, url, headers, None::<&()>).await?;
        Ok(response.text().await?)
    }

    /// Make a GET request with custom headers and deserialize JSON response
    pub async fn get_json_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<T> {
        let response = self.send(Method::GET, url, headers, None::<&()>).await?;
        Ok(response.json().await?)
    }

    /// Send a JSON body and deserialize the JSON response
    pub async fn send_json_with_headers<B, T>(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(method, url, headers, Some(body)).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        assert!(HttpClient::with_rate_limit(0).is_err());
        assert!(HttpClient::with_rate_limit(5).unwrap().is_rate_limited());
        assert!(!HttpClient::new().unwrap().is_rate_limited());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_text() {
        let client = HttpClient::new().unwrap();
        let text = client
            .get_text_with_headers("https://api.github.com/zen", HeaderMap::new())
            .await
            .unwrap();
        assert!(!text.is_empty());
    }
}
