//! Gamma markets API client.

use super::types::RawMarket;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Anything that can answer a per-topic market query.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch open, active markets tagged with `tag_id`.
    async fn markets_by_tag(&self, tag_id: u64, limit: usize) -> Result<Vec<RawMarket>>;
}

/// Builder for creating a gamma client.
pub struct GammaClientBuilder {
    config: ApiConfig,
}

impl GammaClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gamma_url = url.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GammaClient> {
        GammaClient::new(self.config)
    }
}

impl Default for GammaClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only HTTP client for the gamma markets endpoint.
pub struct GammaClient {
    base_url: String,
    http: reqwest::Client,
    rate_limiter: Arc<RwLock<RateLimiter>>,
}

impl GammaClient {
    /// Create a new client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.gamma_url.trim_end_matches('/').to_string(),
            http,
            rate_limiter: Arc::new(RwLock::new(RateLimiter::new(config.rate_limit))),
        })
    }

    /// URL queried for one topic.
    pub fn markets_url(&self) -> String {
        format!("{}/markets", self.base_url)
    }

    /// Apply rate limiting.
    async fn rate_limit(&self) -> Result<()> {
        let mut limiter = self.rate_limiter.write().await;
        limiter.wait().await
    }
}

#[async_trait]
impl MarketSource for GammaClient {
    async fn markets_by_tag(&self, tag_id: u64, limit: usize) -> Result<Vec<RawMarket>> {
        self.rate_limit().await?;

        let url = self.markets_url();
        let params = [
            ("closed", "false".to_string()),
            ("active", "true".to_string()),
            ("tag_id", tag_id.to_string()),
            ("limit", limit.to_string()),
        ];
        debug!(%url, tag_id, limit, "Fetching markets");

        let response = self.http.get(&url).query(&params).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            warn!(tag_id, retry_after, "Rate limited by gamma API");
            return Err(Error::RateLimited(retry_after));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::api(status.as_u16(), body));
        }

        let body = response.bytes().await?;
        decode_markets(&body)
    }
}

/// Parse a `/markets` response body.
fn decode_markets(body: &[u8]) -> Result<Vec<RawMarket>> {
    Ok(serde_json::from_slice(body)?)
}

/// Simple token-bucket rate limiter.
struct RateLimiter {
    requests_per_second: u32,
    last_request: Instant,
    tokens: f64,
}

impl RateLimiter {
    fn new(requests_per_second: u32) -> Self {
        let requests_per_second = requests_per_second.max(1);
        Self {
            requests_per_second,
            last_request: Instant::now(),
            tokens: requests_per_second as f64,
        }
    }

    async fn wait(&mut self) -> Result<()> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_request).as_secs_f64();

        // Replenish tokens
        self.tokens = (self.tokens + elapsed * self.requests_per_second as f64)
            .min(self.requests_per_second as f64);

        if self.tokens < 1.0 {
            let wait_time = (1.0 - self.tokens) / self.requests_per_second as f64;
            tokio::time::sleep(Duration::from_secs_f64(wait_time)).await;
            self.tokens = 1.0;
        }

        self.tokens -= 1.0;
        self.last_request = Instant::now();

        Ok(())
    }
}
