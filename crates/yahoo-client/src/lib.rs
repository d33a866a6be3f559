//! Yahoo Finance data provider: quoteSummary fundamentals and daily chart history.

pub mod parse;
pub mod rate_limiter;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use screener_core::{FundamentalsProvider, PriceBar, RawFundamentals, ScreenerError};
use std::time::Duration;

pub use parse::{flatten_quote_summary, parse_chart, PayloadError};
pub use rate_limiter::RateLimiter;

const BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MAX_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    retry_wait: Duration,
}

impl YahooFinanceClient {
    /// 60 requests per minute, 30 second timeout.
    pub fn new() -> Self {
        Self::with_limits(60, Duration::from_secs(30))
    }

    pub fn with_limits(requests_per_minute: usize, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
            retry_wait: Duration::from_secs(15),
        }
    }

    /// Point the client at another host (a mirror or a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(
        &self,
        symbol: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ScreenerError> {
        let request = builder
            .build()
            .map_err(|e| ScreenerError::provider(symbol, e))?;

        for attempt in 1..=MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| ScreenerError::provider(symbol, "cannot clone request"))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| ScreenerError::provider(symbol, e))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            tracing::warn!(
                "Yahoo 429 rate limited on {}, waiting {}s before retry {}/{}",
                symbol,
                self.retry_wait.as_secs(),
                attempt,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(self.retry_wait).await;
        }

        Err(ScreenerError::provider(
            symbol,
            format!("rate limited by Yahoo after {} attempts", MAX_ATTEMPTS),
        ))
    }

    async fn get_json(
        &self,
        symbol: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ScreenerError> {
        let response = self
            .send_request(symbol, self.client.get(url).query(query))
            .await?;

        let status = response.status();
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScreenerError::provider(symbol, format!("HTTP {}: {}", status, e)))?;

        // Yahoo returns 404 with an error body for unknown tickers; let the
        // payload parser surface its message in that case.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(ScreenerError::provider(symbol, format!("HTTP {}", status)));
        }
        Ok(json)
    }

    /// Fundamentals for one ticker as a flat field map.
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<RawFundamentals, ScreenerError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let json = self
            .get_json(symbol, &url, &[("modules", parse::SUMMARY_MODULES.join(","))])
            .await?;

        flatten_quote_summary(&json).map_err(|e| ScreenerError::provider(symbol, e))
    }

    /// Daily closing prices over `range` (Yahoo range syntax: "1y", "5y", "max").
    pub async fn get_price_history(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<Vec<PriceBar>, ScreenerError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let json = self
            .get_json(
                symbol,
                &url,
                &[("range", range.to_string()), ("interval", "1d".to_string())],
            )
            .await?;

        parse_chart(&json).map_err(|e| ScreenerError::provider(symbol, e))
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFinanceClient {
    async fn fetch(&self, symbol: &str) -> Result<RawFundamentals, ScreenerError> {
        self.get_fundamentals(symbol).await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = YahooFinanceClient::new().with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_provider_failure() {
        let client = YahooFinanceClient::with_limits(10, Duration::from_secs(2))
            .with_base_url("http://127.0.0.1:1");

        match client.fetch("INFY.NS").await {
            Err(ScreenerError::ProviderFailure { symbol, .. }) => assert_eq!(symbol, "INFY.NS"),
            other => panic!("expected provider failure, got {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore] // Hits the live Yahoo API
    async fn test_live_fundamentals() {
        let client = YahooFinanceClient::new();
        let raw = client.get_fundamentals("INFY.NS").await.unwrap();

        println!("Fields: {}", raw.len());
        assert!(raw.price().is_some());
    }

    #[tokio::test]
    #[ignore] // Hits the live Yahoo API
    async fn test_live_price_history() {
        let client = YahooFinanceClient::new();
        let bars = client.get_price_history("TCS.NS", "5y").await.unwrap();

        println!("Bars: {}", bars.len());
        assert!(!bars.is_empty());
    }
}
