//! Time-bounded cache of provider responses.
//!
//! The cache is an explicit value owned by whoever builds the scanner and is
//! injected into the fetch path through [`CachedProvider`]. Failed fetches
//! are never cached.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use screener_core::{FundamentalsProvider, RawFundamentals, ScreenerError};
use std::sync::Arc;

struct CacheEntry<T> {
    data: T,
    expires_at: DateTime<Utc>,
}

/// Provider responses keyed by ticker, each with an expiry timestamp.
pub struct FundamentalsCache {
    entries: DashMap<String, CacheEntry<RawFundamentals>>,
    ttl: Duration,
}

impl FundamentalsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cached mapping if still fresh. Expired entries are evicted on read.
    pub fn get(&self, symbol: &str) -> Option<RawFundamentals> {
        let now = Utc::now();
        let fresh = self
            .entries
            .get(symbol)
            .and_then(|entry| (entry.expires_at > now).then(|| entry.data.clone()));

        if fresh.is_none() {
            self.entries.remove_if(symbol, |_, entry| entry.expires_at <= now);
        }
        fresh
    }

    pub fn insert(&self, symbol: &str, data: RawFundamentals) {
        self.entries.insert(
            symbol.to_string(),
            CacheEntry {
                data,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Utc::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wraps a provider so repeat fetches within the TTL are served from cache.
pub struct CachedProvider {
    inner: Arc<dyn FundamentalsProvider>,
    cache: Arc<FundamentalsCache>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn FundamentalsProvider>, cache: Arc<FundamentalsCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl FundamentalsProvider for CachedProvider {
    async fn fetch(&self, symbol: &str) -> Result<RawFundamentals, ScreenerError> {
        if let Some(hit) = self.cache.get(symbol) {
            tracing::debug!("Cache hit for {}", symbol);
            return Ok(hit);
        }

        let raw = self.inner.fetch(symbol).await?;
        self.cache.insert(symbol, raw.clone());
        Ok(raw)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
