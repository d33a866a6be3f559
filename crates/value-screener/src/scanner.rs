use chrono::{DateTime, Utc};
use screener_core::{fields, FundamentalsProvider, ScoreResult, ScreenerError};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use value_analysis::ValueScoringEngine;

use crate::universe::StockUniverse;

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Fetches in flight at once. 1 scans strictly one symbol at a time.
    pub max_concurrency: usize,
    /// Appended to bare symbols before they reach the provider (".NS" for NSE).
    pub exchange_suffix: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            exchange_suffix: ".NS".to_string(),
        }
    }
}

/// A requested symbol that contributed nothing to the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Ranked outcome of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Sorted by score, then upside, both descending.
    pub results: Vec<ScoreResult>,
    pub skipped: Vec<SkippedSymbol>,
    pub total_requested: usize,
    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    /// Entries scoring 3 or more, in report order.
    pub fn top_picks(&self) -> Vec<&ScoreResult> {
        self.results.iter().filter(|r| r.is_top_pick()).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    fn from_outcomes(
        outcomes: Vec<(String, Result<ScoreResult, ScreenerError>)>,
        total_requested: usize,
    ) -> Self {
        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    if e.is_per_symbol() {
                        tracing::warn!("Skipping {}: {}", symbol, e);
                    } else {
                        tracing::error!("Skipping {} after unexpected error: {}", symbol, e);
                    }
                    skipped.push(SkippedSymbol {
                        symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }

        rank(&mut results);

        Self {
            results,
            skipped,
            total_requested,
            scanned_at: Utc::now(),
        }
    }
}

/// Stable sort by score desc, then upside desc. Ties keep their scan order.
pub fn rank(results: &mut [ScoreResult]) {
    results.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.upside_percent.total_cmp(&a.upside_percent))
    });
}

/// Provider ticker for a user-entered symbol: upper-cased, with the exchange
/// suffix appended unless the symbol already carries one.
pub fn resolve_ticker(symbol: &str, suffix: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if suffix.is_empty() || symbol.contains('.') {
        symbol
    } else {
        format!("{}{}", symbol, suffix.to_uppercase())
    }
}

async fn fetch_and_score(
    provider: &dyn FundamentalsProvider,
    engine: &ValueScoringEngine,
    symbol: &str,
    suffix: &str,
) -> Result<ScoreResult, ScreenerError> {
    let display = symbol.trim().to_uppercase();
    if display.is_empty() {
        return Err(ScreenerError::provider(symbol, "empty symbol"));
    }

    let ticker = resolve_ticker(&display, suffix);
    let raw = provider.fetch(&ticker).await?;

    if raw.price().is_none() {
        return Err(ScreenerError::IncompleteData {
            symbol: display,
            field: fields::CURRENT_PRICE.to_string(),
        });
    }

    Ok(engine.evaluate(&display, &raw))
}

pub struct ValueScreener {
    provider: Arc<dyn FundamentalsProvider>,
    engine: Arc<ValueScoringEngine>,
    config: ScannerConfig,
}

impl ValueScreener {
    pub fn new(provider: Arc<dyn FundamentalsProvider>) -> Self {
        Self {
            provider,
            engine: Arc::new(ValueScoringEngine::new()),
            config: ScannerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Score a single symbol, surfacing fetch failures instead of dropping them.
    pub async fn analyze_symbol(&self, symbol: &str) -> Result<ScoreResult, ScreenerError> {
        fetch_and_score(
            self.provider.as_ref(),
            &self.engine,
            symbol,
            &self.config.exchange_suffix,
        )
        .await
    }

    pub async fn scan(&self, symbols: &[String]) -> ScanReport {
        let suffix = self.config.exchange_suffix.clone();
        self.scan_with_suffix(symbols, &suffix).await
    }

    pub async fn scan_universe(&self, universe: &StockUniverse) -> ScanReport {
        let suffix = universe
            .exchange_suffix()
            .map(str::to_string)
            .unwrap_or_else(|| self.config.exchange_suffix.clone());
        self.scan_with_suffix(&universe.get_symbols(), &suffix).await
    }

    /// Fetch and score every symbol, skip the ones that fail, and rank the rest.
    ///
    /// Final order comes from [`rank`] over results in input order, so it does
    /// not depend on which fetch finished first.
    pub async fn scan_with_suffix(&self, symbols: &[String], suffix: &str) -> ScanReport {
        let total_requested = symbols.len();
        tracing::info!(
            "📊 Starting value scan of {} symbols via {} (concurrency {})",
            total_requested,
            self.provider.name(),
            self.config.max_concurrency
        );

        let outcomes = if self.config.max_concurrency <= 1 {
            self.scan_sequential(symbols, suffix).await
        } else {
            self.scan_concurrent(symbols, suffix).await
        };

        let report = ScanReport::from_outcomes(outcomes, total_requested);

        tracing::info!(
            "✅ Scan complete: {}/{} symbols scored, {} top picks",
            report.len(),
            total_requested,
            report.top_picks().len()
        );

        report
    }

    async fn scan_sequential(
        &self,
        symbols: &[String],
        suffix: &str,
    ) -> Vec<(String, Result<ScoreResult, ScreenerError>)> {
        let mut outcomes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let outcome = fetch_and_score(self.provider.as_ref(), &self.engine, symbol, suffix).await;
            outcomes.push((symbol.clone(), outcome));
        }
        outcomes
    }

    async fn scan_concurrent(
        &self,
        symbols: &[String],
        suffix: &str,
    ) -> Vec<(String, Result<ScoreResult, ScreenerError>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, symbol) in symbols.iter().cloned().enumerate() {
            let sem = Arc::clone(&semaphore);
            let provider = Arc::clone(&self.provider);
            let engine = Arc::clone(&self.engine);
            let suffix = suffix.to_string();

            tasks.spawn(async move {
                let outcome = match sem.acquire_owned().await {
                    Ok(_permit) => {
                        fetch_and_score(provider.as_ref(), &engine, &symbol, &suffix).await
                    }
                    Err(e) => Err(ScreenerError::provider(symbol.as_str(), e)),
                };
                (index, symbol, outcome)
            });
        }

        let mut indexed = Vec::with_capacity(symbols.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(item) => indexed.push(item),
                Err(e) => tracing::error!("Scan task error: {}", e),
            }
        }

        // Back to input order so ranking ties stay deterministic.
        indexed.sort_by_key(|(index, _, _)| *index);
        indexed
            .into_iter()
            .map(|(_, symbol, outcome)| (symbol, outcome))
            .collect()
    }
}
