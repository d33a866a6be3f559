use async_trait::async_trait;
use crate::{RawFundamentals, ScreenerError};

/// Source of raw fundamental fields for a ticker.
///
/// Implementations own transport, retries and rate limiting. The screener
/// only ever sees a field mapping or a per-symbol error.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<RawFundamentals, ScreenerError>;

    /// Short name used in log lines.
    fn name(&self) -> &str {
        "provider"
    }
}
