use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenerError {
    /// The data provider could not return anything for the symbol
    /// (network error, unknown or delisted ticker).
    #[error("Could not fetch {symbol}: {reason}")]
    ProviderFailure { symbol: String, reason: String },

    /// The provider answered but the mapping has no usable price.
    #[error("Incomplete data for {symbol}: missing {field}")]
    IncompleteData { symbol: String, field: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl ScreenerError {
    pub fn provider(symbol: impl Into<String>, reason: impl ToString) -> Self {
        ScreenerError::ProviderFailure {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the per-symbol failures a batch scan absorbs.
    pub fn is_per_symbol(&self) -> bool {
        matches!(
            self,
            ScreenerError::ProviderFailure { .. } | ScreenerError::IncompleteData { .. }
        )
    }
}
