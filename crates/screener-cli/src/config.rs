use anyhow::{Context, Result};
use screener_core::ScreenerError;
use std::env;
use std::path::PathBuf;
use value_screener::StockUniverse;

#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    // Symbol selection
    pub symbols: Vec<String>,        // SCREENER_SYMBOLS, comma separated
    pub universe: Option<String>,    // "nifty", "us-large"
    pub exchange_suffix: String,     // ".NS"

    // Scanning
    pub max_concurrency: usize,      // 1 = sequential

    // Yahoo Finance
    pub yahoo_rate_limit: usize,     // requests per minute
    pub yahoo_timeout_secs: u64,

    // Cache
    pub cache_ttl_secs: i64,

    // Output
    pub report_path: Option<PathBuf>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

pub fn split_symbols(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            symbols: env::var("SCREENER_SYMBOLS")
                .map(|v| split_symbols(&v))
                .unwrap_or_default(),
            universe: env::var("SCREENER_UNIVERSE").ok().filter(|v| !v.trim().is_empty()),
            exchange_suffix: var_or("SCREENER_EXCHANGE_SUFFIX", ".NS"),

            max_concurrency: var_or("SCREENER_CONCURRENCY", "1")
                .parse()
                .context("SCREENER_CONCURRENCY must be a whole number")?,

            yahoo_rate_limit: var_or("YAHOO_RATE_LIMIT", "60")
                .parse()
                .context("YAHOO_RATE_LIMIT must be a whole number")?,
            yahoo_timeout_secs: var_or("YAHOO_TIMEOUT_SECS", "30")
                .parse()
                .context("YAHOO_TIMEOUT_SECS must be a whole number")?,

            cache_ttl_secs: var_or("CACHE_TTL_SECS", "300")
                .parse()
                .context("CACHE_TTL_SECS must be a whole number")?,

            report_path: env::var("SCREENER_REPORT_PATH").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScreenerError> {
        let invalid = |msg: &str| -> Result<(), ScreenerError> {
            Err(ScreenerError::Config(msg.to_string()))
        };

        if self.max_concurrency == 0 {
            return invalid("SCREENER_CONCURRENCY must be at least 1");
        }
        if self.yahoo_rate_limit == 0 {
            return invalid("YAHOO_RATE_LIMIT must be at least 1");
        }
        if self.cache_ttl_secs < 0 {
            return invalid("CACHE_TTL_SECS cannot be negative");
        }
        if let Some(name) = &self.universe {
            name.parse::<StockUniverse>().map_err(ScreenerError::Config)?;
        }
        Ok(())
    }

    /// Explicit symbols win over a named universe; with neither, the NSE
    /// leaders list is scanned.
    pub fn stock_universe(&self) -> Result<StockUniverse> {
        if !self.symbols.is_empty() {
            return Ok(StockUniverse::Custom(self.symbols.clone()));
        }
        match &self.universe {
            Some(name) => name.parse().map_err(anyhow::Error::msg),
            None => Ok(StockUniverse::NiftyLeaders),
        }
    }
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            universe: None,
            exchange_suffix: ".NS".to_string(),
            max_concurrency: 1,
            yahoo_rate_limit: 60,
            yahoo_timeout_secs: 30,
            cache_ttl_secs: 300,
            report_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_symbols() {
        assert_eq!(split_symbols(" itc, tcs ,,INFY "), vec!["ITC", "TCS", "INFY"]);
        assert!(split_symbols("").is_empty());
    }

    #[test]
    fn test_default_is_valid() {
        assert!(ScreenerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = ScreenerConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScreenerError::Config(_))));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = ScreenerConfig {
            yahoo_rate_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_universe_rejected() {
        let config = ScreenerConfig {
            universe: Some("ftse".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_symbols_override_universe() {
        let config = ScreenerConfig {
            symbols: vec!["ITC".into()],
            universe: Some("us-large".into()),
            ..Default::default()
        };
        assert_eq!(
            config.stock_universe().unwrap(),
            StockUniverse::Custom(vec!["ITC".into()])
        );

        let config = ScreenerConfig {
            universe: Some("us-large".into()),
            ..Default::default()
        };
        assert_eq!(config.stock_universe().unwrap(), StockUniverse::UsLargeCaps);
        assert_eq!(
            ScreenerConfig::default().stock_universe().unwrap(),
            StockUniverse::NiftyLeaders
        );
    }
}
