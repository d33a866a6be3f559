#[derive(Debug, Clone, PartialEq)]
pub enum StockUniverse {
    Custom(Vec<String>),
    NiftyLeaders,
    UsLargeCaps,
}

impl StockUniverse {
    pub fn get_symbols(&self) -> Vec<String> {
        match self {
            StockUniverse::Custom(symbols) => symbols.clone(),
            StockUniverse::NiftyLeaders => vec![
                "RELIANCE", "TCS", "HDFCBANK", "INFY", "ICICIBANK", "HINDUNILVR", "ITC", "SBIN",
                "BHARTIARTL", "KOTAKBANK", "LT", "AXISBANK", "ASIANPAINT", "MARUTI", "HCLTECH",
                "SUNPHARMA", "TITAN", "BAJFINANCE", "WIPRO", "NESTLEIND", "ULTRACEMCO", "POWERGRID",
                "NTPC", "TECHM", "ONGC", "COALINDIA", "PIDILITIND", "DIVISLAB", "BRITANNIA", "EICHERMOT",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            StockUniverse::UsLargeCaps => vec![
                "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "BRK-B", "V", "JPM", "JNJ",
                "WMT", "MA", "PG", "HD", "KO", "PEP", "COST", "MRK", "ABBV", "ADBE",
                "CSCO", "ORCL", "MCD", "NKE", "TXN",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Exchange suffix the universe's tickers need. `None` defers to the
    /// configured suffix.
    pub fn exchange_suffix(&self) -> Option<&'static str> {
        match self {
            StockUniverse::Custom(_) => None,
            StockUniverse::NiftyLeaders => Some(".NS"),
            StockUniverse::UsLargeCaps => Some(""),
        }
    }
}

impl std::str::FromStr for StockUniverse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nifty" | "nifty50" | "nse" => Ok(StockUniverse::NiftyLeaders),
            "us" | "us-large" | "sp" => Ok(StockUniverse::UsLargeCaps),
            other => Err(format!("Unknown universe: {}", other)),
        }
    }
}
