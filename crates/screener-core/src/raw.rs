use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provider field names. Units follow the provider's conventions:
/// `returnOnEquity`, `operatingMargins` and `earningsGrowth` are fractions,
/// `debtToEquity` is pre-multiplied by 100.
pub mod fields {
    pub const CURRENT_PRICE: &str = "currentPrice";
    pub const REGULAR_MARKET_PRICE: &str = "regularMarketPrice";
    pub const TRAILING_EPS: &str = "trailingEps";
    pub const RETURN_ON_EQUITY: &str = "returnOnEquity";
    pub const DEBT_TO_EQUITY: &str = "debtToEquity";
    pub const OPERATING_MARGINS: &str = "operatingMargins";
    pub const EARNINGS_GROWTH: &str = "earningsGrowth";
    pub const MARKET_CAP: &str = "marketCap";
    pub const LONG_BUSINESS_SUMMARY: &str = "longBusinessSummary";
}

/// Field mapping for one symbol as returned by a data provider.
///
/// Any field may be absent or null. Numeric reads treat absent, null,
/// non-numeric and non-finite values alike as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFundamentals(Map<String, Value>);

impl RawFundamentals {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps a JSON value; anything other than an object yields `None`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// Whether the key exists at all, even with a null value.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Numeric value of a field. Numeric strings ("12.5") are accepted.
    pub fn number(&self, field: &str) -> Option<f64> {
        let value = match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Live price, falling back to the regular-market price.
    pub fn price(&self) -> Option<f64> {
        self.number(fields::CURRENT_PRICE)
            .or_else(|| self.number(fields::REGULAR_MARKET_PRICE))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawFundamentals {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
