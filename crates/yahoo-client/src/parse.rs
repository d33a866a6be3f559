use chrono::DateTime;
use screener_core::{PriceBar, RawFundamentals};
use serde_json::{Map, Value};
use thiserror::Error;

/// quoteSummary modules requested for a fundamentals fetch. Earlier modules
/// win when two report the same field.
pub const SUMMARY_MODULES: &[&str] = &[
    "financialData",
    "price",
    "defaultKeyStatistics",
    "summaryDetail",
    "assetProfile",
];

/// Why a Yahoo payload could not be turned into data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    /// Yahoo answered with an explicit error object, e.g. "Not Found".
    #[error("{0}")]
    Rejected(String),
    /// The payload had no usable result.
    #[error("no data returned")]
    Empty,
}

/// Collapse a quoteSummary response into one flat field map.
///
/// Yahoo wraps numbers as `{"raw": 0.25, "fmt": "25%"}` and reports missing
/// values as `{}`; the raw number is kept and `{}` becomes null. Arrays and
/// other nested objects are dropped.
pub fn flatten_quote_summary(json: &Value) -> Result<RawFundamentals, PayloadError> {
    let summary = json.get("quoteSummary").ok_or(PayloadError::Empty)?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        let msg = error
            .get("description")
            .or_else(|| error.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        return Err(PayloadError::Rejected(msg.to_string()));
    }

    let result = summary
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_object())
        .ok_or(PayloadError::Empty)?;

    let mut flat = Map::new();
    for module in SUMMARY_MODULES {
        let Some(fields) = result.get(*module).and_then(|m| m.as_object()) else {
            continue;
        };
        for (key, value) in fields {
            let Some(value) = unwrap_value(value) else {
                continue;
            };
            let taken = flat.get(key).is_some_and(|v: &Value| !v.is_null());
            if !taken {
                flat.insert(key.clone(), value);
            }
        }
    }

    if flat.is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(RawFundamentals::from(flat))
}

fn unwrap_value(value: &Value) -> Option<Value> {
    match value {
        Value::Object(obj) if obj.is_empty() => Some(Value::Null),
        Value::Object(obj) => obj.get("raw").cloned(),
        Value::Array(_) => None,
        other => Some(other.clone()),
    }
}

/// Daily closes from a v8 chart response. Bars with a null close
/// (holidays, halts) are skipped.
pub fn parse_chart(json: &Value) -> Result<Vec<PriceBar>, PayloadError> {
    let chart = json.get("chart").ok_or(PayloadError::Empty)?;

    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        let msg = error
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        return Err(PayloadError::Rejected(msg.to_string()));
    }

    let result = chart
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or(PayloadError::Empty)?;

    let timestamps = match result.get("timestamp").and_then(|v| v.as_array()) {
        Some(ts) => ts,
        None => return Ok(Vec::new()),
    };

    let closes = result
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|q| q.get("close"))
        .and_then(|v| v.as_array())
        .ok_or(PayloadError::Empty)?;

    let bars = timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let timestamp = DateTime::from_timestamp(ts.as_i64()?, 0)?;
            let close = close.as_f64().filter(|c| c.is_finite())?;
            Some(PriceBar { timestamp, close })
        })
        .collect();

    Ok(bars)
}
