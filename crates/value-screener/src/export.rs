//! Flat tabular export of a ranked report.
//!
//! Column order and names are an interchange format shared with downstream
//! spreadsheets; keep them stable.

use screener_core::{ScoreResult, ScreenerError};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

pub const CSV_HEADERS: [&str; 9] = [
    "Symbol",
    "Price",
    "Intrinsic Value",
    "Upside %",
    "Score",
    "Recommendation",
    "ROE %",
    "Debt/Eq",
    "Op. Margin %",
];

#[derive(Serialize)]
struct ReportRow<'a> {
    symbol: &'a str,
    price: String,
    intrinsic_value: String,
    upside_percent: String,
    score: u8,
    recommendation: &'static str,
    roe: String,
    debt_to_equity: String,
    op_margin: String,
}

impl<'a> From<&'a ScoreResult> for ReportRow<'a> {
    fn from(r: &'a ScoreResult) -> Self {
        Self {
            symbol: &r.symbol,
            price: format!("{:.2}", r.price),
            intrinsic_value: format!("{:.2}", r.intrinsic_value),
            upside_percent: format!("{:.2}", r.upside_percent),
            score: r.score,
            recommendation: r.recommendation.label(),
            roe: format!("{:.2}", r.roe),
            debt_to_equity: format!("{:.2}", r.debt_to_equity),
            op_margin: format!("{:.2}", r.op_margin),
        }
    }
}

fn export_err(e: impl ToString) -> ScreenerError {
    ScreenerError::Export(e.to_string())
}

/// Write the header row and one row per result, in the order given.
pub fn write_csv<W: io::Write>(results: &[ScoreResult], writer: W) -> Result<(), ScreenerError> {
    // Header is written by hand so an empty report still has one.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADERS).map_err(export_err)?;
    for result in results {
        wtr.serialize(ReportRow::from(result)).map_err(export_err)?;
    }
    wtr.flush().map_err(export_err)?;
    Ok(())
}

pub fn to_csv_string(results: &[ScoreResult]) -> Result<String, ScreenerError> {
    let mut buf = Vec::new();
    write_csv(results, &mut buf)?;
    String::from_utf8(buf).map_err(export_err)
}

/// Save to `path`, adding a `.csv` extension if none is given and creating
/// parent directories.
pub fn save_csv(results: &[ScoreResult], path: &Path) -> Result<PathBuf, ScreenerError> {
    let file_path = if path.extension().is_none() {
        path.with_extension("csv")
    } else {
        path.to_path_buf()
    };

    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(export_err)?;
    }

    let file = std::fs::File::create(&file_path).map_err(export_err)?;
    write_csv(results, file)?;

    tracing::info!("Report saved to {}", file_path.display());
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::NormalizedInputs;
    use value_analysis::ValueScoringEngine;

    fn scored_with_margin(symbol: &str, price: f64, op_margin: f64) -> ScoreResult {
        let inputs = NormalizedInputs {
            current_price: price,
            eps: 50.0,
            roe: 18.0,
            debt_to_equity: 0.45,
            op_margin,
            growth_estimate: 20.0,
            warnings: Vec::new(),
        };
        ValueScoringEngine::new().score(symbol, &inputs)
    }

    fn scored(symbol: &str, price: f64) -> ScoreResult {
        scored_with_margin(symbol, price, 24.5)
    }

    #[test]
    fn test_header_is_exact() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(
            csv,
            "Symbol,Price,Intrinsic Value,Upside %,Score,Recommendation,ROE %,Debt/Eq,Op. Margin %\n"
        );
    }

    #[test]
    fn test_rows_follow_report_order() {
        let csv = to_csv_string(&[scored("TCS", 400.0), scored("INFY", 2500.0)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "TCS,400.00,1925.00,381.25,4,STRONG BUY,18.00,0.45,24.50");
        assert_eq!(lines[2], "INFY,2500.00,1925.00,-23.00,3,BUY,18.00,0.45,24.50");
    }

    #[test]
    fn test_watch_label_is_written_verbatim() {
        let csv = to_csv_string(&[scored_with_margin("M&M", 5000.0, 0.0)]).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "M&M,5000.00,1925.00,-61.50,2,WAIT / WATCH,18.00,0.45,0.00"
        );
    }

    #[test]
    fn test_save_adds_extension() {
        let dir = std::env::temp_dir().join(format!("value-screener-export-{}", std::process::id()));
        let path = save_csv(&[scored("TCS", 400.0)], &dir.join("nested").join("scan")).unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Symbol,Price"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
