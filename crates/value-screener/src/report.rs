use std::fmt::Write;

use screener_core::ScoreResult;

use crate::scanner::ScanReport;

const RULE_WIDTH: usize = 92;

fn rule(out: &mut String, ch: char) {
    out.extend(std::iter::repeat(ch).take(RULE_WIDTH));
    out.push('\n');
}

/// Plain-text rendering of a ranked report for terminal output.
pub fn render_table(report: &ScanReport) -> String {
    let rows: Vec<&ScoreResult> = report.results.iter().collect();
    render(report, &rows)
}

/// Same layout as [`render_table`], but the table lists only top picks.
/// The header still counts every scored symbol.
pub fn render_top_picks(report: &ScanReport) -> String {
    render(report, &report.top_picks())
}

fn render(report: &ScanReport, rows: &[&ScoreResult]) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Value scan {}: {} of {} symbols scored",
        report.scanned_at.format("%Y-%m-%d %H:%M UTC"),
        report.len(),
        report.total_requested
    );
    rule(&mut out, '=');

    if report.is_empty() {
        let _ = writeln!(out, "No symbols could be scored.");
    } else if rows.is_empty() {
        let _ = writeln!(out, "No symbols to show.");
    } else {
        let _ = writeln!(
            out,
            "{:<14} {:>10} {:>12} {:>9} {:>5}  {:<14} {:>7} {:>7} {:>7}",
            "Symbol", "Price", "Intrinsic", "Upside %", "Score", "Verdict", "ROE %", "D/E", "OPM %"
        );
        rule(&mut out, '-');
        for r in rows {
            let _ = writeln!(
                out,
                "{:<14} {:>10.2} {:>12.2} {:>9.2} {:>5}  {:<14} {:>7.2} {:>7.2} {:>7.2}",
                r.symbol,
                r.price,
                r.intrinsic_value,
                r.upside_percent,
                format!("{}/4", r.score),
                r.recommendation.label(),
                r.roe,
                r.debt_to_equity,
                r.op_margin
            );
        }
    }

    let picks = report.top_picks();
    out.push('\n');
    let _ = writeln!(out, "Top picks (score 3+): {}", picks.len());
    rule(&mut out, '-');
    if picks.is_empty() {
        let _ = writeln!(out, "None this scan.");
    }
    for r in picks {
        let _ = writeln!(
            out,
            "{:<14} {:<12} {}",
            r.symbol,
            r.recommendation.label(),
            r.valuation_label()
        );
    }

    if !report.skipped.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Skipped ({}):", report.skipped.len());
        for s in &report.skipped {
            let _ = writeln!(out, "  {:<14} {}", s.symbol, s.reason);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::SkippedSymbol;
    use chrono::Utc;
    use screener_core::{NormalizedInputs, ScoreResult};
    use value_analysis::ValueScoringEngine;

    fn scored(symbol: &str, price: f64, op_margin: f64) -> ScoreResult {
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

    fn report(results: Vec<ScoreResult>, skipped: Vec<SkippedSymbol>) -> ScanReport {
        ScanReport {
            total_requested: results.len() + skipped.len(),
            results,
            skipped,
            scanned_at: Utc::now(),
        }
    }

    #[test]
    fn test_rows_and_top_picks() {
        let table = render_table(&report(
            vec![scored("TCS", 500.0, 24.5), scored("ITC", 5000.0, 0.0)],
            Vec::new(),
        ));

        assert!(table.contains("2 of 2 symbols scored"));
        let tcs_row = table.lines().find(|l| l.starts_with("TCS ")).unwrap();
        assert!(tcs_row.contains("1925.00"));
        assert!(tcs_row.contains("4/4"));
        assert!(tcs_row.contains("STRONG BUY"));

        let picks = table.split("Top picks").nth(1).unwrap();
        assert!(picks.contains("TCS"));
        assert!(picks.contains("285.0% Upside"));
        assert!(!picks.contains("ITC"));
    }

    #[test]
    fn test_top_picks_view_keeps_scored_count() {
        let table = render_top_picks(&report(
            vec![scored("TCS", 500.0, 24.5), scored("ITC", 5000.0, 0.0)],
            Vec::new(),
        ));

        assert!(table.contains("2 of 2 symbols scored"));
        assert!(table.lines().any(|l| l.starts_with("TCS ")));
        assert!(!table.contains("ITC"));
    }

    #[test]
    fn test_empty_report() {
        let table = render_table(&report(
            Vec::new(),
            vec![SkippedSymbol {
                symbol: "XYZ".into(),
                reason: "Could not fetch XYZ.NS: not found".into(),
            }],
        ));

        assert!(table.contains("No symbols could be scored."));
        assert!(table.contains("Top picks (score 3+): 0"));
        assert!(table.contains("Skipped (1):"));
        assert!(table.contains("XYZ"));
    }
}
