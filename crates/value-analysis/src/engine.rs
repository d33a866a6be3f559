use chrono::Utc;
use screener_core::{
    fields, Checklist, NormalizedInputs, RawFundamentals, Recommendation, ScoreResult,
};

use crate::normalizer::normalize;

/// Perpetual growth above this is not trusted to persist.
pub const MAX_GROWTH_PERCENT: f64 = 15.0;
/// Graham's base P/E for a no-growth company.
pub const BASE_MULTIPLE: f64 = 8.5;

pub const MIN_ROE_PERCENT: f64 = 15.0;
pub const MAX_DEBT_TO_EQUITY: f64 = 0.5;
pub const MIN_OPERATING_MARGIN_PERCENT: f64 = 20.0;

/// Growth used in the valuation: floored at 0, capped at 15.
pub fn capped_growth(growth_percent: f64) -> f64 {
    growth_percent.clamp(0.0, MAX_GROWTH_PERCENT)
}

/// Graham estimate `eps * (8.5 + 2g)`. Loss-making companies get 0, as
/// does an estimate too large to represent.
pub fn intrinsic_value(eps: f64, capped_growth: f64) -> f64 {
    if eps <= 0.0 {
        return 0.0;
    }
    let value = eps * (BASE_MULTIPLE + 2.0 * capped_growth);
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Percent difference between fair value and price; 0 when price is 0 or
/// the ratio overflows.
pub fn upside_percent(intrinsic_value: f64, price: f64) -> f64 {
    if price == 0.0 {
        return 0.0;
    }
    let upside = (intrinsic_value - price) / price * 100.0;
    if upside.is_finite() {
        upside
    } else {
        0.0
    }
}

/// Scores a company against the four-point value checklist:
/// margin of safety, ROE above 15%, debt/equity below 0.5 and
/// operating margin above 20%.
///
/// Financial-sector companies carry structurally high leverage and will
/// always fail the debt criterion.
pub struct ValueScoringEngine;

impl ValueScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, symbol: &str, inputs: &NormalizedInputs) -> ScoreResult {
        let price = inputs.current_price;
        let growth = capped_growth(inputs.growth_estimate);
        let fair_value = intrinsic_value(inputs.eps, growth);

        // A zero fair value means "undefined", so it can never signal cheapness.
        let checklist = Checklist {
            margin_of_safety: price < fair_value && fair_value > 0.0,
            high_roe: inputs.roe > MIN_ROE_PERCENT,
            low_debt: inputs.debt_to_equity < MAX_DEBT_TO_EQUITY,
            strong_moat: inputs.op_margin > MIN_OPERATING_MARGIN_PERCENT,
        };
        let score = checklist.passed();

        ScoreResult {
            symbol: symbol.to_string(),
            price,
            intrinsic_value: fair_value,
            upside_percent: upside_percent(fair_value, price),
            capped_growth: growth,
            score,
            recommendation: Recommendation::from_score(score),
            checklist,
            roe: inputs.roe,
            debt_to_equity: inputs.debt_to_equity,
            op_margin: inputs.op_margin,
            warnings: inputs.warnings.clone(),
            company_summary: None,
            scored_at: Utc::now(),
        }
    }

    /// Normalize and score a raw provider mapping, keeping the business
    /// description for display.
    pub fn evaluate(&self, symbol: &str, raw: &RawFundamentals) -> ScoreResult {
        let inputs = normalize(raw);
        let mut result = self.score(symbol, &inputs);
        result.company_summary = raw
            .text(fields::LONG_BUSINESS_SUMMARY)
            .map(str::to_string);
        result
    }
}

impl Default for ValueScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn inputs(price: f64, eps: f64, roe: f64, de: f64, margin: f64, growth: f64) -> NormalizedInputs {
        NormalizedInputs {
            current_price: price,
            eps,
            roe,
            debt_to_equity: de,
            op_margin: margin,
            growth_estimate: growth,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_graham_example() {
        let engine = ValueScoringEngine::new();
        let result = engine.score("TCS", &inputs(400.0, 50.0, 10.0, 1.0, 10.0, 20.0));

        assert_relative_eq!(result.capped_growth, 15.0);
        assert_relative_eq!(result.intrinsic_value, 1925.0);
        assert!(result.checklist.margin_of_safety);
        assert_relative_eq!(result.upside_percent, 381.25, epsilon = 1e-9);
        assert_eq!(result.score, 1);
        assert_eq!(result.recommendation, Recommendation::Avoid);
    }

    #[test]
    fn test_loss_maker_has_no_intrinsic_value() {
        let engine = ValueScoringEngine::new();
        for (price, growth) in [(0.0, 10.0), (5.0, -20.0), (1000.0, 40.0)] {
            let result = engine.score("LOSS", &inputs(price, -5.0, 30.0, 0.1, 30.0, growth));
            assert_eq!(result.intrinsic_value, 0.0);
            assert!(!result.checklist.margin_of_safety);
            assert_eq!(result.score, 3);
        }
    }

    #[test]
    fn test_zero_eps_is_degenerate() {
        let result = ValueScoringEngine::new().score("ZERO", &inputs(10.0, 0.0, 0.0, 0.0, 0.0, 5.0));
        assert_eq!(result.intrinsic_value, 0.0);
        assert!(!result.checklist.margin_of_safety);
    }

    #[test]
    fn test_zero_price_upside_is_zero() {
        let result = ValueScoringEngine::new().score("NOPX", &inputs(0.0, 10.0, 0.0, 0.0, 0.0, 5.0));
        assert_eq!(result.upside_percent, 0.0);
        // Price 0 is still below a positive fair value.
        assert!(result.checklist.margin_of_safety);
    }

    #[test]
    fn test_extreme_magnitudes_stay_finite() {
        let engine = ValueScoringEngine::new();
        let raw = RawFundamentals::new()
            .with(fields::CURRENT_PRICE, 10.0)
            .with(fields::TRAILING_EPS, 1e308)
            .with(fields::RETURN_ON_EQUITY, 1e307)
            .with(fields::OPERATING_MARGINS, -1e307);
        let result = engine.evaluate("HUGE", &raw);

        assert_eq!(result.intrinsic_value, 0.0);
        assert!(!result.checklist.margin_of_safety);
        assert_relative_eq!(result.upside_percent, -100.0);
        assert!(result.roe.is_finite());
        assert!(result.op_margin.is_finite());

        assert_eq!(upside_percent(f64::MAX, 1e-300), 0.0);
    }

    #[test]
    fn test_capped_growth_bounds() {
        for g in [-50.0, -0.1, 0.0, 7.5, 15.0, 15.1, 300.0] {
            let c = capped_growth(g);
            assert!((0.0..=15.0).contains(&c), "growth {} capped to {}", g, c);
        }
        assert_eq!(capped_growth(-4.0), 0.0);
        assert_eq!(capped_growth(22.0), 15.0);
        assert_eq!(capped_growth(9.0), 9.0);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let engine = ValueScoringEngine::new();
        let at_limits = engine.score("EDGE", &inputs(100.0, 1.0, 15.0, 0.5, 20.0, 0.0));
        assert!(!at_limits.checklist.high_roe);
        assert!(!at_limits.checklist.low_debt);
        assert!(!at_limits.checklist.strong_moat);

        let inside = engine.score("EDGE", &inputs(100.0, 1.0, 15.01, 0.49, 20.01, 0.0));
        assert!(inside.checklist.high_roe);
        assert!(inside.checklist.low_debt);
        assert!(inside.checklist.strong_moat);
    }

    #[test]
    fn test_score_counts_passing_criteria() {
        let engine = ValueScoringEngine::new();
        let cases = [
            (inputs(100.0, 10.0, 20.0, 0.2, 25.0, 10.0), 4, Recommendation::StrongBuy),
            (inputs(500.0, 10.0, 20.0, 0.2, 25.0, 10.0), 3, Recommendation::Buy),
            (inputs(500.0, 10.0, 20.0, 0.9, 25.0, 10.0), 2, Recommendation::Watch),
            (inputs(500.0, 10.0, 20.0, 0.9, 5.0, 10.0), 1, Recommendation::Avoid),
            (inputs(500.0, 10.0, 2.0, 0.9, 5.0, 10.0), 0, Recommendation::Avoid),
        ];

        for (input, expected_score, expected_rec) in cases {
            let result = engine.score("X", &input);
            assert_eq!(result.score, expected_score);
            assert_eq!(result.score, result.checklist.passed());
            assert_eq!(result.recommendation, expected_rec);
        }
    }

    #[test]
    fn test_evaluate_from_raw_fields() {
        let raw = RawFundamentals::from_json(json!({
            "currentPrice": 1400.0,
            "trailingEps": 60.0,
            "returnOnEquity": 0.18,
            "debtToEquity": 60.0,
            "operatingMargins": 0.21,
            "earningsGrowth": 0.08,
            "longBusinessSummary": "IT services and consulting.",
        }))
        .unwrap();

        let result = ValueScoringEngine::new().evaluate("INFY", &raw);
        // 60 * (8.5 + 16) = 1470
        assert_relative_eq!(result.intrinsic_value, 1470.0, epsilon = 1e-9);
        assert!(result.checklist.margin_of_safety);
        assert!(result.checklist.high_roe);
        assert!(!result.checklist.low_debt);
        assert!(result.checklist.strong_moat);
        assert_eq!(result.score, 3);
        assert_eq!(result.company_summary.as_deref(), Some("IT services and consulting."));
    }

    #[test]
    fn test_checklist_rows_and_valuation_label() {
        let result = ValueScoringEngine::new().score("TCS", &inputs(500.0, 50.0, 18.0, 0.45, 12.0, 20.0));
        let rows = result.checklist_rows();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].criterion, "Undervalued (Margin of Safety)");
        assert_eq!(rows[0].value, "500 vs 1925.00");
        assert_eq!(rows[1].value, "18.00%");
        assert_eq!(rows[2].value, "0.45");
        assert!(rows[2].passed);
        assert!(!rows[3].passed);
        assert_eq!(result.valuation_label(), "285.0% Upside");

        let pricey = ValueScoringEngine::new().score("PRICEY", &inputs(1000.0, 10.0, 0.0, 0.0, 0.0, 0.0));
        // 85 vs 1000
        assert_eq!(pricey.valuation_label(), "-91.5% Overvalued");
    }
}
