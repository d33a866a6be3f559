use screener_core::{fields, DataWarning, NormalizedInputs, RawFundamentals};

/// Earnings growth (fraction) assumed when the provider reports none.
pub const DEFAULT_EARNINGS_GROWTH: f64 = 0.05;

/// Plausible range for a normalized debt/equity ratio.
pub const DEBT_TO_EQUITY_BOUNDS: (f64, f64) = (0.0, 50.0);

/// Scaled value, or `None` if scaling overflowed.
fn scaled(value: f64, factor: f64) -> Option<f64> {
    Some(value * factor).filter(|v| v.is_finite())
}

/// Extract scoring inputs from a provider mapping.
///
/// Never fails: absent, null and malformed fields resolve to defaults.
/// Fractions (ROE, operating margin, growth) become percentages and the
/// provider's x100 debt/equity becomes a plain ratio.
pub fn normalize(raw: &RawFundamentals) -> NormalizedInputs {
    let mut warnings = Vec::new();

    let current_price = match raw.price() {
        Some(p) => p.max(0.0),
        None => {
            warnings.push(DataWarning::MissingPrice);
            0.0
        }
    };

    let eps = raw.number(fields::TRAILING_EPS).unwrap_or(0.0);
    let roe = raw
        .number(fields::RETURN_ON_EQUITY)
        .and_then(|v| scaled(v, 100.0))
        .unwrap_or(0.0);
    let debt_to_equity = raw.number(fields::DEBT_TO_EQUITY).unwrap_or(0.0) / 100.0;
    let op_margin = raw
        .number(fields::OPERATING_MARGINS)
        .and_then(|v| scaled(v, 100.0))
        .unwrap_or(0.0);

    // A reported 0 is real data; only a missing value takes the default.
    let growth_estimate = match raw.number(fields::EARNINGS_GROWTH).and_then(|g| scaled(g, 100.0)) {
        Some(g) => g,
        None => {
            warnings.push(DataWarning::GrowthDefaulted);
            DEFAULT_EARNINGS_GROWTH * 100.0
        }
    };

    let (lo, hi) = DEBT_TO_EQUITY_BOUNDS;
    if !(lo..=hi).contains(&debt_to_equity) {
        warnings.push(DataWarning::DebtToEquityOutOfRange(debt_to_equity));
    }

    NormalizedInputs {
        current_price,
        eps,
        roe,
        debt_to_equity,
        op_margin,
        growth_estimate,
        warnings,
    }
}
