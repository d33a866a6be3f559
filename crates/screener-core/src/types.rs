use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-quality flags raised while normalizing provider fields.
/// They never change the numbers used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DataWarning {
    /// Neither a live nor a regular-market price was present; price is 0.
    MissingPrice,
    /// Normalized debt/equity outside the plausible range; the provider may
    /// have changed its scaling convention.
    DebtToEquityOutOfRange(f64),
    /// Earnings growth was absent, so the default estimate was used.
    GrowthDefaulted,
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::MissingPrice => write!(f, "no price reported"),
            DataWarning::DebtToEquityOutOfRange(de) => {
                write!(f, "debt/equity {:.2} outside expected range", de)
            }
            DataWarning::GrowthDefaulted => write!(f, "earnings growth missing, default used"),
        }
    }
}

/// Scoring inputs extracted from a provider mapping. Every number is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInputs {
    pub current_price: f64,
    pub eps: f64,
    /// Percent
    pub roe: f64,
    /// Plain ratio
    pub debt_to_equity: f64,
    /// Percent
    pub op_margin: f64,
    /// Percent
    pub growth_estimate: f64,
    #[serde(default)]
    pub warnings: Vec<DataWarning>,
}

/// Verdict derived from the checklist score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Watch,
    Avoid,
}

impl Recommendation {
    /// `score` is a checklist count in 0..=4.
    pub fn from_score(score: u8) -> Self {
        debug_assert!(score <= 4, "checklist score out of range: {}", score);
        match score {
            4 => Recommendation::StrongBuy,
            3 => Recommendation::Buy,
            2 => Recommendation::Watch,
            _ => Recommendation::Avoid,
        }
    }

    /// Verdict label used in reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Watch => "WAIT / WATCH",
            Recommendation::Avoid => "AVOID",
        }
    }

    /// Display colour for the verdict
    pub fn color(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "green",
            Recommendation::Buy => "lightgreen",
            Recommendation::Watch => "orange",
            Recommendation::Avoid => "red",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pass/fail outcome of the four checklist criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checklist {
    pub margin_of_safety: bool,
    pub high_roe: bool,
    pub low_debt: bool,
    pub strong_moat: bool,
}

impl Checklist {
    pub fn passed(&self) -> u8 {
        [self.margin_of_safety, self.high_roe, self.low_debt, self.strong_moat]
            .iter()
            .filter(|&&v| v)
            .count() as u8
    }
}

/// One line of the human-readable checklist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistRow {
    pub criterion: &'static str,
    pub value: String,
    pub passed: bool,
}

/// Scored checklist for one symbol. Built once by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub symbol: String,
    pub price: f64,
    pub intrinsic_value: f64,
    /// 0 when price is 0
    pub upside_percent: f64,
    /// Growth actually used in the valuation, within [0, 15]
    pub capped_growth: f64,
    pub score: u8,
    pub recommendation: Recommendation,
    pub checklist: Checklist,
    pub roe: f64,
    pub debt_to_equity: f64,
    pub op_margin: f64,
    #[serde(default)]
    pub warnings: Vec<DataWarning>,
    #[serde(default)]
    pub company_summary: Option<String>,
    pub scored_at: DateTime<Utc>,
}

impl ScoreResult {
    pub fn is_top_pick(&self) -> bool {
        self.score >= 3
    }

    pub fn checklist_rows(&self) -> Vec<ChecklistRow> {
        vec![
            ChecklistRow {
                criterion: "Undervalued (Margin of Safety)",
                value: format!("{} vs {:.2}", self.price, self.intrinsic_value),
                passed: self.checklist.margin_of_safety,
            },
            ChecklistRow {
                criterion: "High ROE (>15%)",
                value: format!("{:.2}%", self.roe),
                passed: self.checklist.high_roe,
            },
            ChecklistRow {
                criterion: "Low Debt (D/E < 0.5)",
                value: format!("{:.2}", self.debt_to_equity),
                passed: self.checklist.low_debt,
            },
            ChecklistRow {
                criterion: "Strong Moat (Margin > 20%)",
                value: format!("{:.2}%", self.op_margin),
                passed: self.checklist.strong_moat,
            },
        ]
    }

    /// "12.3% Upside" when the margin of safety holds, otherwise "-8.0% Overvalued".
    pub fn valuation_label(&self) -> String {
        if self.checklist.margin_of_safety {
            format!("{:.1}% Upside", self.upside_percent)
        } else {
            format!("{:.1}% Overvalued", self.upside_percent)
        }
    }
}

/// Daily closing price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Summary of a closing-price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub first_close: f64,
    pub last_close: f64,
    pub min_close: f64,
    pub max_close: f64,
    /// Percent change from first to last close
    pub total_return_percent: f64,
}

impl PriceSummary {
    /// `None` for an empty history.
    pub fn from_bars(bars: &[PriceBar]) -> Option<Self> {
        let first = bars.first()?;
        let last = bars.last()?;

        let min_close = bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
        let max_close = bars.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
        let total_return_percent = if first.close != 0.0 {
            (last.close - first.close) / first.close * 100.0
        } else {
            0.0
        };

        Some(Self {
            start: first.timestamp,
            end: last.timestamp,
            first_close: first.close,
            last_close: last.close,
            min_close,
            max_close,
            total_return_percent,
        })
    }
}
