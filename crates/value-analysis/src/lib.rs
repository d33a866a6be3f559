//! Value checklist scoring: provider fields in, scored checklist out.
//!
//! [`normalize`] turns a raw provider mapping into finite scoring inputs and
//! [`ValueScoringEngine`] applies the Graham-style valuation and the four
//! checklist criteria.

pub mod engine;
pub mod normalizer;

pub use engine::{capped_growth, intrinsic_value, upside_percent, ValueScoringEngine};
pub use normalizer::normalize;
