//! Levermann score: thirteen criteria grouped into six sub-scores (quality,
//! valuation, mood, momentum, technique, growth) whose sum is mapped to a
//! BUY / SELL / HOLD decision.

pub mod config;
pub mod engine;
pub mod growth;
pub mod momentum;
pub mod mood;
pub mod quality;
pub mod technique;
pub mod trend;
pub mod valuation;

#[cfg(test)]
mod test_support;

pub use config::LevermannConfig;
pub use engine::{classify, compute_sub_scores, Evaluation, LevermannScore, SubScores};
pub use trend::trend_rating;

/// Vendor field names used by the criteria.
pub mod fields {
    pub const TOTAL_ASSETS: &str = "totalAssets";
    pub const TOTAL_CURRENT_LIABILITIES: &str = "totalCurrentLiabili";
    pub const ACCUMULATED_DEPRECIATION: &str = "accumulatedDepreciation";
    pub const NET_INCOME: &str = "netIncome";
    pub const NET_BEFORE_TAXES: &str = "netBeforeTaxes";
    pub const TOTAL_REVENUE: &str = "totalRevenue";
    pub const DILUTED_EPS: &str = "dilutedEpsExtraOrd";
    pub const EPS_ESTIMATE: &str = "eps";
}

/// Score a value against an upper and a lower bound: +1 above `upper`,
/// -1 below `lower`, 0 in between or when the value is unavailable.
pub(crate) fn band_score(value: Option<f64>, upper: f64, lower: f64) -> i32 {
    match value {
        Some(v) if v > upper => 1,
        Some(v) if v < lower => -1,
        _ => 0,
    }
}
