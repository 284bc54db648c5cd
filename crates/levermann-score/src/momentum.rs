use analysis_core::{AnalysisError, InstrumentSnapshot};
use serde::{Deserialize, Serialize};

use crate::band_score;
use crate::trend::{percent_change, relative_change, trend_rating};

/// Trend snapshot taken roughly four weeks before the latest one.
pub const FOUR_WEEK_SNAPSHOT: usize = 2;
/// Relative price change that counts as a move (5 %).
pub const PERFORMANCE_BOUND: f64 = 0.05;
/// Rating change, in percent, above which the analyst trend scores.
pub const RATING_CHANGE_BOUND: f64 = 10.0;

/// Price performance over the lookback window, as relative changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Last close against the close in the middle of the window
    pub six_months: Option<f64>,
    /// Last close against the first close of the window
    pub twelve_months: Option<f64>,
}

/// Change of the four-week-old rating measured against the current one,
/// in percent. `None` when the current rating is zero.
pub fn rating_change_percent(snapshot: &InstrumentSnapshot) -> Result<Option<f64>, AnalysisError> {
    let rating = trend_rating(&snapshot.trend(0)?.distribution);
    let rating_4w = trend_rating(&snapshot.trend(FOUR_WEEK_SNAPSHOT)?.distribution);
    Ok(percent_change(rating, rating_4w))
}

pub fn performance(closes: &[f64]) -> Result<Performance, AnalysisError> {
    let (Some(&first), Some(&last)) = (closes.first(), closes.last()) else {
        return Err(AnalysisError::InsufficientData(
            "no closes to measure performance".to_string(),
        ));
    };
    let mid = closes[closes.len() / 2];
    Ok(Performance {
        six_months: relative_change(mid, last),
        twelve_months: relative_change(first, last),
    })
}

/// Criteria 8 (rating trend, standing in for EPS revisions), 9 and 10
/// (6 and 12 month performance) and 11 (price momentum).
pub fn score(snapshot: &InstrumentSnapshot) -> Result<i32, AnalysisError> {
    let rating_change = rating_change_percent(snapshot)?;
    let perf = performance(&snapshot.closes())?;

    let mut levermann = 0;

    // Both branches as published: anything not above 10 % but below it scores -1
    match rating_change {
        Some(change) if change > RATING_CHANGE_BOUND => levermann += 1,
        Some(change) if change < RATING_CHANGE_BOUND => levermann -= 1,
        _ => {}
    }

    levermann += band_score(perf.six_months, PERFORMANCE_BOUND, -PERFORMANCE_BOUND);
    levermann += band_score(perf.twelve_months, PERFORMANCE_BOUND, -PERFORMANCE_BOUND);

    if let (Some(p6), Some(p12)) = (perf.six_months, perf.twelve_months) {
        let flat_12m = p12 < PERFORMANCE_BOUND && p12 > -PERFORMANCE_BOUND;
        if p6 > PERFORMANCE_BOUND && (flat_12m || p12 < -PERFORMANCE_BOUND) {
            levermann += 1;
        } else if p6 < -PERFORMANCE_BOUND && (flat_12m || p12 > PERFORMANCE_BOUND) {
            levermann -= 1;
        }
    }

    Ok(levermann)
}
