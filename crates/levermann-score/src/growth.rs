use analysis_core::{InstrumentSnapshot, Periodicity, StatementKind};

use crate::valuation::EPS_HISTORY_YEARS;
use crate::{band_score, fields};

/// Most recent annual diluted EPS among the trailing five years.
pub fn latest_annual_eps(snapshot: &InstrumentSnapshot) -> Option<f64> {
    (0..EPS_HISTORY_YEARS).find_map(|year| {
        snapshot.statement_field(
            StatementKind::Income,
            fields::DILUTED_EPS,
            Periodicity::Annual,
            year * 4,
        )
    })
}

/// Difference between this year's EPS estimate and the last reported EPS,
/// in percent of the estimate. A missing last EPS counts as 0; a missing
/// or zero estimate gives `None`.
pub fn eps_difference_percent(snapshot: &InstrumentSnapshot) -> Option<f64> {
    let estimate = snapshot.latest_field(StatementKind::Recommendation, fields::EPS_ESTIMATE)?;
    if estimate == 0.0 {
        return None;
    }
    let last = latest_annual_eps(snapshot).unwrap_or(0.0);
    Some(100.0 * (estimate - last) / estimate)
}

/// Criterion 13: expected earnings growth.
pub fn score(snapshot: &InstrumentSnapshot) -> i32 {
    band_score(eps_difference_percent(snapshot), 5.0, -5.0)
}
