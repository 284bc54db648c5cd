use analysis_core::{AnalysisError, InstrumentSnapshot, Periodicity, StatementKind};

use crate::fields;

/// Price/earnings bound of criteria 4 and 5.
pub const PE_BOUND: f64 = 12.0;
/// Annual EPS figures averaged for the five-year price/earnings ratio.
pub const EPS_HISTORY_YEARS: usize = 5;

/// Mean of the available annual diluted EPS figures over the last `years`
/// years. `None` when no year is available.
pub fn average_annual_eps(snapshot: &InstrumentSnapshot, years: usize) -> Option<f64> {
    let available: Vec<f64> = (0..years)
        .filter_map(|year| {
            snapshot.statement_field(
                StatementKind::Income,
                fields::DILUTED_EPS,
                Periodicity::Annual,
                year * 4,
            )
        })
        .collect();
    if available.is_empty() {
        return None;
    }
    Some(available.iter().sum::<f64>() / available.len() as f64)
}

/// Current and five-year price/earnings ratios, or `None` when the EPS
/// estimate or the EPS average is not positive.
pub fn price_earnings_ratios(snapshot: &InstrumentSnapshot) -> Result<Option<[f64; 2]>, AnalysisError> {
    let last_close = snapshot.last_close()?;
    let estimate = snapshot.latest_field(StatementKind::Recommendation, fields::EPS_ESTIMATE);
    let average = average_annual_eps(snapshot, EPS_HISTORY_YEARS);
    match (estimate, average) {
        (Some(estimate), Some(average)) if estimate > 0.0 && average > 0.0 => {
            Ok(Some([last_close / estimate, last_close / average]))
        }
        _ => Ok(None),
    }
}

/// Criteria 4 and 5. `Ok(None)` means the valuation could not be computed.
///
/// The branch conditions are kept exactly as the published rule states
/// them: the first accepts any finite ratio, so the second only ever sees
/// NaN and never matches. The forward-EPS criterion has no data source and
/// contributes nothing.
#[allow(clippy::nonminimal_bool)]
pub fn score(snapshot: &InstrumentSnapshot) -> Result<Option<i32>, AnalysisError> {
    let Some(ratios) = price_earnings_ratios(snapshot)? else {
        return Ok(None);
    };
    let mut levermann = 0;
    for ratio in ratios {
        if ratio > 0.0 || ratio < PE_BOUND {
            levermann += 1;
        } else if ratio > PE_BOUND || ratio < 0.0 {
            levermann -= 1;
        }
    }
    Ok(Some(levermann))
}
