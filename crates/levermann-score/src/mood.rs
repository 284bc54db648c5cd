use analysis_core::{AnalysisError, Bar, InstrumentSnapshot};
use chrono::NaiveDate;

use crate::band_score;
use crate::trend::{percent_change, trend_rating};

/// Percentage move over the session preceding `report_date`: the last bar
/// strictly before the report date against the bar before it.
fn session_move(bars: &[Bar], report_date: NaiveDate, series: &str) -> Result<Option<f64>, AnalysisError> {
    let idx = bars
        .iter()
        .rposition(|b| b.date() < report_date)
        .ok_or_else(|| {
            AnalysisError::MissingBar(format!("no {} bar before report date {}", series, report_date))
        })?;
    if idx == 0 {
        return Err(AnalysisError::MissingBar(format!(
            "no {} bar preceding {} to compare against",
            series, bars[idx].timestamp
        )));
    }
    Ok(percent_change(bars[idx - 1].close, bars[idx].close))
}

/// Stock reaction to the latest quarterly figures, relative to the index,
/// in percentage points. `None` when no income statement has been filed.
pub fn quarterly_impact(snapshot: &InstrumentSnapshot) -> Result<Option<f64>, AnalysisError> {
    let Some(report_date) = snapshot.latest_report_date() else {
        return Ok(None);
    };
    let index_move = session_move(&snapshot.index_bars, report_date, "index")?;
    let stock_move = session_move(&snapshot.bars, report_date, "stock")?;
    Ok(match (stock_move, index_move) {
        (Some(stock), Some(index)) => Some(stock - index),
        _ => None,
    })
}

/// Criteria 6 (analyst rating) and 7 (reaction to quarterly figures).
pub fn score(snapshot: &InstrumentSnapshot) -> Result<i32, AnalysisError> {
    let rating = trend_rating(&snapshot.trend(0)?.distribution);
    let impact = quarterly_impact(snapshot)?;

    let mut levermann = 0;
    if rating >= 2.5 {
        levermann += 1;
    } else if rating <= 1.5 {
        levermann -= 1;
    }
    levermann += band_score(impact, 1.0, -1.0);
    Ok(levermann)
}
