use analysis_core::{AnalysisError, InstrumentSnapshot};

use crate::trend::rolling_performance;

/// Compare the index with the stock window by window, most recent first:
/// +1 for every window in which the index did better, -1 otherwise.
///
/// Returns 0 when either series is too short for a single window. An index
/// series with more windows than the stock is a shape failure.
pub fn relative_performance_count(
    stock_closes: &[f64],
    index_closes: &[f64],
    window: usize,
) -> Result<i32, AnalysisError> {
    let stock_perf = rolling_performance(stock_closes, window);
    let index_perf = rolling_performance(index_closes, window);
    if stock_perf.is_empty() || index_perf.is_empty() {
        return Ok(0);
    }

    let mut count = 0;
    for (idx, index) in index_perf.iter().enumerate() {
        let stock = stock_perf.get(idx).ok_or_else(|| {
            AnalysisError::IndexOutOfRange(format!(
                "index has {} performance windows, stock only {}",
                index_perf.len(),
                stock_perf.len()
            ))
        })?;
        if index > stock {
            count += 1;
        } else {
            count -= 1;
        }
    }
    Ok(count)
}

/// Criterion 12: persistent under- or outperformance against the index.
/// A count of exactly +3 (index ahead in three windows) gives -1, exactly -3
/// gives +1.
pub fn score(snapshot: &InstrumentSnapshot, window: usize) -> Result<i32, AnalysisError> {
    let count = relative_performance_count(&snapshot.closes(), &snapshot.index_closes(), window)?;
    Ok(match count {
        3 => -1,
        -3 => 1,
        _ => 0,
    })
}
