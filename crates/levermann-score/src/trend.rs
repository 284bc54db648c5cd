use analysis_core::RatingBucket;

/// Analyst-count weighted average rating of a recommendation distribution.
/// Returns 0.0 when no analyst is counted.
pub fn trend_rating(distribution: &[RatingBucket]) -> f64 {
    let (weighted, analysts) = distribution.iter().fold((0.0, 0u64), |(sum, n), bucket| {
        (
            sum + bucket.rating * bucket.analyst_count as f64,
            n + bucket.analyst_count as u64,
        )
    });
    if analysts == 0 {
        return 0.0;
    }
    weighted / analysts as f64
}

/// Percentage change from `from` to `to`; `None` when `from` is zero.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        None
    } else {
        Some(100.0 * (to - from) / from)
    }
}

/// Relative change `to / from - 1`; `None` when `from` is zero.
pub fn relative_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        None
    } else {
        Some(to / from - 1.0)
    }
}

/// Trailing performance over consecutive non-overlapping windows of
/// `window` bars, most recent window first.
///
/// The first value compares the last close with the close `window` bars
/// earlier, the second steps back one more window, and so on while a full
/// window is available.
pub fn rolling_performance(closes: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || closes.len() <= window {
        return Vec::new();
    }
    let mut perf = Vec::with_capacity(closes.len() / window);
    let mut end = closes.len() - 1;
    while end >= window {
        perf.push(relative_change(closes[end - window], closes[end]).unwrap_or(0.0));
        end -= window;
    }
    perf
}
