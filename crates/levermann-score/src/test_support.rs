use analysis_core::{
    AnalystRecommendation, Bar, InstrumentSnapshot, Periodicity, RatingBucket, StatementRecord,
    TrendSnapshot,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};

use crate::fields;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars starting 2024-01-01.
pub fn daily_bars(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| Bar::from_close(start + Duration::days(i as i64), *close))
        .collect()
}

pub fn trend(buckets: &[(f64, u32)]) -> TrendSnapshot {
    TrendSnapshot {
        distribution: buckets
            .iter()
            .map(|&(rating, analyst_count)| RatingBucket { rating, analyst_count })
            .collect(),
    }
}

pub fn recommendation(eps_estimate: Option<f64>, trends: Vec<TrendSnapshot>) -> AnalystRecommendation {
    AnalystRecommendation { eps_estimate, trends }
}

/// Quarterly balance and income records carrying the quality inputs.
#[allow(clippy::too_many_arguments)]
pub fn with_quality_inputs(
    snapshot: InstrumentSnapshot,
    report_date: NaiveDate,
    total_assets: f64,
    current_liabilities: f64,
    net_income: f64,
    net_before_taxes: f64,
    depreciation: f64,
    revenue: f64,
) -> InstrumentSnapshot {
    snapshot
        .with_balance(
            StatementRecord::new(report_date, Periodicity::Quarterly)
                .with_field(fields::TOTAL_ASSETS, total_assets)
                .with_field(fields::TOTAL_CURRENT_LIABILITIES, current_liabilities)
                .with_field(fields::ACCUMULATED_DEPRECIATION, depreciation),
        )
        .with_income(
            StatementRecord::new(report_date, Periodicity::Quarterly)
                .with_field(fields::NET_INCOME, net_income)
                .with_field(fields::NET_BEFORE_TAXES, net_before_taxes)
                .with_field(fields::TOTAL_REVENUE, revenue),
        )
}

/// Annual income records, newest first, one per year ending 2023-12-31.
pub fn with_annual_eps(snapshot: InstrumentSnapshot, eps_newest_first: &[Option<f64>]) -> InstrumentSnapshot {
    eps_newest_first
        .iter()
        .enumerate()
        .fold(snapshot, |snapshot, (i, eps)| {
            let mut record = StatementRecord::new(date(2023 - i as i32, 12, 31), Periodicity::Annual);
            if let Some(eps) = eps {
                record = record.with_field(fields::DILUTED_EPS, *eps);
            }
            snapshot.with_income(record)
        })
}

/// Stock rising 0.25 per day from 100 over 120 sessions.
pub fn rising_closes() -> Vec<f64> {
    (0..120).map(|i| 100.0 + i as f64 * 0.25).collect()
}

/// Snapshot whose sub-scores are, in order: quality 2, valuation 2, mood 1,
/// momentum 1, technique 1, growth 1 (composite 8).
pub fn reference_snapshot() -> InstrumentSnapshot {
    let snapshot = InstrumentSnapshot::new("ACME")
        .with_bars(daily_bars(&rising_closes()))
        .with_index_bars(daily_bars(&[200.0; 120]))
        .with_recommendation(recommendation(
            Some(6.0),
            vec![
                trend(&[(5.0, 3), (1.0, 1)]),
                trend(&[(4.0, 4)]),
                trend(&[(4.0, 1)]),
            ],
        ));
    // Report on 2024-02-20, bar 50 of the series
    let snapshot = with_quality_inputs(
        snapshot,
        date(2024, 2, 20),
        1_000_000.0,
        400_000.0,
        150_000.0,
        100_000.0,
        10_000.0,
        900_000.0,
    );
    with_annual_eps(snapshot, &[Some(5.0), Some(4.0)])
}
