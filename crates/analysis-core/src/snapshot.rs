use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    AnalysisError, AnalystRecommendation, Bar, MarketDataSource, Periodicity, StatementKind,
    StatementRecord, TrendSnapshot,
};

/// Immutable view of everything known about one instrument at evaluation
/// time: its bars, the benchmark index bars over the same window, its
/// filed statements and the analyst consensus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSnapshot {
    pub symbol: String,
    #[serde(default)]
    pub bars: Vec<Bar>,
    #[serde(default)]
    pub index_bars: Vec<Bar>,
    #[serde(default)]
    pub income: Vec<StatementRecord>,
    #[serde(default)]
    pub balance: Vec<StatementRecord>,
    #[serde(default)]
    pub recommendation: Option<AnalystRecommendation>,
}

impl InstrumentSnapshot {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Self::default()
        }
    }

    /// Fetch a complete snapshot from a data source.
    ///
    /// Index bars are requested over the first..last timestamps of the
    /// stock bars so both series cover the same window. Missing bars are
    /// logged, not rejected; the engine decides what it can score.
    pub async fn load<S>(
        source: &S,
        symbol: &str,
        index_symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, AnalysisError>
    where
        S: MarketDataSource + ?Sized,
    {
        let bars = source.get_bars(symbol, start, end).await?;
        let index_bars = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => {
                source
                    .get_bars(index_symbol, first.timestamp, last.timestamp)
                    .await?
            }
            _ => {
                tracing::warn!(
                    "No bars for {} between {} and {}, skipping index {}",
                    symbol,
                    start,
                    end,
                    index_symbol
                );
                Vec::new()
            }
        };
        if index_bars.is_empty() && !bars.is_empty() {
            tracing::warn!("No {} index bars over the {} window", index_symbol, symbol);
        }
        let income = source.get_statements(symbol, StatementKind::Income).await?;
        let balance = source.get_statements(symbol, StatementKind::Balance).await?;
        let recommendation = source.get_recommendation(symbol).await?;

        Ok(Self {
            symbol: symbol.to_string(),
            bars,
            index_bars,
            income,
            balance,
            recommendation,
        }
        .normalized())
    }

    /// Parse a snapshot exported as JSON. Malformed documents are rejected
    /// as invalid data.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidData(format!("malformed snapshot: {}", e)))?;
        Ok(snapshot.normalized())
    }

    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_index_bars(mut self, bars: Vec<Bar>) -> Self {
        self.index_bars = bars;
        self
    }

    pub fn with_income(mut self, record: StatementRecord) -> Self {
        self.income.push(record);
        self.normalized()
    }

    pub fn with_balance(mut self, record: StatementRecord) -> Self {
        self.balance.push(record);
        self.normalized()
    }

    pub fn with_recommendation(mut self, recommendation: AnalystRecommendation) -> Self {
        self.recommendation = Some(recommendation);
        self
    }

    /// Bars ascending by timestamp, statements newest first.
    fn normalized(mut self) -> Self {
        self.bars.sort_by_key(|b| b.timestamp);
        self.index_bars.sort_by_key(|b| b.timestamp);
        self.income.sort_by(|a, b| b.report_date.cmp(&a.report_date));
        self.balance.sort_by(|a, b| b.report_date.cmp(&a.report_date));
        self
    }

    pub fn statements(&self, kind: StatementKind) -> &[StatementRecord] {
        match kind {
            StatementKind::Income => &self.income,
            StatementKind::Balance => &self.balance,
            StatementKind::Recommendation => &[],
        }
    }

    /// Look up one statement fact.
    ///
    /// `quarter_offset` counts quarters back from the latest record of the
    /// requested periodicity, so annual records sit at offsets 0, 4, 8, ...
    /// Returns `None` when the record or the field is not available.
    pub fn statement_field(
        &self,
        kind: StatementKind,
        field: &str,
        periodicity: Periodicity,
        quarter_offset: usize,
    ) -> Option<f64> {
        if kind == StatementKind::Recommendation {
            return match field {
                "eps" => self.recommendation.as_ref().and_then(|r| r.eps_estimate),
                _ => None,
            };
        }
        self.statements(kind)
            .iter()
            .filter(|r| r.periodicity == periodicity)
            .nth(quarter_offset / periodicity.quarters())
            .and_then(|r| r.field(field))
    }

    /// Latest-quarter fact, the default address used by most criteria.
    pub fn latest_field(&self, kind: StatementKind, field: &str) -> Option<f64> {
        self.statement_field(kind, field, Periodicity::Quarterly, 0)
    }

    /// Report date of the most recent income statement filing.
    pub fn latest_report_date(&self) -> Option<NaiveDate> {
        self.income.first().map(|r| r.report_date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn index_closes(&self) -> Vec<f64> {
        self.index_bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> Result<f64, AnalysisError> {
        self.bars.last().map(|b| b.close).ok_or_else(|| {
            AnalysisError::InsufficientData(format!("{} has no bars", self.symbol))
        })
    }

    /// Recommendation trend snapshot `idx` (0 = most recent).
    pub fn trend(&self, idx: usize) -> Result<&TrendSnapshot, AnalysisError> {
        let recommendation = self.recommendation.as_ref().ok_or_else(|| {
            AnalysisError::InvalidData(format!("{} has no recommendation record", self.symbol))
        })?;
        recommendation.trends.get(idx).ok_or_else(|| {
            AnalysisError::IndexOutOfRange(format!(
                "{} has {} trend snapshots, snapshot {} requested",
                self.symbol,
                recommendation.trends.len(),
                idx
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RatingBucket;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day_bars(start: DateTime<Utc>, closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar::from_close(start + Duration::days(i as i64), *c))
            .collect()
    }

    fn annual_eps_history() -> InstrumentSnapshot {
        let mut snapshot = InstrumentSnapshot::new("ACME");
        for (year, eps) in [(2020, 1.0), (2021, 1.5), (2022, 2.0), (2023, 2.5)] {
            snapshot = snapshot.with_income(
                StatementRecord::new(date(year, 12, 31), Periodicity::Annual)
                    .with_field("dilutedEpsExtraOrd", eps),
            );
        }
        snapshot.with_income(
            StatementRecord::new(date(2024, 3, 31), Periodicity::Quarterly)
                .with_field("netIncome", 42.0),
        )
    }

    #[test]
    fn test_annual_fields_are_addressed_by_quarter_offset() {
        let snapshot = annual_eps_history();
        let eps = |offset| {
            snapshot.statement_field(
                StatementKind::Income,
                "dilutedEpsExtraOrd",
                Periodicity::Annual,
                offset,
            )
        };
        assert_eq!(eps(0), Some(2.5));
        assert_eq!(eps(4), Some(2.0));
        assert_eq!(eps(12), Some(1.0));
        assert_eq!(eps(16), None);
    }

    #[test]
    fn test_latest_field_and_report_date_use_newest_record() {
        let snapshot = annual_eps_history();
        assert_eq!(snapshot.latest_field(StatementKind::Income, "netIncome"), Some(42.0));
        assert_eq!(snapshot.latest_field(StatementKind::Balance, "totalAssets"), None);
        assert_eq!(snapshot.latest_report_date(), Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_balance_records_stay_out_of_income() {
        let snapshot = InstrumentSnapshot::new("ACME")
            .with_balance(
                StatementRecord::new(date(2023, 3, 31), Periodicity::Quarterly)
                    .with_field("totalAssets", 900.0),
            )
            .with_balance(
                StatementRecord::new(date(2024, 3, 31), Periodicity::Quarterly)
                    .with_field("totalAssets", 1000.0),
            );
        assert!(snapshot.statements(StatementKind::Income).is_empty());
        assert_eq!(snapshot.statements(StatementKind::Balance).len(), 2);
        assert_eq!(snapshot.latest_field(StatementKind::Balance, "totalAssets"), Some(1000.0));
    }

    #[test]
    fn test_recommendation_eps_lookup() {
        let snapshot = InstrumentSnapshot::new("ACME").with_recommendation(AnalystRecommendation {
            eps_estimate: Some(-0.4),
            trends: vec![],
        });
        // Negative estimates are data, not a missing marker
        assert_eq!(
            snapshot.latest_field(StatementKind::Recommendation, "eps"),
            Some(-0.4)
        );
        assert_eq!(snapshot.latest_field(StatementKind::Recommendation, "target"), None);
    }

    #[test]
    fn test_trend_out_of_range_is_an_error() {
        let snapshot = InstrumentSnapshot::new("ACME").with_recommendation(AnalystRecommendation {
            eps_estimate: None,
            trends: vec![TrendSnapshot {
                distribution: vec![RatingBucket { rating: 4.0, analyst_count: 2 }],
            }],
        });
        assert!(snapshot.trend(0).is_ok());
        assert!(matches!(snapshot.trend(2), Err(AnalysisError::IndexOutOfRange(_))));
        assert!(matches!(
            InstrumentSnapshot::new("ACME").trend(0),
            Err(AnalysisError::InvalidData(_))
        ));
    }

    #[test]
    fn test_last_close_on_empty_series() {
        assert!(matches!(
            InstrumentSnapshot::new("ACME").last_close(),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_from_json_sorts_and_rejects_malformed() {
        let json = r#"{
            "symbol": "ACME",
            "bars": [
                {"timestamp": "2024-01-03T00:00:00Z", "close": 11.0},
                {"timestamp": "2024-01-02T00:00:00Z", "close": 10.0}
            ],
            "income": [
                {"reportDate": "2023-06-30", "periodicity": "quarterly", "fields": {"netIncome": 1.0}},
                {"reportDate": "2023-09-30", "periodicity": "quarterly", "fields": {"netIncome": 2.0}}
            ]
        }"#;
        let snapshot = InstrumentSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.closes(), vec![10.0, 11.0]);
        assert_eq!(snapshot.latest_report_date(), Some(date(2023, 9, 30)));

        let malformed = r#"{"symbol": "ACME", "income": [{"reportDate": "soon"}]}"#;
        assert!(matches!(
            InstrumentSnapshot::from_json(malformed),
            Err(AnalysisError::InvalidData(_))
        ));
    }

    struct InMemorySource {
        stock_closes: Vec<f64>,
        index_closes: Vec<f64>,
        requests: Mutex<Vec<(String, DateTime<Utc>, DateTime<Utc>)>>,
    }

    impl InMemorySource {
        fn new(stock_closes: &[f64], index_closes: &[f64]) -> Self {
            Self {
                stock_closes: stock_closes.to_vec(),
                index_closes: index_closes.to_vec(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketDataSource for InMemorySource {
        async fn get_bars(
            &self,
            symbol: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Bar>, AnalysisError> {
            self.requests.lock().unwrap().push((symbol.to_string(), start, end));
            let first = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
            let closes = if symbol == "ACME" { &self.stock_closes } else { &self.index_closes };
            Ok(day_bars(first, closes))
        }

        async fn get_statements(
            &self,
            _symbol: &str,
            kind: StatementKind,
        ) -> Result<Vec<StatementRecord>, AnalysisError> {
            match kind {
                StatementKind::Income => Ok(vec![StatementRecord::new(
                    date(2023, 12, 31),
                    Periodicity::Quarterly,
                )]),
                _ => Ok(vec![]),
            }
        }

        async fn get_recommendation(
            &self,
            _symbol: &str,
        ) -> Result<Option<AnalystRecommendation>, AnalysisError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_load_requests_index_over_stock_window() {
        let source = InMemorySource::new(&[10.0, 11.0, 12.0], &[400.0, 401.0, 402.0]);
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        let snapshot = InstrumentSnapshot::load(&source, "ACME", "SPY", start, end)
            .await
            .unwrap();

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], ("ACME".to_string(), start, end));
        assert_eq!(requests[1].0, "SPY");
        assert_eq!(requests[1].1, snapshot.bars[0].timestamp);
        assert_eq!(requests[1].2, snapshot.bars[2].timestamp);
        assert_eq!(snapshot.index_bars.len(), 3);
        assert_eq!(snapshot.income.len(), 1);
        assert!(snapshot.recommendation.is_none());
    }

    #[tokio::test]
    async fn test_load_without_stock_bars_skips_index() {
        let source = InMemorySource::new(&[], &[400.0, 401.0]);
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        let snapshot = InstrumentSnapshot::load(&source, "ACME", "SPY", start, end)
            .await
            .unwrap();

        assert_eq!(source.requests.lock().unwrap().len(), 1);
        assert!(snapshot.bars.is_empty());
        assert!(snapshot.index_bars.is_empty());
        assert_eq!(snapshot.income.len(), 1);
    }

    #[tokio::test]
    async fn test_load_accepts_empty_index_series() {
        let source = InMemorySource::new(&[10.0, 11.0], &[]);
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        let snapshot = InstrumentSnapshot::load(&source, "ACME", "SPY", start, end)
            .await
            .unwrap();

        assert_eq!(source.requests.lock().unwrap().len(), 2);
        assert_eq!(snapshot.bars.len(), 2);
        assert!(snapshot.index_bars.is_empty());
    }
}
