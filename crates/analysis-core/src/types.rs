use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// OHLCV bar data. The Levermann engine only reads `timestamp` and `close`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// Bar for sources that only deliver closing prices.
    pub fn from_close(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Which statement a fact is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Balance,
    Income,
    Recommendation,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Balance => "balance",
            StatementKind::Income => "income",
            StatementKind::Recommendation => "recommendation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Annual,
    Quarterly,
}

impl Periodicity {
    /// Number of quarters covered by one record of this periodicity.
    pub fn quarters(&self) -> usize {
        match self {
            Periodicity::Annual => 4,
            Periodicity::Quarterly => 1,
        }
    }
}

/// One filed balance sheet or income statement.
///
/// Field names follow the data vendor (`totalAssets`, `netIncome`,
/// `dilutedEpsExtraOrd`, ...). A field the vendor did not report is simply
/// absent from `fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRecord {
    pub report_date: NaiveDate,
    pub periodicity: Periodicity,
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,
}

impl StatementRecord {
    pub fn new(report_date: NaiveDate, periodicity: Periodicity) -> Self {
        Self {
            report_date,
            periodicity,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// One bucket of an analyst recommendation distribution
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: f64,
    pub analyst_count: u32,
}

/// Recommendation distribution at one point in time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSnapshot {
    pub distribution: Vec<RatingBucket>,
}

/// Analyst consensus: the current-year EPS estimate and the rating trend,
/// most recent snapshot first (index 2 is roughly four weeks old).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystRecommendation {
    #[serde(default)]
    pub eps_estimate: Option<f64>,
    #[serde(default)]
    pub trends: Vec<TrendSnapshot>,
}

/// Rating outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    pub fn to_label(&self) -> &'static str {
        match self {
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
            Decision::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}
