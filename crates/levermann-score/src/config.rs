use analysis_core::AnalysisError;
use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::env;

/// Bars per rolling window when no interval is configured.
pub const DEFAULT_TECHNIQUE_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevermannConfig {
    /// Composite score at or above which the decision is BUY
    pub threshold_buy: i32,
    /// Composite score at or below which the decision is SELL
    pub threshold_sell: i32,
    /// History to request from the data source, in months
    pub lookback: u32,
    /// Rolling window lengths in bars; the technique criterion uses the first.
    ///
    /// The published rule compares 30-bar windows. A different first entry
    /// changes criterion 12 (reversal), so its scores stop matching the
    /// reference scorecard.
    pub intervals: Vec<usize>,
}

impl Default for LevermannConfig {
    fn default() -> Self {
        Self {
            threshold_buy: 4,
            threshold_sell: -2,
            lookback: 12,
            intervals: vec![DEFAULT_TECHNIQUE_WINDOW],
        }
    }
}

impl LevermannConfig {
    /// Load `.env` (if present) and read the configuration from the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            threshold_buy: env::var("LEVERMANN_THRESHOLD_BUY")
                .unwrap_or_else(|_| defaults.threshold_buy.to_string())
                .parse()
                .context("LEVERMANN_THRESHOLD_BUY must be an integer")?,
            threshold_sell: env::var("LEVERMANN_THRESHOLD_SELL")
                .unwrap_or_else(|_| defaults.threshold_sell.to_string())
                .parse()
                .context("LEVERMANN_THRESHOLD_SELL must be an integer")?,
            lookback: env::var("LEVERMANN_LOOKBACK_MONTHS")
                .unwrap_or_else(|_| defaults.lookback.to_string())
                .parse()
                .context("LEVERMANN_LOOKBACK_MONTHS must be a month count")?,
            intervals: match env::var("LEVERMANN_INTERVALS") {
                Ok(raw) => parse_intervals(&raw)?,
                Err(_) => defaults.intervals,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Build from an argument map such as
    /// `{"threshold_buy": 4, "threshold_sell": -2, "lookback": 12, "intervals": [30]}`.
    pub fn from_json(arguments: &serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(arguments.clone())
            .context("invalid Levermann score arguments")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.lookback == 0 {
            return Err(AnalysisError::InvalidData(
                "lookback must be at least one month".to_string(),
            ));
        }
        if self.intervals.is_empty() {
            return Err(AnalysisError::InvalidData(
                "at least one interval is required".to_string(),
            ));
        }
        if self.intervals.iter().any(|&i| i == 0) {
            return Err(AnalysisError::InvalidData(format!(
                "intervals must be positive, got {:?}",
                self.intervals
            )));
        }
        if self.threshold_buy <= self.threshold_sell {
            tracing::warn!(
                "Buy threshold {} is not above sell threshold {}; SELL can never be reached",
                self.threshold_buy,
                self.threshold_sell
            );
        }
        Ok(())
    }

    /// Window length, in bars, of the technique sub-score's rolling comparison.
    pub fn technique_window(&self) -> usize {
        self.intervals
            .first()
            .copied()
            .unwrap_or(DEFAULT_TECHNIQUE_WINDOW)
    }

    /// First day of the history the data source has to supply.
    pub fn lookback_start_date(&self) -> NaiveDate {
        self.lookback_start_from(Utc::now().date_naive())
    }

    /// `today` minus `lookback` months; days past the end of the target
    /// month clamp to its last day (31 March - 1 month = 29 February).
    pub fn lookback_start_from(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.lookback))
            .unwrap_or(NaiveDate::MIN)
    }
}

fn parse_intervals(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("invalid interval '{}' in LEVERMANN_INTERVALS", s))
        })
        .collect()
}
