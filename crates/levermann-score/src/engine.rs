use analysis_core::{AnalysisError, Decision, InstrumentSnapshot, RatingEngine};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LevermannConfig;
use crate::{growth, momentum, mood, quality, technique, valuation};

/// Per-group contributions to the composite score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub quality: i32,
    /// 0 when the valuation could not be computed
    pub valuation: i32,
    pub mood: i32,
    pub momentum: i32,
    pub technique: i32,
    pub growth: i32,
}

impl SubScores {
    pub fn composite(&self) -> i32 {
        self.quality + self.valuation + self.mood + self.momentum + self.technique + self.growth
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub symbol: Option<String>,
    pub decision: Decision,
    pub composite: i32,
    /// `None` when the evaluation was aborted
    pub sub_scores: Option<SubScores>,
    /// The composite was carried over from an earlier evaluation
    pub stale: bool,
}

/// Run all six calculators against one snapshot.
pub fn compute_sub_scores(
    snapshot: &InstrumentSnapshot,
    config: &LevermannConfig,
) -> Result<SubScores, AnalysisError> {
    let valuation = valuation::score(snapshot)?;
    if valuation.is_none() {
        tracing::debug!("{}: valuation unavailable, counted as 0", snapshot.symbol);
    }

    let scores = SubScores {
        quality: quality::score(snapshot),
        valuation: valuation.unwrap_or(0),
        mood: mood::score(snapshot)?,
        momentum: momentum::score(snapshot)?,
        technique: technique::score(snapshot, config.technique_window())?,
        growth: growth::score(snapshot),
    };
    tracing::debug!("{}: sub-scores {:?}", snapshot.symbol, scores);
    Ok(scores)
}

/// Map a composite score to a decision. Both thresholds are inclusive and
/// BUY is checked first.
pub fn classify(composite: i32, threshold_buy: i32, threshold_sell: i32) -> Decision {
    if composite >= threshold_buy {
        Decision::Buy
    } else if composite <= threshold_sell {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

/// Levermann rating engine.
///
/// Holds the bound snapshot and the last composite score. An evaluation that
/// hits malformed data keeps the previous composite and marks it stale.
pub struct LevermannScore {
    config: LevermannConfig,
    snapshot: Option<Arc<InstrumentSnapshot>>,
    calc: i32,
    stale: bool,
}

impl LevermannScore {
    pub const NAME: &'static str = "LevermannScore";

    pub fn new(config: LevermannConfig) -> Self {
        Self {
            config,
            snapshot: None,
            calc: 0,
            stale: false,
        }
    }

    /// Start from a previously persisted composite score.
    pub fn with_last_composite(mut self, composite: i32) -> Self {
        self.calc = composite;
        self
    }

    pub fn config(&self) -> &LevermannConfig {
        &self.config
    }

    /// True when the last evaluation was aborted and `last_composite` is
    /// carried over.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn lookback_start_date(&self) -> NaiveDate {
        self.config.lookback_start_date()
    }

    /// Evaluate the bound snapshot, returning the full breakdown.
    pub fn evaluate_detailed(&mut self) -> Evaluation {
        let snapshot = self.snapshot.clone();
        self.run(snapshot.as_deref())
    }

    /// Evaluate a snapshot without binding it.
    pub fn evaluate_snapshot(&mut self, snapshot: &InstrumentSnapshot) -> Evaluation {
        self.run(Some(snapshot))
    }

    fn run(&mut self, snapshot: Option<&InstrumentSnapshot>) -> Evaluation {
        let result = match snapshot {
            Some(snapshot) => compute_sub_scores(snapshot, &self.config),
            None => Err(AnalysisError::NotBound),
        };
        let symbol = snapshot.map(|s| s.symbol.clone());

        let sub_scores = match result {
            Ok(scores) => {
                self.calc = scores.composite();
                self.stale = false;
                Some(scores)
            }
            Err(e) => {
                tracing::error!(
                    "Levermann evaluation of {} aborted, keeping composite {}: {}",
                    symbol.as_deref().unwrap_or("<unbound>"),
                    self.calc,
                    e
                );
                self.stale = true;
                None
            }
        };

        let decision = classify(self.calc, self.config.threshold_buy, self.config.threshold_sell);
        tracing::info!(
            "{}: Levermann score {} -> {}{}",
            symbol.as_deref().unwrap_or("<unbound>"),
            self.calc,
            decision,
            if self.stale { " (stale)" } else { "" }
        );

        Evaluation {
            symbol,
            decision,
            composite: self.calc,
            sub_scores,
            stale: self.stale,
        }
    }
}

impl RatingEngine for LevermannScore {
    fn bind(&mut self, snapshot: Arc<InstrumentSnapshot>) {
        self.snapshot = Some(snapshot);
    }

    fn evaluate(&mut self) -> Decision {
        self.evaluate_detailed().decision
    }

    fn last_composite(&self) -> i32 {
        self.calc
    }
}
