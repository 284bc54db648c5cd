use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{AnalysisError, AnalystRecommendation, Bar, Decision, InstrumentSnapshot, StatementKind, StatementRecord};

/// Data adapter consumed by the scoring engines.
///
/// Implementations own retrieval, caching and rate limiting. Bars come back
/// ordered by ascending timestamp, statements most recent first.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, AnalysisError>;

    /// All known records of a balance or income statement. Empty when the
    /// vendor has none.
    async fn get_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<Vec<StatementRecord>, AnalysisError>;

    async fn get_recommendation(&self, symbol: &str) -> Result<Option<AnalystRecommendation>, AnalysisError>;
}

/// Capability shared by rating engines: bind one instrument snapshot, rate
/// it, and remember the last composite score.
pub trait RatingEngine {
    fn bind(&mut self, snapshot: Arc<InstrumentSnapshot>);

    /// Never fails; engines fall back to their cached composite.
    fn evaluate(&mut self) -> Decision;

    fn last_composite(&self) -> i32;
}
