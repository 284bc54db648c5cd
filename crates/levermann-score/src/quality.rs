use analysis_core::{InstrumentSnapshot, StatementKind};
use serde::{Deserialize, Serialize};

use crate::{band_score, fields};

/// Accounting ratios behind the quality sub-score.
///
/// A ratio is `None` when an input is missing, and ROE is also `None` when
/// equity is zero. Non-positive revenue or total assets give a ratio of 0.0,
/// which scores like any other weak ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityRatios {
    pub roe: Option<f64>,
    pub ebit_margin: Option<f64>,
    pub equity_ratio: Option<f64>,
}

/// Total assets minus total current liabilities.
pub fn shareholders_equity(snapshot: &InstrumentSnapshot) -> Option<f64> {
    let total_assets = snapshot.latest_field(StatementKind::Balance, fields::TOTAL_ASSETS)?;
    let liabilities =
        snapshot.latest_field(StatementKind::Balance, fields::TOTAL_CURRENT_LIABILITIES)?;
    Some(total_assets - liabilities)
}

impl QualityRatios {
    pub fn from_snapshot(snapshot: &InstrumentSnapshot) -> Self {
        let equity = shareholders_equity(snapshot);
        let total_assets = snapshot.latest_field(StatementKind::Balance, fields::TOTAL_ASSETS);

        let roe = match (snapshot.latest_field(StatementKind::Income, fields::NET_INCOME), equity) {
            (Some(net_income), Some(equity)) if equity != 0.0 => Some(net_income / equity),
            _ => None,
        };

        let ebit_margin = match (
            snapshot.latest_field(StatementKind::Income, fields::NET_BEFORE_TAXES),
            snapshot.latest_field(StatementKind::Balance, fields::ACCUMULATED_DEPRECIATION),
            snapshot.latest_field(StatementKind::Income, fields::TOTAL_REVENUE),
        ) {
            (Some(before_taxes), Some(depreciation), Some(revenue)) => {
                if revenue > 0.0 {
                    Some((before_taxes - depreciation) / revenue)
                } else {
                    Some(0.0)
                }
            }
            _ => None,
        };

        let equity_ratio = match (equity, total_assets) {
            (Some(equity), Some(assets)) if assets > 0.0 => Some(equity / assets),
            (Some(_), Some(_)) => Some(0.0),
            _ => None,
        };

        Self {
            roe,
            ebit_margin,
            equity_ratio,
        }
    }
}

/// Criteria 1-3: return on equity, EBIT margin and equity ratio. Range -3..=3.
pub fn score(snapshot: &InstrumentSnapshot) -> i32 {
    let ratios = QualityRatios::from_snapshot(snapshot);
    band_score(ratios.roe, 0.20, 0.10)
        + band_score(ratios.ebit_margin, 0.12, 0.06)
        + band_score(ratios.equity_ratio, 0.25, 0.15)
}
