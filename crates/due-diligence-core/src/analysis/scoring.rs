use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::metrics::FinancialAnalysisMetrics;
use super::snapshot::FinancialSnapshot;
use crate::types::{to_score, Score};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Category and overall scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialAnalysisScore {
    pub overall: Score,
    pub financial: Score,
    pub operational: Score,
    pub technical: Score,
    pub market: Score,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const WEIGHT_FINANCIAL: Decimal = dec!(0.35);
pub const WEIGHT_OPERATIONAL: Decimal = dec!(0.25);
pub const WEIGHT_TECHNICAL: Decimal = dec!(0.20);
pub const WEIGHT_MARKET: Decimal = dec!(0.20);

const SCORE_MAX: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Additive rule model: each category starts at a base and collects fixed
/// bonuses for thresholds strictly exceeded. Unknown metrics earn nothing.
pub fn calculate_scores(
    metrics: &FinancialAnalysisMetrics,
    snapshot: Option<&FinancialSnapshot>,
) -> FinancialAnalysisScore {
    let financial = score_financial(metrics);
    let operational = score_operational(metrics);
    let technical = score_technical(snapshot);
    let market = score_market(metrics);

    let overall = weighted_overall(financial, operational, technical, market);

    FinancialAnalysisScore {
        overall: to_score(overall),
        financial: to_score(financial),
        operational: to_score(operational),
        technical: to_score(technical),
        market: to_score(market),
    }
}

/// Weighted blend of the (unrounded) category scores.
pub fn weighted_overall(
    financial: Decimal,
    operational: Decimal,
    technical: Decimal,
    market: Decimal,
) -> Decimal {
    financial * WEIGHT_FINANCIAL
        + operational * WEIGHT_OPERATIONAL
        + technical * WEIGHT_TECHNICAL
        + market * WEIGHT_MARKET
}

// ---------------------------------------------------------------------------
// Category scores
// ---------------------------------------------------------------------------

fn score_financial(m: &FinancialAnalysisMetrics) -> Decimal {
    let mut score = dec!(50);
    if exceeds(m.roi, dec!(5)) {
        score += dec!(20);
    }
    if exceeds(m.cap_rate, dec!(6)) {
        score += dec!(15);
    }
    if exceeds(m.noi, Decimal::ZERO) {
        score += dec!(15);
    }
    if exceeds(m.dscr, dec!(1.25)) {
        score += dec!(10);
    }
    score.min(SCORE_MAX)
}

fn score_operational(m: &FinancialAnalysisMetrics) -> Decimal {
    let mut score = dec!(40);
    if exceeds(m.occupancy_rate, dec!(85)) {
        score += dec!(25);
    }
    if below(m.opex_ratio, dec!(40)) {
        score += dec!(20);
    }
    if m.maintenance_score > dec!(70) {
        score += dec!(15);
    }
    score.min(SCORE_MAX)
}

fn score_technical(snapshot: Option<&FinancialSnapshot>) -> Decimal {
    let mut score = dec!(30);
    if let Some(snap) = snapshot {
        if snap.building_log_complete() {
            score += dec!(25);
        }
        if snap.inspection_ok() {
            score += dec!(20);
        }
        if snap.critical_maintenance_ok() {
            score += dec!(25);
        }
    }
    score.min(SCORE_MAX)
}

fn score_market(m: &FinancialAnalysisMetrics) -> Decimal {
    let mut score = dec!(50);
    if m.value_gap > dec!(20) {
        score += dec!(30);
    } else if m.value_gap > dec!(10) {
        score += dec!(15);
    }
    if below(m.days_on_market, dec!(180)) {
        score += dec!(20);
    }
    score.min(SCORE_MAX)
}

fn exceeds(value: Option<Decimal>, threshold: Decimal) -> bool {
    value.is_some_and(|v| v > threshold)
}

fn below(value: Option<Decimal>, threshold: Decimal) -> bool {
    value.is_some_and(|v| v < threshold)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
