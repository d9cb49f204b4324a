use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::snapshot::FinancialSnapshot;
use crate::types::{capped_add, capped_div, capped_mul, capped_sub, checked_pct, Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Normalized metrics derived from a snapshot and the building's market value.
///
/// Value-dependent ratios are `None` when their denominator is missing or
/// non-positive; presentation renders those as "-".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysisMetrics {
    /// Return on investment net of the capex reserve, %
    pub roi: Option<Percent>,
    /// Net operating income
    pub noi: Option<Money>,
    /// NOI / market value, %
    pub cap_rate: Option<Percent>,
    /// Debt service coverage ratio (passthrough)
    pub dscr: Option<Decimal>,
    /// Occupancy, %
    pub occupancy_rate: Option<Percent>,
    /// OPEX / gross income, %
    pub opex_ratio: Option<Percent>,
    /// 0-100
    pub maintenance_score: Decimal,
    pub market_value: Money,
    /// Market value after the estimated rehabilitation uplift
    pub estimated_value: Money,
    /// (estimated - market) / market, %
    pub value_gap: Percent,
    pub days_on_market: Option<Decimal>,
    /// 0-100
    pub concentration_risk: Decimal,
    /// 0-100
    pub documentation_risk: Decimal,
    /// 0-100
    pub debt_risk: Decimal,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const HUNDRED: Decimal = dec!(100);

/// Annual capex reserve as a share of market value, deducted in ROI.
const CAPEX_RESERVE_RATE: Decimal = dec!(0.02);

/// Uplift applied to rehabilitation capex when estimating post-works value.
const REHAB_VALUE_MULTIPLIER: Decimal = dec!(1.5);

/// Occupancy used until lease-level data feeds the snapshot.
pub const PLACEHOLDER_OCCUPANCY: Percent = dec!(90);

const MAINTENANCE_BASE: Decimal = dec!(50);
const MAINTENANCE_CRITICAL_OK_BONUS: Decimal = dec!(30);
const MAINTENANCE_SPEND_BONUS: Decimal = dec!(20);
/// Maintenance OPEX share above which upkeep counts as active.
const MAINTENANCE_SPEND_SHARE: Decimal = dec!(0.15);

const DOC_PENALTY_LOG: Decimal = dec!(35);
const DOC_PENALTY_INSPECTION: Decimal = dec!(35);
const DOC_PENALTY_MAINTENANCE: Decimal = dec!(30);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive the metric set for one building.
///
/// A missing snapshot yields the most conservative picture: no financial
/// ratios and maximum documentation risk.
pub fn calculate_metrics(
    snapshot: Option<&FinancialSnapshot>,
    building_value: Money,
) -> FinancialAnalysisMetrics {
    let Some(snap) = snapshot else {
        return empty_metrics(building_value);
    };

    let value_known = building_value > Decimal::ZERO;

    // Ratios whose quotient leaves Decimal's range are reported as unknown.
    let noi = match (snap.gross_annual_income, snap.opex_total) {
        (Some(income), Some(opex)) => income.checked_sub(opex),
        _ => None,
    };

    let cap_rate = noi
        .filter(|_| value_known)
        .and_then(|n| checked_pct(n, building_value));

    let roi = noi
        .filter(|_| value_known)
        .and_then(|n| n.checked_sub(building_value * CAPEX_RESERVE_RATE))
        .and_then(|net| checked_pct(net, building_value));

    let opex_ratio = match (snap.opex_total, snap.gross_annual_income) {
        (Some(opex), Some(income)) if income > Decimal::ZERO => checked_pct(opex, income),
        _ => None,
    };

    let concentration_risk = clamp_pct(
        snap.top_tenant_concentration
            .map(|c| capped_mul(c, HUNDRED))
            .unwrap_or(Decimal::ZERO),
    );

    let uplift = capped_mul(snap.rehab_capex.unwrap_or(Decimal::ZERO), REHAB_VALUE_MULTIPLIER);
    let estimated_value = capped_add(building_value, uplift);
    let value_gap = if value_known {
        let gain = capped_sub(estimated_value, building_value);
        capped_mul(capped_div(gain, building_value), HUNDRED)
    } else {
        Decimal::ZERO
    };

    FinancialAnalysisMetrics {
        roi,
        noi,
        cap_rate,
        dscr: snap.dscr,
        occupancy_rate: Some(PLACEHOLDER_OCCUPANCY),
        opex_ratio,
        maintenance_score: maintenance_score(snap),
        market_value: building_value,
        estimated_value,
        value_gap,
        days_on_market: snap.meta.days_on_market,
        concentration_risk,
        documentation_risk: documentation_risk(snap),
        debt_risk: debt_risk(snap.dscr),
    }
}

/// Additive documentation penalty; unknown states count against the building.
pub fn documentation_risk(snap: &FinancialSnapshot) -> Decimal {
    let mut risk = Decimal::ZERO;
    if !snap.building_log_complete() {
        risk += DOC_PENALTY_LOG;
    }
    if !snap.inspection_ok() {
        risk += DOC_PENALTY_INSPECTION;
    }
    if !snap.critical_maintenance_ok() {
        risk += DOC_PENALTY_MAINTENANCE;
    }
    risk.min(HUNDRED)
}

/// Staircase on DSCR. No debt information means no debt risk.
pub fn debt_risk(dscr: Option<Decimal>) -> Decimal {
    match dscr {
        None => Decimal::ZERO,
        Some(d) if d < dec!(1) => dec!(90),
        Some(d) if d < dec!(1.15) => dec!(60),
        Some(d) if d < dec!(1.25) => dec!(30),
        Some(_) => dec!(10),
    }
}

pub fn maintenance_score(snap: &FinancialSnapshot) -> Decimal {
    let mut score = MAINTENANCE_BASE;
    if snap.critical_maintenance_ok() {
        score += MAINTENANCE_CRITICAL_OK_BONUS;
    }
    if let (Some(maint), Some(total)) = (snap.opex_maintenance, snap.opex_total) {
        if total > Decimal::ZERO && maint > total * MAINTENANCE_SPEND_SHARE {
            score += MAINTENANCE_SPEND_BONUS;
        }
    }
    score.min(HUNDRED)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn empty_metrics(building_value: Money) -> FinancialAnalysisMetrics {
    FinancialAnalysisMetrics {
        roi: None,
        noi: None,
        cap_rate: None,
        dscr: None,
        occupancy_rate: None,
        opex_ratio: None,
        maintenance_score: Decimal::ZERO,
        market_value: building_value,
        estimated_value: building_value,
        value_gap: Decimal::ZERO,
        days_on_market: None,
        concentration_risk: Decimal::ZERO,
        documentation_risk: HUNDRED,
        debt_risk: Decimal::ZERO,
    }
}

fn clamp_pct(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(HUNDRED)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::snapshot::{BuildingLogState, InspectionState, SnapshotMeta};
    use crate::types::DECIMAL_CAP;

    fn sample_snapshot() -> FinancialSnapshot {
        FinancialSnapshot {
            gross_annual_income: Some(dec!(100000)),
            opex_total: Some(dec!(30000)),
            opex_maintenance: Some(dec!(6000)),
            top_tenant_concentration: Some(dec!(0.3)),
            dscr: Some(dec!(1.3)),
            rehab_capex: Some(dec!(200000)),
            meta: SnapshotMeta {
                building_log: Some(BuildingLogState::Completo),
                inspection: Some(InspectionState::Ok),
                critical_maintenance_ok: Some(true),
                reference_price_m2: None,
                days_on_market: Some(dec!(90)),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_core_income_metrics() {
        let m = calculate_metrics(Some(&sample_snapshot()), dec!(1000000));

        assert_eq!(m.noi, Some(dec!(70000)));
        assert_eq!(m.cap_rate, Some(dec!(7)));
        // (70000 - 20000) / 1_000_000 * 100 = 5
        assert_eq!(m.roi, Some(dec!(5)));
        assert_eq!(m.opex_ratio, Some(dec!(30)));
        assert_eq!(m.market_value, dec!(1000000));
        assert_eq!(m.dscr, Some(dec!(1.3)));
        assert_eq!(m.days_on_market, Some(dec!(90)));
    }

    #[test]
    fn test_value_gap_from_rehab_capex() {
        let m = calculate_metrics(Some(&sample_snapshot()), dec!(1000000));
        // 1_000_000 + 200_000 * 1.5
        assert_eq!(m.estimated_value, dec!(1300000));
        assert_eq!(m.value_gap, dec!(30));
    }

    #[test]
    fn test_null_snapshot_is_max_documentation_risk() {
        let m = calculate_metrics(None, dec!(500000));
        assert_eq!(m.documentation_risk, dec!(100));
        assert!(m.roi.is_none());
        assert!(m.noi.is_none());
        assert!(m.cap_rate.is_none());
        assert!(m.opex_ratio.is_none());
        assert_eq!(m.market_value, dec!(500000));
        assert_eq!(m.value_gap, Decimal::ZERO);
    }

    #[test]
    fn test_zero_building_value_nulls_ratios() {
        let m = calculate_metrics(Some(&sample_snapshot()), Decimal::ZERO);
        assert!(m.cap_rate.is_none());
        assert!(m.roi.is_none());
        assert_eq!(m.value_gap, Decimal::ZERO);
        // NOI does not depend on value
        assert_eq!(m.noi, Some(dec!(70000)));
    }

    #[test]
    fn test_zero_income_nulls_opex_ratio() {
        let mut snap = sample_snapshot();
        snap.gross_annual_income = Some(Decimal::ZERO);
        let m = calculate_metrics(Some(&snap), dec!(1000000));
        assert!(m.opex_ratio.is_none());
        assert_eq!(m.noi, Some(dec!(-30000)));
    }

    #[test]
    fn test_unknown_opex_leaves_noi_unknown() {
        let mut snap = sample_snapshot();
        snap.opex_total = None;
        let m = calculate_metrics(Some(&snap), dec!(1000000));
        assert!(m.noi.is_none());
        assert!(m.cap_rate.is_none());
        assert!(m.opex_ratio.is_none());
    }

    #[test]
    fn test_debt_risk_staircase() {
        assert_eq!(debt_risk(None), dec!(0));
        assert_eq!(debt_risk(Some(dec!(0.8))), dec!(90));
        assert_eq!(debt_risk(Some(dec!(1))), dec!(60));
        assert_eq!(debt_risk(Some(dec!(1.15))), dec!(30));
        assert_eq!(debt_risk(Some(dec!(1.2499))), dec!(30));
        assert_eq!(debt_risk(Some(dec!(1.25))), dec!(10));
    }

    #[test]
    fn test_documentation_risk_additive() {
        let mut snap = sample_snapshot();
        assert_eq!(documentation_risk(&snap), dec!(0));

        snap.meta.building_log = Some(BuildingLogState::Parcial);
        assert_eq!(documentation_risk(&snap), dec!(35));

        snap.meta.inspection = Some(InspectionState::Pendiente);
        assert_eq!(documentation_risk(&snap), dec!(70));

        snap.meta.critical_maintenance_ok = None;
        assert_eq!(documentation_risk(&snap), dec!(100));
    }

    #[test]
    fn test_maintenance_score_components() {
        let mut snap = sample_snapshot();
        // 6000 / 30000 = 20% > 15%, critical ok
        assert_eq!(maintenance_score(&snap), dec!(100));

        snap.opex_maintenance = Some(dec!(4500));
        // exactly 15% does not count
        assert_eq!(maintenance_score(&snap), dec!(80));

        snap.meta.critical_maintenance_ok = Some(false);
        assert_eq!(maintenance_score(&snap), dec!(50));
    }

    #[test]
    fn test_concentration_risk_clamped() {
        let mut snap = sample_snapshot();
        snap.top_tenant_concentration = Some(dec!(1.4));
        let m = calculate_metrics(Some(&snap), dec!(1000000));
        assert_eq!(m.concentration_risk, dec!(100));

        snap.top_tenant_concentration = None;
        let m = calculate_metrics(Some(&snap), dec!(1000000));
        assert_eq!(m.concentration_risk, dec!(0));
    }

    #[test]
    fn test_tiny_value_overflowing_ratios_are_unknown() {
        let snap = FinancialSnapshot {
            gross_annual_income: Some(dec!(100000000000)),
            opex_total: Some(Decimal::ZERO),
            ..Default::default()
        };
        let m = calculate_metrics(Some(&snap), dec!(0.00000000000000000001));
        assert_eq!(m.noi, Some(dec!(100000000000)));
        assert!(m.cap_rate.is_none());
        assert!(m.roi.is_none());
        assert_eq!(m.opex_ratio, Some(Decimal::ZERO));
        assert_eq!(m.value_gap, Decimal::ZERO);
    }

    #[test]
    fn test_huge_rehab_capex_saturates_estimated_value() {
        let mut snap = sample_snapshot();
        snap.rehab_capex = Some(dec!(60000000000000000000000000000));
        let m = calculate_metrics(Some(&snap), dec!(1000000));
        assert_eq!(m.estimated_value, DECIMAL_CAP);
        assert!(m.value_gap > dec!(15));
        assert_eq!(m.market_value, dec!(1000000));
    }

    #[test]
    fn test_noi_overflow_is_unknown() {
        let mut snap = sample_snapshot();
        snap.gross_annual_income = Some(DECIMAL_CAP);
        snap.opex_total = Some(-DECIMAL_CAP);
        let m = calculate_metrics(Some(&snap), dec!(1000000));
        assert!(m.noi.is_none());
        assert!(m.cap_rate.is_none());
        assert_eq!(m.concentration_risk, dec!(30));
    }

    #[test]
    fn test_occupancy_placeholder_band() {
        let m = calculate_metrics(Some(&sample_snapshot()), dec!(1000000));
        let occ = m.occupancy_rate.unwrap();
        assert!(occ >= dec!(85) && occ < dec!(95));
    }
}
