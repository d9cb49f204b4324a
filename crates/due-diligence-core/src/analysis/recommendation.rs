use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::metrics::FinancialAnalysisMetrics;
use super::scoring::FinancialAnalysisScore;
use super::snapshot::FinancialSnapshot;
use crate::types::{capped_mul, capped_sub, round_half_up, to_score, Money, Percent, Score};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Hold / improve / sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Mantener,
    Mejorar,
    Vender,
}

impl RecommendationType {
    pub fn timeline(&self) -> &'static str {
        match self {
            RecommendationType::Mantener => "Continuo",
            RecommendationType::Mejorar => "6-12 meses",
            RecommendationType::Vender => "3-6 meses",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            RecommendationType::Mantener => "mantener",
            RecommendationType::Mejorar => "mejorar",
            RecommendationType::Vender => "vender",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Alta,
    Media,
    Baja,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Financiero,
    Operacional,
    Tecnico,
    Legal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Pendiente,
    EnProgreso,
    Completado,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: ActionPriority,
    pub category: ActionCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    pub status: ActionStatus,
}

/// Projected effect of following the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialImpact {
    pub current_value: Money,
    pub projected_value: Money,
    pub investment_required: Money,
    pub expected_return: Money,
    /// Signed: a negative NOI on the improve branch yields a negative period
    pub payback_period_months: i64,
    pub irr: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysisRecommendation {
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
    /// 0-100
    pub confidence: Score,
    pub reasoning: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub financial_impact: FinancialImpact,
    pub timeline: String,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const HOLD_MIN_OVERALL: Score = 75;
const HOLD_MIN_FINANCIAL: Score = 70;
const IMPROVE_MIN_OVERALL: Score = 50;
const IMPROVE_MIN_VALUE_GAP: Decimal = dec!(15);

const HOLD_APPRECIATION: Decimal = dec!(1.03);
const HOLD_UPKEEP_RATE: Decimal = dec!(0.02);
const IMPROVE_DEFAULT_CAPEX_RATE: Decimal = dec!(0.15);
const SALE_DISCOUNT: Decimal = dec!(0.95);
const SALE_COST_RATE: Decimal = dec!(0.03);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classify the building and assemble reasoning, action plan and impact.
pub fn generate_recommendation(
    scores: &FinancialAnalysisScore,
    metrics: &FinancialAnalysisMetrics,
    snapshot: Option<&FinancialSnapshot>,
) -> FinancialAnalysisRecommendation {
    let (recommendation_type, confidence) = classify(scores, metrics);

    let reasoning = build_reasoning(recommendation_type, scores, metrics);
    let action_items = build_action_items(recommendation_type, snapshot);
    let financial_impact = project_impact(recommendation_type, metrics, snapshot);

    FinancialAnalysisRecommendation {
        recommendation_type,
        confidence,
        reasoning,
        action_items,
        financial_impact,
        timeline: recommendation_type.timeline().to_string(),
    }
}

/// Decide hold / improve / sell and the associated confidence.
///
/// Only `overall`, `financial`, `technical` and the value gap take part.
pub fn classify(
    scores: &FinancialAnalysisScore,
    metrics: &FinancialAnalysisMetrics,
) -> (RecommendationType, Score) {
    if scores.overall >= HOLD_MIN_OVERALL && scores.financial >= HOLD_MIN_FINANCIAL {
        (RecommendationType::Mantener, scores.overall)
    } else if scores.overall >= IMPROVE_MIN_OVERALL && metrics.value_gap > IMPROVE_MIN_VALUE_GAP
    {
        let confidence = dec!(70) + Decimal::from(scores.technical) / dec!(10);
        (RecommendationType::Mejorar, to_score(confidence))
    } else {
        (RecommendationType::Vender, 100 - scores.overall.min(100))
    }
}

// ---------------------------------------------------------------------------
// Reasoning
// ---------------------------------------------------------------------------

fn build_reasoning(
    kind: RecommendationType,
    scores: &FinancialAnalysisScore,
    m: &FinancialAnalysisMetrics,
) -> Vec<String> {
    let mut reasons = Vec::new();

    match kind {
        RecommendationType::Mantener => {
            if scores.financial >= 70 {
                reasons.push(format!(
                    "Sólida rentabilidad financiera (puntuación {})",
                    scores.financial
                ));
            }
            if let Some(occ) = m.occupancy_rate.filter(|o| *o > dec!(85)) {
                reasons.push(format!("Alta ocupación del {}%", occ.round_dp(1)));
            }
            if scores.technical >= 70 {
                reasons.push("Documentación técnica y mantenimiento en regla".to_string());
            }
            if m.concentration_risk < dec!(50) {
                reasons.push("Base de inquilinos diversificada".to_string());
            }
        }
        RecommendationType::Mejorar => {
            if m.value_gap > dec!(15) {
                reasons.push(format!(
                    "Potencial de revalorización del {}% tras la rehabilitación",
                    m.value_gap.round_dp(1)
                ));
            }
            if scores.technical < 70 {
                reasons.push(
                    "Situación técnica mejorable (libro del edificio, ITE o mantenimientos)"
                        .to_string(),
                );
            }
            if let Some(ratio) = m.opex_ratio.filter(|r| *r > dec!(40)) {
                reasons.push(format!(
                    "Ratio de OPEX elevado ({}%), margen de optimización",
                    ratio.round_dp(1)
                ));
            }
            reasons.push(
                "La inversión en mejoras incrementará el valor y la rentabilidad del activo"
                    .to_string(),
            );
        }
        RecommendationType::Vender => {
            if scores.overall < 50 {
                reasons.push(format!(
                    "Puntuación global baja ({}), por debajo del umbral de retención",
                    scores.overall
                ));
            }
            if let Some(roi) = m.roi.filter(|r| *r < dec!(3)) {
                reasons.push(format!("ROI insuficiente ({}%)", roi.round_dp(2)));
            }
            if m.debt_risk > dec!(60) {
                reasons.push(
                    "Riesgo de deuda elevado: el DSCR no cubre el servicio de la deuda".to_string(),
                );
            }
            if m.concentration_risk > dec!(70) {
                reasons.push(format!(
                    "Alta dependencia de un único inquilino ({}% de los ingresos)",
                    m.concentration_risk.round_dp(0)
                ));
            }
        }
    }

    reasons
}

// ---------------------------------------------------------------------------
// Action plan
// ---------------------------------------------------------------------------

struct ActionSpec {
    title: &'static str,
    description: &'static str,
    priority: ActionPriority,
    category: ActionCategory,
    estimated_cost: Option<Money>,
    estimated_duration: Option<&'static str>,
}

fn build_action_items(
    kind: RecommendationType,
    snapshot: Option<&FinancialSnapshot>,
) -> Vec<ActionItem> {
    let mut specs: Vec<ActionSpec> = Vec::new();

    match kind {
        RecommendationType::Mantener => {
            specs.push(ActionSpec {
                title: "Mantener contratos de arrendamiento",
                description: "Renovar los contratos vigentes en condiciones de mercado y preservar la ocupación",
                priority: ActionPriority::Media,
                category: ActionCategory::Operacional,
                estimated_cost: None,
                estimated_duration: Some("Continuo"),
            });
            specs.push(ActionSpec {
                title: "Revisión trimestral de OPEX",
                description: "Analizar cada trimestre los gastos operativos frente al presupuesto",
                priority: ActionPriority::Baja,
                category: ActionCategory::Financiero,
                estimated_cost: None,
                estimated_duration: Some("Trimestral"),
            });
        }
        RecommendationType::Mejorar => {
            if !snapshot.is_some_and(|s| s.building_log_complete()) {
                specs.push(ActionSpec {
                    title: "Completar el libro del edificio",
                    description: "Reunir la documentación pendiente y actualizar el libro del edificio",
                    priority: ActionPriority::Alta,
                    category: ActionCategory::Legal,
                    estimated_cost: Some(dec!(2500)),
                    estimated_duration: Some("1-2 meses"),
                });
            }
            if let Some(capex) = snapshot.and_then(|s| s.positive_rehab_capex()) {
                specs.push(ActionSpec {
                    title: "Ejecutar plan de rehabilitación energética",
                    description: "Acometer las obras de eficiencia energética presupuestadas",
                    priority: ActionPriority::Alta,
                    category: ActionCategory::Tecnico,
                    estimated_cost: Some(capex),
                    estimated_duration: Some("6-9 meses"),
                });
            }
            specs.push(ActionSpec {
                title: "Renegociar contratos de servicios",
                description: "Licitar mantenimiento, limpieza y suministros para reducir el OPEX",
                priority: ActionPriority::Media,
                category: ActionCategory::Operacional,
                estimated_cost: None,
                estimated_duration: Some("2-3 meses"),
            });
        }
        RecommendationType::Vender => {
            specs.push(ActionSpec {
                title: "Preparar documentación de venta",
                description: "Reunir escrituras, certificados, contratos y due diligence técnica",
                priority: ActionPriority::Alta,
                category: ActionCategory::Legal,
                estimated_cost: Some(dec!(3000)),
                estimated_duration: Some("1 mes"),
            });
            specs.push(ActionSpec {
                title: "Contratar broker especializado",
                description: "Seleccionar un intermediario con experiencia en activos comparables",
                priority: ActionPriority::Alta,
                category: ActionCategory::Financiero,
                estimated_cost: None,
                estimated_duration: Some("2-4 semanas"),
            });
            specs.push(ActionSpec {
                title: "Encargar tasación independiente",
                description: "Obtener una valoración independiente para fijar el precio de salida",
                priority: ActionPriority::Media,
                category: ActionCategory::Financiero,
                estimated_cost: Some(dec!(1500)),
                estimated_duration: Some("2-3 semanas"),
            });
        }
    }

    specs
        .into_iter()
        .enumerate()
        .map(|(i, spec)| ActionItem {
            id: format!("{}-{}", kind.id_prefix(), i + 1),
            title: spec.title.to_string(),
            description: spec.description.to_string(),
            priority: spec.priority,
            category: spec.category,
            estimated_cost: spec.estimated_cost,
            estimated_duration: spec.estimated_duration.map(str::to_string),
            status: ActionStatus::Pendiente,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Financial impact
// ---------------------------------------------------------------------------

fn project_impact(
    kind: RecommendationType,
    m: &FinancialAnalysisMetrics,
    snapshot: Option<&FinancialSnapshot>,
) -> FinancialImpact {
    let current = m.market_value;

    match kind {
        RecommendationType::Mantener => FinancialImpact {
            current_value: current,
            projected_value: capped_mul(current, HOLD_APPRECIATION),
            investment_required: current * HOLD_UPKEEP_RATE,
            expected_return: m.noi.unwrap_or(Decimal::ZERO),
            payback_period_months: 12,
            irr: m.roi.map(|r| r / dec!(12)),
        },
        RecommendationType::Mejorar => {
            let investment = snapshot
                .and_then(|s| s.positive_rehab_capex())
                .unwrap_or(current * IMPROVE_DEFAULT_CAPEX_RATE);
            let projected = m.estimated_value;
            let expected_return = capped_sub(capped_sub(projected, current), investment);
            let irr = if expected_return > Decimal::ZERO && !investment.is_zero() {
                expected_return
                    .checked_div(investment)
                    .and_then(|r| r.checked_mul(dec!(100)))
                    .map(|pct| pct / dec!(2))
            } else {
                None
            };

            FinancialImpact {
                current_value: current,
                projected_value: projected,
                investment_required: investment,
                expected_return,
                payback_period_months: improve_payback_months(investment, m.noi),
                irr,
            }
        }
        RecommendationType::Vender => {
            let projected = current * SALE_DISCOUNT;
            let investment = current * SALE_COST_RATE;
            FinancialImpact {
                current_value: current,
                projected_value: projected,
                investment_required: investment,
                expected_return: projected - investment,
                payback_period_months: 6,
                irr: None,
            }
        }
    }
}

/// Months of NOI needed to recover the investment. A zero or unknown NOI is
/// replaced by 1; a negative NOI gives a negative period. Periods beyond
/// `i64` saturate at its bound with the sign of the quotient.
pub fn improve_payback_months(investment: Money, noi: Option<Money>) -> i64 {
    let divisor = match noi {
        Some(n) if !n.is_zero() => n,
        _ => Decimal::ONE,
    };
    let saturated = if investment.is_sign_negative() != divisor.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };
    investment
        .checked_div(divisor)
        .and_then(|q| q.checked_mul(dec!(12)))
        .and_then(|months| round_half_up(months).to_i64())
        .unwrap_or(saturated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::calculate_metrics;
    use crate::analysis::snapshot::BuildingLogState;
    use crate::types::DECIMAL_CAP;

    fn scores(overall: Score, financial: Score, technical: Score) -> FinancialAnalysisScore {
        FinancialAnalysisScore {
            overall,
            financial,
            operational: 60,
            technical,
            market: 60,
        }
    }

    fn metrics_with_gap(gap: Decimal) -> FinancialAnalysisMetrics {
        let mut m = calculate_metrics(Some(&FinancialSnapshot::default()), dec!(1000000));
        m.value_gap = gap;
        m
    }

    #[test]
    fn test_classify_hold() {
        let (kind, conf) = classify(&scores(80, 75, 50), &metrics_with_gap(dec!(0)));
        assert_eq!(kind, RecommendationType::Mantener);
        assert_eq!(conf, 80);
    }

    #[test]
    fn test_classify_improve() {
        let (kind, conf) = classify(&scores(60, 50, 55), &metrics_with_gap(dec!(20)));
        assert_eq!(kind, RecommendationType::Mejorar);
        // 70 + 5.5 = 75.5 -> 76
        assert_eq!(conf, 76);
    }

    #[test]
    fn test_classify_sell() {
        let (kind, conf) = classify(&scores(30, 40, 30), &metrics_with_gap(dec!(50)));
        assert_eq!(kind, RecommendationType::Vender);
        assert_eq!(conf, 70);
    }

    #[test]
    fn test_high_overall_low_financial_falls_through() {
        // overall high but financial below 70 and no gap -> sell
        let (kind, conf) = classify(&scores(76, 69, 90), &metrics_with_gap(dec!(15)));
        assert_eq!(kind, RecommendationType::Vender);
        assert_eq!(conf, 24);
    }

    #[test]
    fn test_improve_actions_conditional() {
        let snap = FinancialSnapshot {
            rehab_capex: Some(dec!(120000)),
            ..Default::default()
        };
        let items = build_action_items(RecommendationType::Mejorar, Some(&snap));
        let titles: Vec<&str> = items.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Completar el libro del edificio",
                "Ejecutar plan de rehabilitación energética",
                "Renegociar contratos de servicios",
            ]
        );
        assert_eq!(items[1].estimated_cost, Some(dec!(120000)));
        assert_eq!(items[0].id, "mejorar-1");
        assert!(items.iter().all(|a| a.status == ActionStatus::Pendiente));

        let mut done = snap.clone();
        done.meta.building_log = Some(BuildingLogState::Completo);
        done.rehab_capex = None;
        let items = build_action_items(RecommendationType::Mejorar, Some(&done));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Renegociar contratos de servicios");
    }

    #[test]
    fn test_fixed_action_counts() {
        assert_eq!(build_action_items(RecommendationType::Mantener, None).len(), 2);
        assert_eq!(build_action_items(RecommendationType::Vender, None).len(), 3);
    }

    #[test]
    fn test_improve_reasoning_always_closes() {
        let m = metrics_with_gap(dec!(30));
        let r = build_reasoning(RecommendationType::Mejorar, &scores(60, 50, 90), &m);
        assert_eq!(r.len(), 2);
        assert!(r[0].contains("30"));
        assert!(r.last().unwrap().starts_with("La inversión"));
    }

    #[test]
    fn test_sell_reasoning_gates() {
        let mut m = metrics_with_gap(dec!(0));
        m.roi = Some(dec!(2));
        m.debt_risk = dec!(90);
        m.concentration_risk = dec!(90);
        let r = build_reasoning(RecommendationType::Vender, &scores(40, 50, 30), &m);
        assert_eq!(r.len(), 4);

        m.roi = None;
        m.debt_risk = dec!(60);
        m.concentration_risk = dec!(70);
        let r = build_reasoning(RecommendationType::Vender, &scores(55, 50, 30), &m);
        assert!(r.is_empty());
    }

    #[test]
    fn test_hold_impact() {
        let mut m = metrics_with_gap(dec!(0));
        m.noi = Some(dec!(70000));
        m.roi = Some(dec!(6));
        let impact = project_impact(RecommendationType::Mantener, &m, None);
        assert_eq!(impact.projected_value, dec!(1030000));
        assert_eq!(impact.investment_required, dec!(20000));
        assert_eq!(impact.expected_return, dec!(70000));
        assert_eq!(impact.payback_period_months, 12);
        assert_eq!(impact.irr, Some(dec!(0.5)));
    }

    #[test]
    fn test_improve_impact_with_capex() {
        let snap = FinancialSnapshot {
            rehab_capex: Some(dec!(200000)),
            ..Default::default()
        };
        let mut m = calculate_metrics(Some(&snap), dec!(1000000));
        m.noi = Some(dec!(50000));
        let impact = project_impact(RecommendationType::Mejorar, &m, Some(&snap));

        assert_eq!(impact.projected_value, dec!(1300000));
        assert_eq!(impact.investment_required, dec!(200000));
        assert_eq!(impact.expected_return, dec!(100000));
        // 200000 / 50000 * 12 = 48
        assert_eq!(impact.payback_period_months, 48);
        // (100000 / 200000 * 100) / 2 = 25
        assert_eq!(impact.irr, Some(dec!(25)));
    }

    #[test]
    fn test_improve_impact_without_capex_uses_default_rate() {
        let m = metrics_with_gap(dec!(0));
        let impact = project_impact(RecommendationType::Mejorar, &m, None);
        assert_eq!(impact.investment_required, dec!(150000));
        // estimated == current, so the return is negative and IRR absent
        assert_eq!(impact.expected_return, dec!(-150000));
        assert!(impact.irr.is_none());
    }

    #[test]
    fn test_payback_guards() {
        assert_eq!(improve_payback_months(dec!(100), Some(Decimal::ZERO)), 1200);
        assert_eq!(improve_payback_months(dec!(100), None), 1200);
        // negative NOI is kept as a negative period
        assert_eq!(improve_payback_months(dec!(120000), Some(dec!(-60000))), -24);
    }

    #[test]
    fn test_payback_saturates_on_near_zero_noi() {
        let tiny = dec!(0.0000000000000000000001);
        assert_eq!(improve_payback_months(dec!(1000000), Some(tiny)), i64::MAX);
        assert_eq!(improve_payback_months(dec!(1000000), Some(-tiny)), i64::MIN);
        // fits in Decimal but not in i64
        assert_eq!(
            improve_payback_months(dec!(10000000000000000000000000), None),
            i64::MAX
        );
    }

    #[test]
    fn test_hold_impact_saturates_projected_value() {
        let mut m = metrics_with_gap(dec!(0));
        m.market_value = DECIMAL_CAP;
        let impact = project_impact(RecommendationType::Mantener, &m, None);
        assert_eq!(impact.projected_value, DECIMAL_CAP);
        assert_eq!(impact.current_value, DECIMAL_CAP);
    }

    #[test]
    fn test_improve_with_zero_capex_drops_rehab_action() {
        let snap = FinancialSnapshot {
            rehab_capex: Some(Decimal::ZERO),
            ..Default::default()
        };
        let items = build_action_items(RecommendationType::Mejorar, Some(&snap));
        assert!(items
            .iter()
            .all(|a| a.title != "Ejecutar plan de rehabilitación energética"));
        assert!(items.iter().all(|a| a.estimated_cost != Some(Decimal::ZERO)));

        let m = calculate_metrics(Some(&snap), dec!(1000000));
        let impact = project_impact(RecommendationType::Mejorar, &m, Some(&snap));
        assert_eq!(impact.investment_required, dec!(150000));
    }

    #[test]
    fn test_sell_impact() {
        let m = metrics_with_gap(dec!(0));
        let impact = project_impact(RecommendationType::Vender, &m, None);
        assert_eq!(impact.projected_value, dec!(950000));
        assert_eq!(impact.investment_required, dec!(30000));
        assert_eq!(impact.expected_return, dec!(920000));
        assert_eq!(impact.payback_period_months, 6);
        assert!(impact.irr.is_none());
    }

    #[test]
    fn test_type_serializes_spanish() {
        let json = serde_json::to_string(&RecommendationType::Mejorar).unwrap();
        assert_eq!(json, "\"mejorar\"");
        assert_eq!(RecommendationType::Vender.timeline(), "3-6 meses");
    }
}
