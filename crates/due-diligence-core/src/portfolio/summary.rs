use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::analysis::engine::{analyze_building_with, AnalysisOptions, FinancialAnalysis};
use crate::analysis::recommendation::RecommendationType;
use crate::analysis::snapshot::FinancialSnapshot;
use crate::error::DueDiligenceError;
use crate::types::{capped_add, with_metadata, ComputationOutput, Money, Score};
use crate::DueDiligenceResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One building as handed over by the snapshot lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingInput {
    pub building_id: String,
    pub building_name: String,
    pub building_value: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<FinancialSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub buildings: Vec<BuildingInput>,
    /// Base seed for the trend charts; building `i` uses `seed ^ i`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBuilding {
    pub rank: usize,
    pub building_id: String,
    pub building_name: String,
    pub overall: Score,
    pub recommendation: RecommendationType,
    pub confidence: Score,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationCounts {
    pub mantener: usize,
    pub mejorar: usize,
    pub vender: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub building_count: usize,
    /// Mean overall score, 2 dp
    pub average_overall_score: Decimal,
    pub total_market_value: Money,
    pub total_projected_value: Money,
    pub total_investment_required: Money,
    pub recommendation_counts: RecommendationCounts,
    /// Best overall score first
    pub ranking: Vec<RankedBuilding>,
    pub analyses: Vec<FinancialAnalysis>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyse every building in a portfolio and aggregate the outcome.
pub fn analyze_portfolio(
    input: &PortfolioInput,
) -> DueDiligenceResult<ComputationOutput<PortfolioSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let analysis_date = Some(input.analysis_date.unwrap_or_else(Utc::now));

    tracing::info!(buildings = input.buildings.len(), "analysing portfolio");

    let analyses: Vec<FinancialAnalysis> = input
        .buildings
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let options = AnalysisOptions {
                trend_seed: building_seed(input.trend_seed, i),
                analysis_date,
            };
            analyze_building_with(
                &options,
                &b.building_id,
                &b.building_name,
                b.snapshot.as_ref(),
                b.building_value,
            )
        })
        .collect();

    let building_count = analyses.len();
    let total_overall: Decimal = analyses
        .iter()
        .map(|a| Decimal::from(a.scores.overall))
        .sum();
    let average_overall_score =
        (total_overall / Decimal::from(building_count as u64)).round_dp(2);

    let mut counts = RecommendationCounts::default();
    let mut total_market_value = Decimal::ZERO;
    let mut total_projected_value = Decimal::ZERO;
    let mut total_investment_required = Decimal::ZERO;

    for a in &analyses {
        match a.recommendation.recommendation_type {
            RecommendationType::Mantener => counts.mantener += 1,
            RecommendationType::Mejorar => counts.mejorar += 1,
            RecommendationType::Vender => counts.vender += 1,
        }
        let impact = &a.recommendation.financial_impact;
        total_market_value = capped_add(total_market_value, a.metrics.market_value);
        total_projected_value = capped_add(total_projected_value, impact.projected_value);
        total_investment_required =
            capped_add(total_investment_required, impact.investment_required);
    }

    let output = PortfolioSummary {
        building_count,
        average_overall_score,
        total_market_value,
        total_projected_value,
        total_investment_required,
        recommendation_counts: counts,
        ranking: rank_buildings(&analyses),
        analyses,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Portfolio Due Diligence Summary",
        &serde_json::json!({
            "building_count": building_count,
            "trend_seed": input.trend_seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &PortfolioInput, warnings: &mut Vec<String>) -> DueDiligenceResult<()> {
    if input.buildings.is_empty() {
        return Err(DueDiligenceError::InsufficientData(
            "At least one building is required for a portfolio summary".into(),
        ));
    }

    let mut seen = HashSet::new();
    for b in &input.buildings {
        if b.building_id.trim().is_empty() {
            return Err(DueDiligenceError::InvalidInput {
                field: "building_id".into(),
                reason: format!("Building '{}' has a blank id", b.building_name),
            });
        }
        if !seen.insert(b.building_id.as_str()) {
            return Err(DueDiligenceError::InvalidInput {
                field: "building_id".into(),
                reason: format!("Duplicate building id '{}'", b.building_id),
            });
        }
        if b.snapshot.is_none() {
            warnings.push(format!(
                "Building '{}' has no financial snapshot — analysed with empty metrics",
                b.building_id
            ));
        }
        if b.building_value <= Decimal::ZERO {
            warnings.push(format!(
                "Building '{}' has a non-positive value — value ratios not computed",
                b.building_id
            ));
        }
    }

    Ok(())
}

fn building_seed(seed: Option<u64>, index: usize) -> Option<u64> {
    seed.map(|s| s ^ index as u64)
}

fn rank_buildings(analyses: &[FinancialAnalysis]) -> Vec<RankedBuilding> {
    let mut ordered: Vec<&FinancialAnalysis> = analyses.iter().collect();
    ordered.sort_by(|a, b| {
        b.scores
            .overall
            .cmp(&a.scores.overall)
            .then_with(|| a.building_id.cmp(&b.building_id))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, a)| RankedBuilding {
            rank: i + 1,
            building_id: a.building_id.clone(),
            building_name: a.building_name.clone(),
            overall: a.scores.overall,
            recommendation: a.recommendation.recommendation_type,
            confidence: a.recommendation.confidence,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
