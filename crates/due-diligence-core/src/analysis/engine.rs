use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::charts::{build_chart_data, ChartData};
use super::metrics::{calculate_metrics, FinancialAnalysisMetrics};
use super::recommendation::{
    generate_recommendation, FinancialAnalysisRecommendation, RecommendationType,
};
use super::scoring::{calculate_scores, FinancialAnalysisScore};
use super::snapshot::FinancialSnapshot;
use crate::types::{with_metadata, ComputationOutput, Money};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Complete due-diligence result for one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysis {
    pub building_id: String,
    pub building_name: String,
    pub analysis_date: DateTime<Utc>,
    pub scores: FinancialAnalysisScore,
    pub metrics: FinancialAnalysisMetrics,
    pub recommendation: FinancialAnalysisRecommendation,
    pub chart_data: ChartData,
}

/// Per-call knobs. The defaults give a live analysis stamped with the
/// current time and an unseeded trend chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Seed for the trend chart noise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_seed: Option<u64>,
    /// Fixed analysis timestamp instead of `Utc::now()`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct AnalysisAssumptions<'a> {
    building_id: &'a str,
    building_value: Money,
    snapshot_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    trend_seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run metrics, scores, recommendation and chart building for one building.
pub fn analyze_building(
    building_id: &str,
    building_name: &str,
    snapshot: Option<&FinancialSnapshot>,
    building_value: Money,
) -> FinancialAnalysis {
    analyze_building_with(
        &AnalysisOptions::default(),
        building_id,
        building_name,
        snapshot,
        building_value,
    )
}

/// Same as [`analyze_building`] with explicit options.
pub fn analyze_building_with(
    options: &AnalysisOptions,
    building_id: &str,
    building_name: &str,
    snapshot: Option<&FinancialSnapshot>,
    building_value: Money,
) -> FinancialAnalysis {
    let analysis_date = options.analysis_date.unwrap_or_else(Utc::now);

    if snapshot.is_none() {
        tracing::warn!(building_id, "analysing without a financial snapshot");
    }
    if building_value <= Decimal::ZERO {
        tracing::warn!(
            building_id,
            %building_value,
            "non-positive building value, value ratios will be empty"
        );
    }

    let metrics = calculate_metrics(snapshot, building_value);
    tracing::debug!(
        building_id,
        noi = ?metrics.noi,
        cap_rate = ?metrics.cap_rate,
        "metrics computed"
    );

    let scores = calculate_scores(&metrics, snapshot);
    tracing::debug!(building_id, overall = scores.overall, "scores computed");

    let recommendation = generate_recommendation(&scores, &metrics, snapshot);
    tracing::debug!(
        building_id,
        recommendation = ?recommendation.recommendation_type,
        confidence = recommendation.confidence,
        "recommendation generated"
    );

    let mut rng = match options.trend_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let chart_data = build_chart_data(&scores, &metrics, analysis_date, &mut rng);

    FinancialAnalysis {
        building_id: building_id.to_string(),
        building_name: building_name.to_string(),
        analysis_date,
        scores,
        metrics,
        recommendation,
        chart_data,
    }
}

/// [`analyze_building_with`] wrapped in the standard output envelope, with
/// warnings for degraded inputs.
pub fn analyze_building_output(
    options: &AnalysisOptions,
    building_id: &str,
    building_name: &str,
    snapshot: Option<&FinancialSnapshot>,
    building_value: Money,
) -> ComputationOutput<FinancialAnalysis> {
    let start = Instant::now();

    let analysis = analyze_building_with(
        options,
        building_id,
        building_name,
        snapshot,
        building_value,
    );
    let warnings = collect_warnings(&analysis, snapshot.is_some());

    let assumptions = AnalysisAssumptions {
        building_id,
        building_value,
        snapshot_present: snapshot.is_some(),
        trend_seed: options.trend_seed,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Building Due Diligence (additive rule scoring)",
        &assumptions,
        warnings,
        elapsed,
        analysis,
    )
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

fn collect_warnings(analysis: &FinancialAnalysis, snapshot_present: bool) -> Vec<String> {
    let mut warnings = Vec::new();
    let m = &analysis.metrics;

    if !snapshot_present {
        warnings.push(
            "No financial snapshot available — metrics are empty and documentation risk is maximal"
                .into(),
        );
    }
    if m.market_value <= Decimal::ZERO {
        warnings.push(format!(
            "Building value {} is not positive — cap rate, ROI and value gap are not computed",
            m.market_value
        ));
    }
    if snapshot_present && m.noi.is_none() {
        warnings.push("Gross income or total OPEX unknown — NOI not computed".into());
    }
    if m.occupancy_rate.is_some() {
        warnings.push("Occupancy rate is a placeholder estimate, not derived from leases".into());
    }

    let impact = &analysis.recommendation.financial_impact;
    if analysis.recommendation.recommendation_type == RecommendationType::Mejorar
        && impact.payback_period_months < 0
    {
        warnings.push(format!(
            "Negative NOI gives a negative payback period ({} months)",
            impact.payback_period_months
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
