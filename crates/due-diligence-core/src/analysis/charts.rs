use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::metrics::FinancialAnalysisMetrics;
use super::scoring::FinancialAnalysisScore;
use crate::types::{capped_mul, Money, Percent, Score};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub category: String,
    pub value: Score,
    pub full_mark: Score,
}

/// One synthetic month of the illustrative trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub noi: Money,
    pub opex_ratio: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub name: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub radar: Vec<RadarPoint>,
    pub trend: Vec<TrendPoint>,
    pub risk_distribution: Vec<RiskBucket>,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TREND_MONTHS: u32 = 6;

/// Half-width of the uniform noise band applied to each trend point.
const TREND_NOISE: f64 = 0.05;

/// Per-month drift; the last month sits on the current value.
const TREND_DRIFT: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reshape scores and metrics into presentation series.
///
/// The trend is synthetic: current NOI and OPEX ratio perturbed by bounded
/// noise plus a linear drift. It is not a forecast and, unlike the rest of
/// the analysis, differs between runs unless `rng` is seeded.
pub fn build_chart_data<R: Rng>(
    scores: &FinancialAnalysisScore,
    metrics: &FinancialAnalysisMetrics,
    as_of: DateTime<Utc>,
    rng: &mut R,
) -> ChartData {
    ChartData {
        radar: build_radar(scores),
        trend: build_trend(metrics, as_of, rng),
        risk_distribution: build_risk_distribution(metrics),
    }
}

fn build_radar(scores: &FinancialAnalysisScore) -> Vec<RadarPoint> {
    [
        ("Financiero", scores.financial),
        ("Operacional", scores.operational),
        ("Técnico", scores.technical),
        ("Mercado", scores.market),
    ]
    .into_iter()
    .map(|(category, value)| RadarPoint {
        category: category.to_string(),
        value,
        full_mark: 100,
    })
    .collect()
}

fn build_trend<R: Rng>(
    metrics: &FinancialAnalysisMetrics,
    as_of: DateTime<Utc>,
    rng: &mut R,
) -> Vec<TrendPoint> {
    let base_noi = metrics.noi.unwrap_or(Decimal::ZERO);
    let base_ratio = metrics.opex_ratio.unwrap_or(Decimal::ZERO);
    let last = Decimal::from(TREND_MONTHS - 1);

    (0..TREND_MONTHS)
        .map(|i| {
            let noise = Decimal::from_f64(rng.gen_range(-TREND_NOISE..TREND_NOISE))
                .unwrap_or(Decimal::ZERO);
            let drift = TREND_DRIFT * (Decimal::from(i) - last);
            let factor = Decimal::ONE + noise + drift;

            TrendPoint {
                month: month_label(as_of, TREND_MONTHS - 1 - i),
                noi: capped_mul(base_noi, factor).round_dp(2),
                opex_ratio: capped_mul(base_ratio, factor).round_dp(2),
            }
        })
        .collect()
}

fn build_risk_distribution(metrics: &FinancialAnalysisMetrics) -> Vec<RiskBucket> {
    [
        ("Concentración", metrics.concentration_risk),
        ("Documentación", metrics.documentation_risk),
        ("Deuda", metrics.debt_risk),
    ]
    .into_iter()
    .map(|(name, value)| RiskBucket {
        name: name.to_string(),
        value,
    })
    .collect()
}

/// `YYYY-MM` label `months_back` months before `as_of`.
fn month_label(as_of: DateTime<Utc>, months_back: u32) -> String {
    let index = as_of.year() * 12 + as_of.month0() as i32 - months_back as i32;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) + 1;
    format!("{year:04}-{month:02}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::metrics::calculate_metrics;
    use crate::analysis::snapshot::FinancialSnapshot;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_scores() -> FinancialAnalysisScore {
        FinancialAnalysisScore {
            overall: 72,
            financial: 80,
            operational: 65,
            technical: 55,
            market: 70,
        }
    }

    fn sample_metrics() -> FinancialAnalysisMetrics {
        let snap = FinancialSnapshot {
            gross_annual_income: Some(dec!(100000)),
            opex_total: Some(dec!(30000)),
            top_tenant_concentration: Some(dec!(0.4)),
            dscr: Some(dec!(1.1)),
            ..Default::default()
        };
        calculate_metrics(Some(&snap), dec!(1000000))
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_radar_mirrors_scores() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = build_chart_data(&sample_scores(), &sample_metrics(), as_of(), &mut rng);
        let values: Vec<Score> = data.radar.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![80, 65, 55, 70]);
        assert!(data.radar.iter().all(|p| p.full_mark == 100));
    }

    #[test]
    fn test_trend_labels_cross_year() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = build_chart_data(&sample_scores(), &sample_metrics(), as_of(), &mut rng);
        let months: Vec<&str> = data.trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]
        );
    }

    #[test]
    fn test_trend_noise_is_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let data = build_chart_data(&sample_scores(), &sample_metrics(), as_of(), &mut rng);
        for (i, p) in data.trend.iter().enumerate() {
            let drift = dec!(0.01) * (Decimal::from(i as u32) - dec!(5));
            let centre = dec!(70000) * (Decimal::ONE + drift);
            assert!((p.noi - centre).abs() <= dec!(3500.01), "point {i}: {}", p.noi);
        }
    }

    #[test]
    fn test_seeded_trend_reproducible() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        let first = build_chart_data(&sample_scores(), &sample_metrics(), as_of(), &mut a);
        let second = build_chart_data(&sample_scores(), &sample_metrics(), as_of(), &mut b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_noi_trend_is_flat_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let metrics = calculate_metrics(None, dec!(1000000));
        let data = build_chart_data(&sample_scores(), &metrics, as_of(), &mut rng);
        assert!(data.trend.iter().all(|p| p.noi.is_zero() && p.opex_ratio.is_zero()));
    }

    #[test]
    fn test_trend_saturates_at_decimal_cap() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut metrics = sample_metrics();
        metrics.noi = Some(crate::types::DECIMAL_CAP);
        let data = build_chart_data(&sample_scores(), &metrics, as_of(), &mut rng);
        assert_eq!(data.trend.len(), 6);
        assert!(data.trend.iter().all(|p| p.noi > Decimal::ZERO));
    }

    #[test]
    fn test_risk_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = build_chart_data(&sample_scores(), &sample_metrics(), as_of(), &mut rng);
        let values: Vec<Decimal> = data.risk_distribution.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![dec!(40), dec!(100), dec!(60)]);
    }
}
