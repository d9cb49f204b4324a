use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use due_diligence_core::analysis::engine::{analyze_building_output, AnalysisOptions};
use due_diligence_core::analysis::snapshot::FinancialSnapshot;
use due_diligence_core::Money;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Request shape sent by the dashboard for a single building.
#[derive(Deserialize)]
struct AnalyzeBuildingRequest {
    building_id: String,
    building_name: String,
    building_value: Money,
    #[serde(default)]
    snapshot: Option<FinancialSnapshot>,
    #[serde(default)]
    options: AnalysisOptions,
}

// ---------------------------------------------------------------------------
// Due diligence
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_building(input_json: String) -> NapiResult<String> {
    let req: AnalyzeBuildingRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analyze_building_output(
        &req.options,
        &req.building_id,
        &req.building_name,
        req.snapshot.as_ref(),
        req.building_value,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_portfolio(input_json: String) -> NapiResult<String> {
    let input: due_diligence_core::portfolio::PortfolioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        due_diligence_core::portfolio::analyze_portfolio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
