use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use due_diligence_core::analysis::engine::{analyze_building_output, AnalysisOptions};
use due_diligence_core::analysis::snapshot::FinancialSnapshot;

use crate::input;

/// Arguments for a single-building analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AnalyzeArgs {
    /// Building identifier
    #[arg(long)]
    pub building_id: String,

    /// Building display name (defaults to the id)
    #[arg(long)]
    pub building_name: Option<String>,

    /// Current market value of the building (EUR)
    #[arg(long)]
    pub building_value: Decimal,

    /// Path to the snapshot JSON; stdin is read when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Seed for the trend chart noise
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot: Option<FinancialSnapshot> = input::load_json(args.input.as_deref())?;
    if snapshot.is_none() {
        tracing::info!(building_id = %args.building_id, "no snapshot supplied");
    }

    let options = AnalysisOptions {
        trend_seed: args.seed,
        analysis_date: None,
    };
    let name = args.building_name.as_deref().unwrap_or(&args.building_id);

    let result = analyze_building_output(
        &options,
        &args.building_id,
        name,
        snapshot.as_ref(),
        args.building_value,
    );
    Ok(serde_json::to_value(result)?)
}
