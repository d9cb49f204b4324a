use clap::Args;
use serde_json::Value;

use due_diligence_core::portfolio::{self, PortfolioInput};

use crate::input;

/// Arguments for a portfolio summary
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON input file with the buildings to analyse
    #[arg(long)]
    pub input: Option<String>,

    /// Seed for the trend chart noise (overrides the file)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut portfolio_input: PortfolioInput = input::load_json(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for portfolio summary")?;
    if args.seed.is_some() {
        portfolio_input.trend_seed = args.seed;
    }
    let result = portfolio::analyze_portfolio(&portfolio_input)?;
    Ok(serde_json::to_value(result)?)
}
