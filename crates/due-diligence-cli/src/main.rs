mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::AnalyzeArgs;
use commands::portfolio::PortfolioArgs;

/// Building due-diligence analysis
#[derive(Parser)]
#[command(
    name = "ddx",
    version,
    about = "Building due-diligence analysis",
    long_about = "Computes metrics, category scores and a hold / improve / sell \
                  recommendation for a building from its financial snapshot, \
                  or summarises a whole portfolio."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a single building from its snapshot
    Analyze(AnalyzeArgs),
    /// Analyse and rank every building in a portfolio file
    Portfolio(PortfolioArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Version => {
            println!("ddx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
