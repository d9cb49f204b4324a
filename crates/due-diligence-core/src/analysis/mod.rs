pub mod charts;
pub mod engine;
pub mod metrics;
pub mod recommendation;
pub mod scoring;
pub mod snapshot;

pub use engine::{
    analyze_building, analyze_building_output, analyze_building_with, AnalysisOptions,
    FinancialAnalysis,
};
pub use snapshot::FinancialSnapshot;
