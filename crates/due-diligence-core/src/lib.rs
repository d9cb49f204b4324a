pub mod analysis;
pub mod error;
pub mod types;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use analysis::{analyze_building, analyze_building_with, AnalysisOptions, FinancialAnalysis};
pub use error::DueDiligenceError;
pub use types::*;

/// Standard result type for the fallible surfaces around the engine
pub type DueDiligenceResult<T> = Result<T, DueDiligenceError>;
