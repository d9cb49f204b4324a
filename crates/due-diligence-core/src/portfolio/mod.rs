pub mod summary;

pub use summary::{analyze_portfolio, BuildingInput, PortfolioInput, PortfolioSummary};
