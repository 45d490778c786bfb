pub mod catalog;
pub mod competitor;
pub mod detect;
pub mod dom;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod hero;
pub mod insights;
pub mod shopify;
pub mod text;

pub use competitor::{AnalysisSummary, CompetitorAnalysis, CompetitorInsight};
pub use error::EngineError;
pub use fetch::Fetcher;
pub use insights::InsightsEngine;
