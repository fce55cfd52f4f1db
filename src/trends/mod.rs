//! Week-over-week movement of repositories between consecutive reports.

mod analyzer;

pub use analyzer::{PreviousPosition, Trend, TrendAnalyzer, TrendPolicy, TrendStatus, classify};
