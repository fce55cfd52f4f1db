//! One crawl cycle, from search to stored report.

mod crawler;
mod outcome;

pub use crawler::{CrawlRequest, Crawler};
pub use outcome::{CrawlIssue, CrawlOutcome, CrawlStats, ExhaustionPolicy, FailureKind};
