//! Crawls a code-hosting search API for trending repositories and turns each crawl into a ranked,
//! comparable report.
//!
//! # Overview
//!
//! A crawl cycle runs the following pipeline:
//!
//! 1. **Fetch**: search for recently pushed, well-starred repositories and enrich each candidate
//!    with its detail record, README text and language histogram.
//! 2. **Enrich**: derive a capped technology stack and pick one representative README image.
//! 3. **Score**: compute activity, popularity, freshness and overall scores in `[0, 100]`.
//! 4. **Trend**: compare the cycle against the previous stored report.
//! 5. **Rank**: across all stored reports, compute frequency statistics and a log-normalized
//!    precision ranking.
//!
//! # Command Line
//!
//! ```bash
//! repo-trending crawl --since weekly --limit 25 --language rust
//! repo-trending stats --top 10
//! repo-trending init trending.toml
//! ```
//!
//! The GitHub token is read from `--github-token` or the `GITHUB_TOKEN` environment variable.
//! Unauthenticated runs work but are subject to much lower rate limits.
//!
//! # Configuration
//!
//! Settings are read from the first of `trending.toml`, `trending.yml`, `trending.yaml` or
//! `trending.json` found in the working directory, or from the file given with `--config`.
//! Run `repo-trending init` to write a commented default file.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod enrich;

#[doc(hidden)]
pub mod fetch;

#[doc(hidden)]
pub mod model;

#[doc(hidden)]
pub mod pipeline;

#[doc(hidden)]
pub mod ranking;

#[doc(hidden)]
pub mod reports;

#[doc(hidden)]
pub mod scoring;

#[doc(hidden)]
pub mod store;

#[doc(hidden)]
pub mod trends;
