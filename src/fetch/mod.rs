//! Search and per-repository enrichment against the hosting API.

mod client;
mod enriched_repo;
mod models;
mod progress;
mod provider;
mod provider_result;
mod throttler;
mod window;

pub use client::{ApiResult, Client, RateLimitInfo};
pub use enriched_repo::{EnrichedRepo, primary_language};
pub use models::{LanguageHistogram, Owner, RawRepo, ReadmeContent, SearchResponse, UNKNOWN_LANGUAGE};
pub use progress::Progress;
pub use provider::{FetchOptions, Fetcher};
pub use provider_result::ProviderResult;
pub use throttler::Throttler;
pub use window::{WindowKind, search_query};
