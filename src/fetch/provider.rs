use super::client::{ApiResult, Client, RateLimitInfo};
use super::enriched_repo::EnrichedRepo;
use super::models::{LanguageHistogram, RawRepo, ReadmeContent, SearchResponse};
use super::throttler::Throttler;
use super::window::{WindowKind, search_query};
use super::{Progress, ProviderResult};
use crate::Result;
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use ohno::{EnrichableExt, app_err};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

const LOG_TARGET: &str = "     fetch";

/// The search API returns at most this many results per page.
const MAX_PER_PAGE: usize = 100;

/// Knobs for the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Only repositories with at least this many stars are searched for.
    pub min_stars: u64,

    /// Number of repositories enriched concurrently.
    pub max_concurrent_requests: usize,

    /// Upper bound for a single request, and for a whole enrichment task.
    pub request_timeout: Duration,

    /// Longest time dispatch is held back after a rate-limit response.
    pub max_rate_limit_wait: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            min_stars: 50,
            max_concurrent_requests: 5,
            request_timeout: Duration::from_secs(30),
            max_rate_limit_wait: Duration::from_secs(60),
        }
    }
}

/// Result of one enrichment task, plus the rate-limit state it observed.
struct Attempt {
    result: ProviderResult<EnrichedRepo>,
    rate_limit: Option<RateLimitInfo>,
}

impl Attempt {
    const fn new(result: ProviderResult<EnrichedRepo>, rate_limit: Option<RateLimitInfo>) -> Self {
        Self { result, rate_limit }
    }
}

/// Fetches trending candidates and the per-repository data used to enrich them.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    throttler: Arc<Throttler>,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(token: Option<&str>, base_url: &str, options: FetchOptions, now: DateTime<Utc>) -> Result<Self> {
        let client = Client::new(token, base_url, options.request_timeout, now)?;
        Ok(Self {
            client,
            throttler: Throttler::new(options.max_concurrent_requests, options.max_rate_limit_wait),
            options,
        })
    }

    /// Search for trending repositories, most starred first.
    ///
    /// An empty or failed search in a non-weekly window is retried once with the weekly
    /// window. If that comes up empty too, an empty list is returned. Duplicate repositories
    /// are dropped, keeping the first occurrence.
    pub async fn search_trending(&self, window: WindowKind, language: &str, limit: usize, now: DateTime<Utc>) -> Vec<RawRepo> {
        if limit == 0 {
            return Vec::new();
        }

        for &attempt in window.fallback_chain() {
            if attempt != window {
                log::info!(target: LOG_TARGET, "No results in the {window} window, falling back to the {attempt} window");
            }

            match self.search_once(attempt, language, limit, now).await {
                Ok(repos) if !repos.is_empty() => {
                    log::info!(target: LOG_TARGET, "Found {} candidate(s) in the {attempt} window", repos.len());
                    return repos;
                }
                Ok(_) => log::info!(target: LOG_TARGET, "Search in the {attempt} window returned no repositories"),
                Err(e) => log::warn!(target: LOG_TARGET, "Search in the {attempt} window failed: {e:#}"),
            }
        }

        Vec::new()
    }

    async fn search_once(&self, window: WindowKind, language: &str, limit: usize, now: DateTime<Utc>) -> Result<Vec<RawRepo>> {
        let query = search_query(window, language, self.options.min_stars, now);
        let per_page = limit.min(MAX_PER_PAGE).to_string();
        let url = url::Url::parse_with_params(
            &self.client.endpoint("search/repositories"),
            [("q", query.as_str()), ("sort", "stars"), ("order", "desc"), ("per_page", per_page.as_str())],
        )
        .map_err(|e| app_err!("invalid search URL for base '{}': {e}", self.client.base_url()))?;

        let Some(_permit) = self.throttler.acquire().await else {
            ohno::bail!("request throttler closed");
        };

        log::debug!(target: LOG_TARGET, "Searching with query '{query}'");

        match self.client.get_json::<SearchResponse>(url.as_str()).await {
            ApiResult::Success(resp, rate_limit) => {
                if let Some(rl) = rate_limit {
                    log::debug!(target: LOG_TARGET, "{} search request(s) left before {}", rl.remaining, rl.reset_at);
                }
                log::debug!(target: LOG_TARGET, "Search matched {} repositories in total", resp.total_count);
                if resp.incomplete_results {
                    log::warn!(target: LOG_TARGET, "Search with query '{query}' timed out upstream; results are incomplete");
                }

                let mut items = dedup_by_name(resp.items);
                items.truncate(limit);
                Ok(items)
            }
            ApiResult::RateLimited(rl) => {
                let _ = self.throttler.pause_until(rl.reset_at, Utc::now());
                Err(app_err!("search rate limited until {}", rl.reset_at))
            }
            ApiResult::NotFound(_) => Err(app_err!("search endpoint not found at {}", self.client.base_url())),
            ApiResult::Failed(e, _) => Err(e.enrich_with(|| format!("searching with query '{query}'"))),
        }
    }

    /// Fetch detail, README and language histogram for every candidate.
    ///
    /// At most `max_concurrent_requests` repositories are enriched at once and each task is
    /// given `request_timeout` to finish. A task that fails for any reason is replaced by
    /// [`EnrichedRepo::minimal`] so the rest of the batch is unaffected. The output follows the
    /// order of `repos`, regardless of which task finished first.
    pub async fn enrich_batch(&self, repos: Vec<RawRepo>, progress: &dyn Progress) -> Vec<EnrichedRepo> {
        let repos = dedup_by_name(repos);
        let total = repos.len() as u64;
        let completed = Arc::new(AtomicU64::new(0));

        let completed_clone = Arc::clone(&completed);
        progress.set_determinate(Box::new(move || {
            let done = completed_clone.load(Ordering::Relaxed);
            (total, done, format!("{done}/{total} repositories"))
        }));

        let mut tasks = JoinSet::new();
        for repo in &repos {
            let client = self.client.clone();
            let throttler = Arc::clone(&self.throttler);
            let timeout = self.options.request_timeout;
            let repo = repo.clone();

            let _ = tasks.spawn(async move {
                let Some(_permit) = throttler.acquire().await else {
                    return (repo.full_name, ProviderResult::unavailable("request throttler closed"));
                };

                let attempt = match tokio::time::timeout(timeout, fetch_enrichment(&client, &repo)).await {
                    Ok(attempt) => attempt,
                    Err(_) => Attempt::new(
                        ProviderResult::error(app_err!("timed out after {}s", timeout.as_secs())),
                        None,
                    ),
                };

                if let Some(rl) = attempt.rate_limit.filter(|rl| rl.remaining == 0) {
                    let _ = throttler.pause_until(rl.reset_at, Utc::now());
                }

                (repo.full_name, attempt.result)
            });
        }

        let mut results: HashMap<String, ProviderResult<EnrichedRepo>> = HashMap::with_capacity(repos.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, result)) => {
                    let _ = results.insert(name, result);
                }
                Err(e) => log::warn!(target: LOG_TARGET, "An enrichment task did not complete: {e}"),
            }
            let _ = completed.fetch_add(1, Ordering::Relaxed);
        }

        repos
            .into_iter()
            .map(|repo| match results.remove(&repo.full_name) {
                Some(ProviderResult::Found(enriched)) => enriched,
                Some(other) => {
                    log::warn!(target: LOG_TARGET, "Using search data for '{}' ({other})", repo.full_name);
                    EnrichedRepo::minimal(repo)
                }
                None => {
                    log::warn!(target: LOG_TARGET, "Using search data for '{}' (task lost)", repo.full_name);
                    EnrichedRepo::minimal(repo)
                }
            })
            .collect()
    }
}

/// Fetch detail, README and languages for one repository, sequentially.
///
/// Only a failure to get the detail record fails the attempt; a missing or unreadable README
/// or language histogram just leaves that part empty.
async fn fetch_enrichment(client: &Client, repo: &RawRepo) -> Attempt {
    let Some((owner, name)) = repo.owner_and_name() else {
        return Attempt::new(
            ProviderResult::rejected(format!("'{}' is not an owner/name pair", repo.full_name)),
            None,
        );
    };

    let base = format!("repos/{owner}/{name}");
    let mut last_rate_limit = None;

    let detail = match client.get_json::<RawRepo>(&client.endpoint(&base)).await {
        ApiResult::Success(detail, rl) => {
            last_rate_limit = rl.or(last_rate_limit);
            detail
        }
        ApiResult::RateLimited(rl) => {
            return Attempt::new(ProviderResult::unavailable("rate limited"), Some(rl));
        }
        ApiResult::NotFound(rl) => {
            return Attempt::new(ProviderResult::unavailable(format!("repository '{}' not found", repo.full_name)), rl);
        }
        ApiResult::Failed(e, rl) => {
            let e = e.enrich_with(|| format!("fetching details for '{}'", repo.full_name));
            return Attempt::new(ProviderResult::error(e), rl);
        }
    };

    let readme = match client.get_json::<ReadmeContent>(&client.endpoint(&format!("{base}/readme"))).await {
        ApiResult::Success(content, rl) => {
            last_rate_limit = rl.or(last_rate_limit);
            content.decode().unwrap_or_else(|e| {
                log::debug!(target: LOG_TARGET, "Ignoring unreadable README for '{}': {e:#}", repo.full_name);
                String::new()
            })
        }
        ApiResult::NotFound(rl) => {
            last_rate_limit = rl.or(last_rate_limit);
            String::new()
        }
        ApiResult::RateLimited(rl) => {
            last_rate_limit = Some(rl);
            String::new()
        }
        ApiResult::Failed(e, rl) => {
            log::debug!(target: LOG_TARGET, "Could not fetch README for '{}': {e:#}", repo.full_name);
            last_rate_limit = rl.or(last_rate_limit);
            String::new()
        }
    };

    let languages = match client.get_json::<LanguageHistogram>(&client.endpoint(&format!("{base}/languages"))).await {
        ApiResult::Success(languages, rl) => {
            last_rate_limit = rl.or(last_rate_limit);
            languages
        }
        ApiResult::NotFound(rl) => {
            last_rate_limit = rl.or(last_rate_limit);
            LanguageHistogram::new()
        }
        ApiResult::RateLimited(rl) => {
            last_rate_limit = Some(rl);
            LanguageHistogram::new()
        }
        ApiResult::Failed(e, rl) => {
            log::debug!(target: LOG_TARGET, "Could not fetch languages for '{}': {e:#}", repo.full_name);
            last_rate_limit = rl.or(last_rate_limit);
            LanguageHistogram::new()
        }
    };

    log::debug!(target: LOG_TARGET, "Enriched '{}'", repo.full_name);
    Attempt::new(ProviderResult::Found(EnrichedRepo::from_parts(detail, readme, languages)), last_rate_limit)
}

fn dedup_by_name(repos: Vec<RawRepo>) -> Vec<RawRepo> {
    let mut seen = HashSet::with_capacity(repos.len());
    repos.into_iter().filter(|repo| seen.insert(repo.full_name.clone())).collect()
}
