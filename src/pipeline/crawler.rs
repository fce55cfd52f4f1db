use super::outcome::{CrawlIssue, CrawlOutcome, CrawlStats, ExhaustionPolicy, FailureKind};
use crate::Result;
use crate::config::Config;
use crate::enrich::{ImageDownloader, ImageRef, sanitize_file_name};
use crate::fetch::{EnrichedRepo, Fetcher, Progress, ProviderResult, WindowKind};
use crate::model::{Period, RepositorySnapshot, WeeklyReport};
use crate::store::ReportStore;
use crate::trends::{TrendAnalyzer, TrendPolicy};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Log target for the crawler
const LOG_TARGET: &str = "   crawler";

/// What to crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub window: WindowKind,

    /// Restrict the search to one language; empty means any language.
    pub language: String,

    pub limit: usize,
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            window: WindowKind::Weekly,
            language: String::new(),
            limit: 10,
        }
    }
}

/// Runs one crawl cycle: search, enrich, score, trend, store.
pub struct Crawler {
    fetcher: Fetcher,
    images: Option<ImageDownloader>,
    images_dir: Utf8PathBuf,
    store: Arc<dyn ReportStore>,
    trend_policy: TrendPolicy,
    exhaustion_policy: ExhaustionPolicy,
}

impl core::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Crawler")
            .field("fetcher", &self.fetcher)
            .field("images", &self.images)
            .field("images_dir", &self.images_dir)
            .field("trend_policy", &self.trend_policy)
            .field("exhaustion_policy", &self.exhaustion_policy)
            .finish_non_exhaustive()
    }
}

impl Crawler {
    /// Create a crawler from a configuration.
    ///
    /// Images are stored below `images_dir`, one directory per period and repository.
    pub fn new(
        config: &Config,
        github_token: Option<&str>,
        store: Arc<dyn ReportStore>,
        images_dir: impl Into<Utf8PathBuf>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let fetcher = Fetcher::new(github_token, &config.api_base_url, config.fetch_options(), now)?;
        let images = if config.download_images {
            Some(ImageDownloader::new(
                config.max_image_bytes,
                config.request_timeout(),
                config.raw_content_base_url.clone(),
            )?)
        } else {
            None
        };

        Ok(Self {
            fetcher,
            images,
            images_dir: images_dir.into(),
            store,
            trend_policy: config.trend_policy,
            exhaustion_policy: config.exhaustion_policy,
        })
    }

    /// Run one crawl cycle.
    ///
    /// Never fails: every error is logged and reported through the returned outcome.
    pub async fn run(&self, request: &CrawlRequest, now: DateTime<Utc>, progress: &dyn Progress) -> CrawlOutcome {
        match self.try_run(request, now, progress).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!(target: LOG_TARGET, "Crawl failed: {e:#}");
                CrawlOutcome::failure(FailureKind::Unexpected, format!("{e:#}"))
            }
        }
    }

    async fn try_run(&self, request: &CrawlRequest, now: DateTime<Utc>, progress: &dyn Progress) -> Result<CrawlOutcome> {
        if request.limit == 0 {
            return Ok(CrawlOutcome::failure(FailureKind::Validation, "the repository limit must be at least 1"));
        }

        let period = Period::for_window(request.window, now);
        log::info!(target: LOG_TARGET, "Crawling {} ({} window, limit {})", period, request.window, request.limit);

        progress.set_phase("Searching");
        let window = request.window;
        progress.set_indeterminate(Box::new(move || format!("{window} candidates")));

        let candidates = self.fetcher.search_trending(request.window, &request.language, request.limit, now).await;
        if candidates.is_empty() {
            let reason = format!("no repositories found for the {} window", request.window);
            return Ok(match self.exhaustion_policy {
                ExhaustionPolicy::Failure => CrawlOutcome::failure(FailureKind::Exhaustion, reason),
                ExhaustionPolicy::EmptyCycle => {
                    log::warn!(target: LOG_TARGET, "Skipping {period}: {reason}");
                    CrawlOutcome::Skipped { period, reason }
                }
            });
        }

        let mut stats = CrawlStats {
            candidates: candidates.len(),
            ..CrawlStats::default()
        };

        progress.set_phase("Enriching");
        let enriched = self.fetcher.enrich_batch(candidates, progress).await;

        for repo in enriched.iter().filter(|r| r.degraded) {
            stats.issues.push(CrawlIssue {
                full_name: repo.full_name().to_string(),
                kind: FailureKind::TransientFetch,
                message: "enrichment failed, using search data only".to_string(),
            });
        }
        stats.degraded = stats.issues.len();
        stats.enriched = enriched.len() - stats.degraded;

        let mut snapshots = self.build_snapshots(enriched, &period, now, &mut stats, progress).await;

        progress.set_phase("Comparing");
        progress.set_indeterminate(Box::new(|| "previous report".to_string()));

        let previous = self.store.previous_before(&period)?;
        stats.has_previous = previous.is_some();
        let analyzer = TrendAnalyzer::new(previous.iter().flat_map(|p| p.repositories.iter()), self.trend_policy);
        if let Some(previous) = &previous {
            log::debug!(target: LOG_TARGET, "Comparing against {}", previous.period);
        }

        for snapshot in &mut snapshots {
            snapshot.trend = analyzer.analyze(&snapshot.full_name, snapshot.rank, snapshot.stars);
        }

        let report = WeeklyReport::new(period, request.window, now, snapshots);
        if let Err(e) = report.validate() {
            log::error!(target: LOG_TARGET, "Refusing to store an inconsistent report: {e:#}");
            return Ok(CrawlOutcome::failure(FailureKind::Validation, format!("{e:#}")));
        }

        progress.set_phase("Storing");
        let location = self.store.save(&report)?;

        Ok(CrawlOutcome::Success {
            report: Box::new(report),
            location,
            stats,
        })
    }

    /// Rank, score and attach images, in search order.
    async fn build_snapshots(
        &self,
        enriched: Vec<EnrichedRepo>,
        period: &Period,
        now: DateTime<Utc>,
        stats: &mut CrawlStats,
        progress: &dyn Progress,
    ) -> Vec<RepositorySnapshot> {
        let total = enriched.len() as u64;
        let done = Arc::new(AtomicU64::new(0));

        if self.images.is_some() {
            progress.set_phase("Images");
            let counter = Arc::clone(&done);
            progress.set_determinate(Box::new(move || (total, counter.load(Ordering::Relaxed), "representative images".to_string())));
        }

        let period_dir = self.images_dir.join(period.label());
        let mut snapshots = Vec::with_capacity(enriched.len());

        for (rank, repo) in (1..).zip(enriched) {
            let image = match &self.images {
                Some(downloader) if !repo.readme.is_empty() => {
                    let image = self.fetch_image(downloader, &repo, &period_dir, stats).await;
                    let _ = done.fetch_add(1, Ordering::Relaxed);
                    image
                }
                _ => {
                    let _ = done.fetch_add(1, Ordering::Relaxed);
                    None
                }
            };

            let mut snapshot = RepositorySnapshot::from_enriched(repo, rank, now);
            snapshot.image = image;
            snapshots.push(snapshot);
        }

        snapshots
    }

    async fn fetch_image(
        &self,
        downloader: &ImageDownloader,
        repo: &EnrichedRepo,
        period_dir: &Utf8Path,
        stats: &mut CrawlStats,
    ) -> Option<ImageRef> {
        let full_name = repo.full_name();
        let dest = period_dir.join(sanitize_file_name(full_name));

        let (kind, message) = match downloader
            .extract_representative_image(&repo.readme, full_name, repo.repo.default_branch.as_deref(), &dest)
            .await
        {
            ProviderResult::Found(image) => {
                stats.images += 1;
                return Some(image);
            }
            ProviderResult::Unavailable(_) => return None,
            ProviderResult::Rejected(reason) => (FailureKind::Validation, reason.to_string()),
            ProviderResult::Error(e) => (FailureKind::TransientFetch, format!("{e:#}")),
        };

        stats.issues.push(CrawlIssue {
            full_name: full_name.to_string(),
            kind,
            message,
        });
        None
    }
}
