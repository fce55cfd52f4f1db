use crate::model::{Period, WeeklyReport};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Classification of what went wrong during a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Timeouts, server errors and rate limiting
    TransientFetch,

    /// Malformed upstream content
    Parse,

    /// Content that was fetched but did not pass a check
    Validation,

    /// No candidates were found, even after falling back
    Exhaustion,

    /// Anything else
    Unexpected,
}

/// What a crawl reports when it finds no candidates at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// The run fails with [`FailureKind::Exhaustion`]
    #[default]
    Failure,

    /// The run is skipped and nothing is stored
    EmptyCycle,
}

/// A problem confined to one repository that did not stop the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlIssue {
    pub full_name: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Counters describing one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Repositories returned by the search.
    pub candidates: usize,

    /// Repositories that were fully enriched.
    pub enriched: usize,

    /// Repositories that fell back to search data only.
    pub degraded: usize,

    /// Representative images stored.
    pub images: usize,

    /// Whether an earlier report was available for trend analysis.
    pub has_previous: bool,

    pub issues: Vec<CrawlIssue>,
}

/// The result of one crawl. A crawl never returns an error; failures are reported here.
#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    Success {
        report: Box<WeeklyReport>,
        location: Utf8PathBuf,
        stats: CrawlStats,
    },

    Skipped {
        period: Period,
        reason: String,
    },

    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl CrawlOutcome {
    pub(crate) fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    #[must_use]
    pub fn report(&self) -> Option<&WeeklyReport> {
        match self {
            Self::Success { report, .. } => Some(report),
            _ => None,
        }
    }
}

impl core::fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Success { report, location, stats } => write!(
                f,
                "stored {} repositories for {} at {location} ({} degraded, {} images)",
                report.total_repositories, report.period, stats.degraded, stats.images
            ),
            Self::Skipped { period, reason } => write!(f, "skipped {period}: {reason}"),
            Self::Failure { kind, message } => write!(f, "{kind} failure: {message}"),
        }
    }
}
