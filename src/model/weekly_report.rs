use super::{Period, ReportSummary, RepositorySnapshot};
use crate::Result;
use crate::fetch::WindowKind;
use chrono::{DateTime, Utc};
use ohno::bail;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The outcome of one crawl cycle: an ordered, scored list of repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub period: Period,

    #[serde(default)]
    pub window: WindowKind,

    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub total_repositories: usize,
    pub repositories: Vec<RepositorySnapshot>,

    /// Plain-text digest of the report.
    #[serde(default)]
    pub summary: Option<String>,
}

impl WeeklyReport {
    /// Assemble a report from snapshots that are already ranked and scored.
    #[must_use]
    pub fn new(period: Period, window: WindowKind, generated_at: DateTime<Utc>, repositories: Vec<RepositorySnapshot>) -> Self {
        let summary = ReportSummary::compute(&repositories).digest();
        Self {
            period,
            window,
            title: format!("Trending repositories {period}"),
            generated_at,
            total_repositories: repositories.len(),
            repositories,
            summary: Some(summary),
        }
    }

    #[must_use]
    pub fn summary_stats(&self) -> ReportSummary {
        ReportSummary::compute(&self.repositories)
    }

    /// Check the structural invariants of a report.
    ///
    /// Names must be unique, ranks must run 1..=N in list order, and the total must match.
    pub fn validate(&self) -> Result<()> {
        if self.total_repositories != self.repositories.len() {
            bail!(
                "report {} claims {} repositories but lists {}",
                self.period,
                self.total_repositories,
                self.repositories.len()
            );
        }

        let mut seen = HashSet::with_capacity(self.repositories.len());
        for (index, snapshot) in self.repositories.iter().enumerate() {
            if !seen.insert(snapshot.full_name.as_str()) {
                bail!("report {} lists '{}' more than once", self.period, snapshot.full_name);
            }

            let expected = u32::try_from(index + 1).unwrap_or(u32::MAX);
            if snapshot.rank != expected {
                bail!(
                    "report {} has '{}' at position {expected} with rank {}",
                    self.period,
                    snapshot.full_name,
                    snapshot.rank
                );
            }
        }

        Ok(())
    }
}
