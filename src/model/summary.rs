use super::RepositorySnapshot;
use crate::ranking::{Tally, TallyEntry};
use core::fmt::Write;
use serde::Serialize;

const TOP_LANGUAGES: usize = 8;
const TOP_TECHNOLOGIES: usize = 10;
const TOP_TOPICS: usize = 5;
const DIGEST_ENTRIES: usize = 5;

/// Aggregates over the repositories of a single report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_repositories: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub average_stars: u64,
    pub average_forks: u64,
    pub top_languages: Vec<TallyEntry>,
    pub top_technologies: Vec<TallyEntry>,
    pub top_topics: Vec<TallyEntry>,
}

impl ReportSummary {
    #[must_use]
    pub fn compute(repositories: &[RepositorySnapshot]) -> Self {
        let total_repositories = repositories.len();
        let total_stars: u64 = repositories.iter().map(|r| r.stars).sum();
        let total_forks: u64 = repositories.iter().map(|r| r.forks).sum();
        let divisor = (total_repositories as u64).max(1);

        let languages: Tally = repositories.iter().map(|r| r.primary_language.as_str()).collect();
        let technologies: Tally = repositories.iter().flat_map(|r| r.tech_stack.iter().map(String::as_str)).collect();
        let topics: Tally = repositories.iter().flat_map(|r| r.topics.iter().map(String::as_str)).collect();

        Self {
            total_repositories,
            total_stars,
            total_forks,
            average_stars: total_stars / divisor,
            average_forks: total_forks / divisor,
            top_languages: languages.top(TOP_LANGUAGES),
            top_technologies: technologies.top(TOP_TECHNOLOGIES),
            top_topics: topics.top(TOP_TOPICS),
        }
    }

    /// A short plain-text digest of the report.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "This report covers {} trending repositories.", self.total_repositories);

        if !self.top_languages.is_empty() {
            let _ = writeln!(text, "\nTop languages:");
            for entry in self.top_languages.iter().take(DIGEST_ENTRIES) {
                let _ = writeln!(text, "- {}: {} {}", entry.name, entry.count, plural(entry.count));
            }
        }

        if !self.top_topics.is_empty() {
            let _ = writeln!(text, "\nPopular topics:");
            for entry in self.top_topics.iter().take(DIGEST_ENTRIES) {
                let _ = writeln!(text, "- {}: {} {}", entry.name, entry.count, plural(entry.count));
            }
        }

        let _ = write!(
            text,
            "\nTogether they hold {} stars and {} forks ({} stars on average).",
            self.total_stars, self.total_forks, self.average_stars
        );
        text
    }
}

const fn plural(count: usize) -> &'static str {
    if count == 1 { "repository" } else { "repositories" }
}
