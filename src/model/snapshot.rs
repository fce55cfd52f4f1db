use crate::enrich::ImageRef;
use crate::fetch::{EnrichedRepo, LanguageHistogram};
use crate::scoring::{ScoreInputs, Scores, score};
use crate::trends::Trend;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One repository's state in one crawl cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    /// Position in the report, starting at 1.
    pub rank: u32,

    pub full_name: String,
    pub name: String,
    pub owner: String,

    #[serde(default)]
    pub owner_avatar_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub homepage: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,

    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub watchers: u64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,

    pub primary_language: String,

    #[serde(default)]
    pub languages: LanguageHistogram,

    #[serde(default)]
    pub topics: Vec<String>,

    #[serde(default)]
    pub tech_stack: Vec<String>,

    pub scores: Scores,

    #[serde(default)]
    pub trend: Trend,

    #[serde(default)]
    pub image: Option<ImageRef>,

    /// Set when the repository could not be enriched and carries search data only.
    #[serde(default)]
    pub degraded: bool,
}

impl RepositorySnapshot {
    /// Build a scored snapshot; the trend starts out as a new entry.
    #[must_use]
    pub fn from_enriched(enriched: EnrichedRepo, rank: u32, now: DateTime<Utc>) -> Self {
        let EnrichedRepo {
            repo,
            languages,
            primary_language,
            tech_stack,
            degraded,
            ..
        } = enriched;

        let owner = repo.owner.unwrap_or_default();
        let owner_login = if owner.login.is_empty() {
            repo.full_name.split('/').next().unwrap_or_default().to_string()
        } else {
            owner.login
        };
        let name = if repo.name.is_empty() {
            repo.full_name.rsplit('/').next().unwrap_or_default().to_string()
        } else {
            repo.name
        };

        let mut snapshot = Self {
            rank,
            full_name: repo.full_name,
            name,
            owner: owner_login,
            owner_avatar_url: owner.avatar_url,
            description: repo.description,
            homepage: repo.homepage.filter(|h| !h.is_empty()),
            html_url: repo.html_url,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
            watchers: repo.watchers_count,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            pushed_at: repo.pushed_at,
            primary_language,
            languages,
            topics: repo.topics,
            tech_stack,
            scores: Scores::default(),
            trend: Trend::new_entry(),
            image: None,
            degraded,
        };

        snapshot.scores = score(&snapshot.score_inputs(), now);
        snapshot
    }

    #[must_use]
    pub const fn score_inputs(&self) -> ScoreInputs {
        ScoreInputs {
            stars: self.stars,
            forks: self.forks,
            watchers: self.watchers,
            open_issues: self.open_issues,
            created_at: self.created_at,
            pushed_at: self.pushed_at,
        }
    }
}
