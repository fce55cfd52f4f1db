use crate::model::RepositorySnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// How a repository moved relative to the previous report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    /// Not present in the previous report
    #[default]
    New,

    /// Moved up the ranking
    Rising,

    /// Moved down the ranking
    Falling,

    /// Kept its rank
    Stable,
}

/// Decides how movement is classified when the rank did not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TrendPolicy {
    /// Only the rank delta counts; an unchanged rank is always stable
    #[default]
    RankOnly,

    /// An unchanged rank falls back to the sign of the star delta
    RankThenStars,
}

/// Trend fields of one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub status: TrendStatus,

    /// Current stars minus previous stars.
    pub star_change: i64,

    /// Previous rank minus current rank, so positive means the repository climbed.
    pub rank_change: i64,

    pub is_new: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_stars: Option<u64>,
}

impl Trend {
    /// The trend of a repository with no earlier sighting.
    #[must_use]
    pub const fn new_entry() -> Self {
        Self {
            status: TrendStatus::New,
            star_change: 0,
            rank_change: 0,
            is_new: true,
            previous_rank: None,
            previous_stars: None,
        }
    }
}

impl Default for Trend {
    fn default() -> Self {
        Self::new_entry()
    }
}

/// Where a repository stood in the previous report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousPosition {
    pub rank: u32,
    pub stars: u64,
}

/// Classify one repository's movement.
#[must_use]
pub fn classify(current_rank: u32, current_stars: u64, previous: Option<PreviousPosition>, policy: TrendPolicy) -> Trend {
    let Some(previous) = previous else {
        return Trend::new_entry();
    };

    let rank_change = i64::from(previous.rank) - i64::from(current_rank);
    let star_change = i64::try_from(current_stars).unwrap_or(i64::MAX) - i64::try_from(previous.stars).unwrap_or(i64::MAX);

    let deciding_delta = match policy {
        TrendPolicy::RankThenStars if rank_change == 0 => star_change,
        _ => rank_change,
    };

    let status = match deciding_delta {
        d if d > 0 => TrendStatus::Rising,
        d if d < 0 => TrendStatus::Falling,
        _ => TrendStatus::Stable,
    };

    Trend {
        status,
        star_change,
        rank_change,
        is_new: false,
        previous_rank: Some(previous.rank),
        previous_stars: Some(previous.stars),
    }
}

/// Compares a crawl against the report that preceded it.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    previous: HashMap<String, PreviousPosition>,
    policy: TrendPolicy,
}

impl TrendAnalyzer {
    /// Build an analyzer from the previous report's repositories.
    ///
    /// If a repository appears more than once, its best (lowest) rank is kept.
    #[must_use]
    #[expect(single_use_lifetimes, reason = "Required by Rust 2024 for impl Trait with references")]
    pub fn new<'a>(previous: impl IntoIterator<Item = &'a RepositorySnapshot>, policy: TrendPolicy) -> Self {
        let mut positions: HashMap<String, PreviousPosition> = HashMap::new();
        for snapshot in previous {
            let _ = positions
                .entry(snapshot.full_name.clone())
                .and_modify(|existing| {
                    if snapshot.rank < existing.rank {
                        *existing = PreviousPosition {
                            rank: snapshot.rank,
                            stars: snapshot.stars,
                        };
                    }
                })
                .or_insert(PreviousPosition {
                    rank: snapshot.rank,
                    stars: snapshot.stars,
                });
        }

        Self { previous: positions, policy }
    }

    #[must_use]
    pub fn analyze(&self, full_name: &str, rank: u32, stars: u64) -> Trend {
        classify(rank, stars, self.previous.get(full_name).copied(), self.policy)
    }
}
