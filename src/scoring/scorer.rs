use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The raw metrics a repository is scored on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreInputs {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Normalized scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scores {
    pub activity: u8,
    pub popularity: u8,
    pub freshness: u8,
    pub overall: u8,
}

/// Score a repository as of `now`.
///
/// Rounding is half away from zero. Timestamps in the future count as zero days old; a
/// missing push time scores no recency and a missing creation time gets the lowest freshness.
#[must_use]
pub fn score(inputs: &ScoreInputs, now: DateTime<Utc>) -> Scores {
    let activity = activity_score(inputs, now);
    let popularity = popularity_score(inputs);
    let freshness = freshness_score(inputs.created_at.map(|created| days_since(created, now)));
    let overall = to_score(f64::from(activity).mul_add(0.3, f64::from(popularity).mul_add(0.5, f64::from(freshness) * 0.2)));

    Scores {
        activity,
        popularity,
        freshness,
        overall,
    }
}

#[must_use]
#[expect(clippy::cast_precision_loss, reason = "counts stay far below 2^52")]
pub fn activity_score(inputs: &ScoreInputs, now: DateTime<Utc>) -> u8 {
    let push_recency = inputs
        .pushed_at
        .map_or(0.0, |pushed| (100.0 - days_since(pushed, now) as f64 * 2.0).max(0.0));
    let issues = (inputs.open_issues as f64 * 2.0).min(100.0);
    let forks = (inputs.forks as f64 / 10.0).min(100.0);

    to_score(push_recency * 0.5 + issues * 0.3 + forks * 0.2)
}

#[must_use]
pub fn popularity_score(inputs: &ScoreInputs) -> u8 {
    let stars = log_component(inputs.stars, 20.0);
    let forks = log_component(inputs.forks, 25.0);
    let watchers = log_component(inputs.watchers, 30.0);

    to_score(stars * 0.6 + forks * 0.25 + watchers * 0.15)
}

/// Step function of the repository's age in days.
#[must_use]
pub const fn freshness_score(age_days: Option<i64>) -> u8 {
    match age_days {
        Some(days) if days <= 30 => 100,
        Some(days) if days <= 90 => 80,
        Some(days) if days <= 180 => 60,
        Some(days) if days <= 365 => 40,
        _ => 20,
    }
}

#[expect(clippy::cast_precision_loss, reason = "counts stay far below 2^52")]
fn log_component(metric: u64, factor: f64) -> f64 {
    ((metric as f64 + 1.0).log10() * factor).min(100.0)
}

/// Whole days elapsed, never negative.
fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days().max(0)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "value is clamped to 0..=100 first")]
fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
