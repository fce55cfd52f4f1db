use super::statistics::chronological;
use crate::model::WeeklyReport;
use serde::Serialize;
use std::collections::HashMap;

const STARS_WEIGHT: f64 = 0.4;
const FORKS_WEIGHT: f64 = 0.6;

/// One repository in the precision ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecisionEntry {
    pub full_name: String,
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    pub log_stars: f64,
    pub log_forks: f64,
    pub normalized_stars: f64,
    pub normalized_forks: f64,
    pub score: f64,
}

#[expect(clippy::cast_precision_loss, reason = "star and fork counts stay far below 2^52")]
fn log_transform(value: u64) -> f64 {
    (value as f64 + 1.0).log10()
}

/// Min-max normalize a list of values.
///
/// A single value normalizes to 1.0. Several identical values normalize to 0.0.
fn normalize(values: &[f64]) -> Vec<f64> {
    if values.len() == 1 {
        return vec![1.0];
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|v| if range > 0.0 { (v - min) / range } else { 0.0 })
        .collect()
}

/// Rank every repository ever reported by log-normalized stars and forks.
///
/// Each repository is taken with the stars and forks of the most recent report it appeared
/// in. Ties keep the order in which repositories were first encountered.
#[must_use]
pub fn precision_ranking(reports: &[WeeklyReport]) -> Vec<PrecisionEntry> {
    let mut universe: Vec<PrecisionEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for report in chronological(reports) {
        for snapshot in &report.repositories {
            let slot = *index.entry(snapshot.full_name.clone()).or_insert_with(|| {
                universe.push(PrecisionEntry {
                    full_name: snapshot.full_name.clone(),
                    name: String::new(),
                    stars: 0,
                    forks: 0,
                    log_stars: 0.0,
                    log_forks: 0.0,
                    normalized_stars: 0.0,
                    normalized_forks: 0.0,
                    score: 0.0,
                });
                universe.len() - 1
            });

            let entry = &mut universe[slot];
            entry.name.clone_from(&snapshot.name);
            entry.stars = snapshot.stars;
            entry.forks = snapshot.forks;
        }
    }

    if universe.is_empty() {
        return universe;
    }

    for entry in &mut universe {
        entry.log_stars = log_transform(entry.stars);
        entry.log_forks = log_transform(entry.forks);
    }

    let stars = normalize(&universe.iter().map(|e| e.log_stars).collect::<Vec<_>>());
    let forks = normalize(&universe.iter().map(|e| e.log_forks).collect::<Vec<_>>());

    for ((entry, s), f) in universe.iter_mut().zip(stars).zip(forks) {
        entry.normalized_stars = s;
        entry.normalized_forks = f;
        entry.score = s * STARS_WEIGHT + f * FORKS_WEIGHT;
    }

    universe.sort_by(|a, b| b.score.total_cmp(&a.score));
    universe
}
