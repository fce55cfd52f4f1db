use super::{Tally, TallyEntry};
use crate::fetch::UNKNOWN_LANGUAGE;
use crate::model::{Period, RepositorySnapshot, WeeklyReport};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How often a repository appeared across the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectAppearance {
    pub full_name: String,
    pub count: usize,

    /// Start date of the latest period the repository appeared in.
    pub last_seen: NaiveDate,
}

/// Repository counts for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodCount {
    pub period: Period,
    pub total: usize,

    /// Repositories seen for the first time in this period.
    pub new_projects: usize,
}

/// Frequency statistics over the whole report history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyStatistics {
    pub total_reports: usize,

    /// Days from the start of the earliest period through the end of the latest one.
    pub total_days: i64,

    pub unique_projects: usize,
    pub unique_technologies: usize,
    pub unique_languages: usize,
    pub unique_topics: usize,

    pub projects: Vec<ProjectAppearance>,
    pub technologies: Vec<TallyEntry>,
    pub languages: Vec<TallyEntry>,
    pub topics: Vec<TallyEntry>,
    pub periods: Vec<PeriodCount>,
}

impl FrequencyStatistics {
    /// The `n` most frequently seen repositories.
    #[must_use]
    pub fn top_projects(&self, n: usize) -> &[ProjectAppearance] {
        &self.projects[..n.min(self.projects.len())]
    }
}

/// Sort reports oldest first; reports for the same period keep generation order.
#[must_use]
pub fn chronological(reports: &[WeeklyReport]) -> Vec<&WeeklyReport> {
    let mut sorted: Vec<&WeeklyReport> = reports.iter().collect();
    sorted.sort_by(|a, b| a.period.cmp(&b.period).then_with(|| a.generated_at.cmp(&b.generated_at)));
    sorted
}

/// The technologies a snapshot is counted under.
///
/// Falls back to the language histogram and then to the primary language when the stack is
/// empty.
fn technologies_of(snapshot: &RepositorySnapshot) -> Vec<&str> {
    if !snapshot.tech_stack.is_empty() {
        return snapshot.tech_stack.iter().map(String::as_str).collect();
    }

    if !snapshot.languages.is_empty() {
        return snapshot.languages.keys().map(String::as_str).collect();
    }

    let primary = snapshot.primary_language.as_str();
    if primary.is_empty() || primary == UNKNOWN_LANGUAGE || primary == "None" {
        Vec::new()
    } else {
        vec![primary]
    }
}

/// Compute frequency statistics over a report history.
#[must_use]
pub fn compute_statistics(reports: &[WeeklyReport]) -> FrequencyStatistics {
    let history = chronological(reports);
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return FrequencyStatistics::default();
    };

    let mut projects = Tally::new();
    let mut last_seen: HashMap<&str, NaiveDate> = HashMap::new();
    let mut technologies = Tally::new();
    let mut languages = Tally::new();
    let mut topics = Tally::new();
    let mut seen_projects: HashSet<&str> = HashSet::new();
    let mut periods = Vec::with_capacity(history.len());

    for report in &history {
        let start = report.period.start_date();
        let mut new_projects = 0;

        for snapshot in &report.repositories {
            let name = snapshot.full_name.as_str();
            projects.add(name);
            let _ = last_seen.insert(name, start);
            if seen_projects.insert(name) {
                new_projects += 1;
            }

            for tech in technologies_of(snapshot) {
                technologies.add(tech);
            }

            if !snapshot.primary_language.is_empty() {
                languages.add(&snapshot.primary_language);
            }

            for topic in &snapshot.topics {
                topics.add(topic);
            }
        }

        periods.push(PeriodCount {
            period: report.period,
            total: report.repositories.len(),
            new_projects,
        });
    }

    let project_rows = projects
        .ranked()
        .into_iter()
        .map(|entry| ProjectAppearance {
            last_seen: last_seen.get(entry.name.as_str()).copied().unwrap_or(first.period.start_date()),
            full_name: entry.name,
            count: entry.count,
        })
        .collect();

    let earliest = history.iter().map(|r| r.period.start_date()).min().unwrap_or(first.period.start_date());
    let latest = history.iter().map(|r| r.period.end_date()).max().unwrap_or(last.period.end_date());

    FrequencyStatistics {
        total_reports: history.len(),
        total_days: (latest - earliest).num_days() + 1,
        unique_projects: projects.len(),
        unique_technologies: technologies.len(),
        unique_languages: languages.len(),
        unique_topics: topics.len(),
        projects: project_rows,
        technologies: technologies.ranked(),
        languages: languages.ranked(),
        topics: topics.ranked(),
        periods,
    }
}
