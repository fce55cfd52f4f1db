use super::{HistoryPolicy, ReportStore, document};
use crate::Result;
use crate::model::WeeklyReport;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::IntoAppError;

const LOG_TARGET: &str = "     store";

/// Keeps one JSON document per report in a directory.
#[derive(Debug, Clone)]
pub struct JsonReportStore {
    dir: Utf8PathBuf,
    policy: HistoryPolicy,
}

impl JsonReportStore {
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>, policy: HistoryPolicy) -> Self {
        Self { dir: dir.into(), policy }
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn file_name(&self, report: &WeeklyReport) -> String {
        let label = report.period.label();
        match self.policy {
            HistoryPolicy::Upsert => format!("{label}.json"),
            HistoryPolicy::Append => format!("{label}_{}.json", report.generated_at.format("%Y%m%dT%H%M%S%.3fZ")),
        }
    }
}

impl ReportStore for JsonReportStore {
    fn load_all(&self) -> Result<Vec<WeeklyReport>> {
        if !self.dir.exists() {
            log::debug!(target: LOG_TARGET, "No report directory at '{}'", self.dir);
            return Ok(Vec::new());
        }

        let entries = self
            .dir
            .read_dir_utf8()
            .into_app_err_with(|| format!("unable to read report directory '{}'", self.dir))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.into_app_err_with(|| format!("unable to read report directory '{}'", self.dir))?;
            let path = entry.path();
            if path.extension() == Some("json") && path.is_file() {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();

        let mut reports = Vec::with_capacity(paths.len());
        for path in paths {
            match document::load::<WeeklyReport>(&path) {
                Ok(report) => reports.push(report),
                Err(e) => log::warn!(target: LOG_TARGET, "Skipping unreadable report: {e:#}"),
            }
        }

        log::debug!(target: LOG_TARGET, "Loaded {} report(s) from '{}'", reports.len(), self.dir);
        Ok(reports)
    }

    fn save(&self, report: &WeeklyReport) -> Result<Utf8PathBuf> {
        let path = self.dir.join(self.file_name(report));
        document::save(report, &path)?;

        log::info!(target: LOG_TARGET, "Saved report {} to '{path}'", report.period);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{EnrichedRepo, RawRepo, WindowKind};
    use crate::model::{Period, RepositorySnapshot};
    use chrono::{TimeZone, Utc};
    use std::fs;

    fn report(week: u32, names: &[&str], minute: u32) -> WeeklyReport {
        let generated = Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap();
        let repos = names
            .iter()
            .zip(1..)
            .map(|(name, rank)| {
                let repo = RawRepo {
                    full_name: (*name).into(),
                    ..RawRepo::default()
                };
                RepositorySnapshot::from_enriched(EnrichedRepo::minimal(repo), rank, generated)
            })
            .collect();
        WeeklyReport::new(Period::Week { year: 2024, week }, WindowKind::Weekly, generated, repos)
    }

    fn store(dir: &tempfile::TempDir, policy: HistoryPolicy) -> JsonReportStore {
        JsonReportStore::new(Utf8PathBuf::from_path_buf(dir.path().join("reports")).unwrap(), policy)
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_missing_directory_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, HistoryPolicy::Upsert);
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.previous_before(&Period::Week { year: 2024, week: 9 }).unwrap().is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_upsert_replaces_same_period() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, HistoryPolicy::Upsert);

        let first = store.save(&report(9, &["a/a"], 0)).unwrap();
        let second = store.save(&report(9, &["b/b", "c/c"], 5)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.file_name(), Some("2024-W09.json"));

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].total_repositories, 2);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_append_keeps_every_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, HistoryPolicy::Append);

        let _ = store.save(&report(9, &["a/a"], 0)).unwrap();
        let _ = store.save(&report(9, &["b/b"], 5)).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_previous_before_picks_latest_earlier_period() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, HistoryPolicy::Upsert);

        let _ = store.save(&report(7, &["old/one"], 0)).unwrap();
        let _ = store.save(&report(8, &["mid/one"], 0)).unwrap();
        let _ = store.save(&report(9, &["cur/one"], 0)).unwrap();

        let previous = store.previous_before(&Period::Week { year: 2024, week: 9 }).unwrap().unwrap();
        assert_eq!(previous.period, Period::Week { year: 2024, week: 8 });
        assert_eq!(previous.repositories[0].full_name, "mid/one");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri does not support file system operations")]
    fn test_unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, HistoryPolicy::Upsert);

        let _ = store.save(&report(9, &["a/a"], 0)).unwrap();
        fs::write(store.dir().join("garbage.json"), "{ not json").unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.load_all().unwrap().len(), 1);
    }
}
