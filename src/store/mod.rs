//! Persistence of crawl reports.
//!
//! The pipeline only talks to the [`ReportStore`] trait. [`JsonReportStore`] keeps one JSON
//! document per report in a directory.

mod document;
mod json_store;

use crate::Result;
use crate::model::{Period, WeeklyReport};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use json_store::JsonReportStore;

/// What happens when a report is saved for a period that already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HistoryPolicy {
    /// The new report replaces the stored one
    #[default]
    Upsert,

    /// Every run is kept as its own historical record
    Append,
}

/// Storage for the report history.
pub trait ReportStore: Send + Sync {
    /// All stored reports, in no particular order.
    fn load_all(&self) -> Result<Vec<WeeklyReport>>;

    /// Persist a report and return where it was written.
    fn save(&self, report: &WeeklyReport) -> Result<Utf8PathBuf>;

    /// The most recent report whose period precedes `period`.
    fn previous_before(&self, period: &Period) -> Result<Option<WeeklyReport>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.period < *period)
            .max_by(|a, b| a.period.cmp(&b.period).then_with(|| a.generated_at.cmp(&b.generated_at))))
    }
}
