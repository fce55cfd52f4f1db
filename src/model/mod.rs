//! Report data model.

mod period;
mod snapshot;
mod summary;
mod weekly_report;

pub use period::Period;
pub use snapshot::RepositorySnapshot;
pub use summary::ReportSummary;
pub use weekly_report::WeeklyReport;
