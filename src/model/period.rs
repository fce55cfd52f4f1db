use crate::fetch::WindowKind;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use core::cmp::Ordering;
use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// The period a report covers.
///
/// Weekly and monthly crawls are filed under the ISO week they ran in; daily crawls under
/// their date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Period {
    Week { year: i32, week: u32 },
    Day { date: NaiveDate },
}

impl Period {
    #[must_use]
    pub fn for_window(window: WindowKind, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        match window {
            WindowKind::Daily => Self::Day { date: today },
            WindowKind::Weekly | WindowKind::Monthly => {
                let iso = today.iso_week();
                Self::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
        }
    }

    /// First day of the period. For weeks this is the ISO Monday.
    ///
    /// A week number that does not exist in its year maps to the Unix epoch.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        match *self {
            Self::Week { year, week } => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).unwrap_or_default(),
            Self::Day { date } => date,
        }
    }

    /// Last day of the period, inclusive.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        match *self {
            Self::Week { .. } => {
                let start = self.start_date();
                start.checked_add_days(Days::new(6)).unwrap_or(start)
            }
            Self::Day { date } => date,
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match *self {
            Self::Week { year, week } => format!("{year}-W{week:02}"),
            Self::Day { date } => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_date()
            .cmp(&other.start_date())
            .then_with(|| self.end_date().cmp(&other.end_date()))
            .then_with(|| self.label().cmp(&other.label()))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
