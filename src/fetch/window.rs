use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The time window a crawl looks back over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize, ValueEnum)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Repositories pushed in the last 3 days
    Daily,

    /// Repositories pushed in the last 7 days
    #[default]
    Weekly,

    /// Repositories pushed in the last 30 days
    Monthly,
}

impl WindowKind {
    #[must_use]
    pub const fn lookback_days(self) -> i64 {
        match self {
            Self::Daily => 3,
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }

    /// The earliest push date a repository may have to fall inside this window.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> NaiveDate {
        (now - Duration::days(self.lookback_days())).date_naive()
    }

    /// The windows to try, in order, when searching.
    ///
    /// A search that comes back empty in a non-weekly window gets exactly one more attempt in
    /// the weekly window.
    #[must_use]
    pub const fn fallback_chain(self) -> &'static [Self] {
        match self {
            Self::Daily => &[Self::Daily, Self::Weekly],
            Self::Weekly => &[Self::Weekly],
            Self::Monthly => &[Self::Monthly, Self::Weekly],
        }
    }
}

/// Build the search qualifier string for a window.
#[must_use]
pub fn search_query(window: WindowKind, language: &str, min_stars: u64, now: DateTime<Utc>) -> String {
    let mut query = format!("pushed:>{} stars:>={min_stars}", window.since(now).format("%Y-%m-%d"));

    let language = language.trim();
    if !language.is_empty() {
        query.push_str(" language:");
        query.push_str(language);
    }

    query
}
