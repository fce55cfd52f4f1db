//! Cross-period statistics and the precision ranking.

mod precision;
mod statistics;
mod tally;

pub use precision::{PrecisionEntry, precision_ranking};
pub use statistics::{FrequencyStatistics, PeriodCount, ProjectAppearance, chronological, compute_statistics};
pub use tally::{Tally, TallyEntry};
