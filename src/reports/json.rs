use crate::Result;
use crate::model::WeeklyReport;
use crate::pipeline::CrawlStats;
use crate::ranking::{FrequencyStatistics, PrecisionEntry};
use core::fmt::Write;
use serde_json::json;

/// Write a crawl report, and the counters of the run that produced it, as JSON.
pub fn generate_report<W: Write>(report: &WeeklyReport, stats: Option<&CrawlStats>, writer: &mut W) -> Result<()> {
    let output = json!({
        "report": report,
        "summary_stats": report.summary_stats(),
        "crawl": stats,
    });

    write!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

/// Write the frequency statistics and the precision ranking as JSON.
pub fn generate_statistics<W: Write>(stats: &FrequencyStatistics, ranking: &[PrecisionEntry], writer: &mut W) -> Result<()> {
    let output = json!({
        "statistics": stats,
        "precision_ranking": ranking,
    });

    write!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
