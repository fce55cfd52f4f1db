use crate::Result;
use crate::model::WeeklyReport;
use crate::ranking::{FrequencyStatistics, PrecisionEntry, TallyEntry};
use crate::trends::{Trend, TrendStatus};
use core::fmt::Write;
use owo_colors::OwoColorize;

const NAME_WIDTH: usize = 40;

/// Write a crawl report as a table followed by its digest.
pub fn generate_report<W: Write>(report: &WeeklyReport, use_colors: bool, writer: &mut W) -> Result<()> {
    heading(writer, &report.title, use_colors)?;
    writeln!(writer, "Generated {} from the {} window", report.generated_at.format("%Y-%m-%d %H:%M UTC"), report.window)?;
    writeln!(writer)?;

    if report.repositories.is_empty() {
        writeln!(writer, "No repositories.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:>4}  {:<NAME_WIDTH$}  {:>8}  {:>7}  {:<12}  {:>5}  {}",
        "#", "Repository", "Stars", "Forks", "Language", "Score", "Trend"
    )?;

    for repo in &report.repositories {
        let marker = if repo.degraded { "*" } else { "" };
        let name = format!("{}{marker}", truncate(&repo.full_name, NAME_WIDTH - marker.len()));
        writeln!(
            writer,
            "{:>4}  {:<NAME_WIDTH$}  {:>8}  {:>7}  {:<12}  {:>5}  {}",
            repo.rank,
            name,
            repo.stars,
            repo.forks,
            truncate(&repo.primary_language, 12),
            repo.scores.overall,
            format_trend(&repo.trend, use_colors)
        )?;
    }

    if report.repositories.iter().any(|r| r.degraded) {
        writeln!(writer)?;
        writeln!(writer, "* enrichment failed; search data only")?;
    }

    if let Some(summary) = &report.summary {
        writeln!(writer)?;
        writeln!(writer, "{summary}")?;
    }

    Ok(())
}

/// Write the frequency statistics and the precision ranking.
pub fn generate_statistics<W: Write>(
    stats: &FrequencyStatistics,
    ranking: &[PrecisionEntry],
    top: usize,
    use_colors: bool,
    writer: &mut W,
) -> Result<()> {
    heading(writer, "Report history", use_colors)?;

    if stats.total_reports == 0 {
        writeln!(writer, "No reports have been stored yet.")?;
        return Ok(());
    }

    writeln!(writer, "  Reports      : {}", stats.total_reports)?;
    writeln!(writer, "  Days covered : {}", stats.total_days)?;
    writeln!(writer, "  Repositories : {}", stats.unique_projects)?;
    writeln!(writer, "  Technologies : {}", stats.unique_technologies)?;
    writeln!(writer, "  Languages    : {}", stats.unique_languages)?;
    writeln!(writer, "  Topics       : {}", stats.unique_topics)?;

    writeln!(writer)?;
    heading(writer, "Periods", use_colors)?;
    for period in &stats.periods {
        writeln!(writer, "  {:<10}  {:>4} repositories, {:>4} new", period.period.label(), period.total, period.new_projects)?;
    }

    writeln!(writer)?;
    heading(writer, "Most frequent repositories", use_colors)?;
    for project in stats.top_projects(top) {
        writeln!(
            writer,
            "  {:<NAME_WIDTH$}  {:>4}x  last seen {}",
            truncate(&project.full_name, NAME_WIDTH),
            project.count,
            project.last_seen
        )?;
    }

    tally_section(writer, "Technologies", &stats.technologies, top, use_colors)?;
    tally_section(writer, "Languages", &stats.languages, top, use_colors)?;
    tally_section(writer, "Topics", &stats.topics, top, use_colors)?;

    writeln!(writer)?;
    heading(writer, "Precision ranking", use_colors)?;
    for (index, entry) in ranking.iter().take(top).enumerate() {
        writeln!(
            writer,
            "{:>4}  {:<NAME_WIDTH$}  {:>8} stars  {:>7} forks  {:.3}",
            index + 1,
            truncate(&entry.full_name, NAME_WIDTH),
            entry.stars,
            entry.forks,
            entry.score
        )?;
    }

    Ok(())
}

fn tally_section<W: Write>(writer: &mut W, title: &str, entries: &[TallyEntry], top: usize, use_colors: bool) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    heading(writer, title, use_colors)?;
    let width = entries.iter().take(top).map(|e| e.name.chars().count()).max().unwrap_or(0);
    for entry in entries.iter().take(top) {
        writeln!(writer, "  {:<width$} : {}", entry.name, entry.count)?;
    }

    Ok(())
}

fn heading<W: Write>(writer: &mut W, title: &str, use_colors: bool) -> Result<()> {
    if use_colors {
        writeln!(writer, "{}", title.bold())?;
    } else {
        writeln!(writer, "{title}")?;
    }
    Ok(())
}

fn format_trend(trend: &Trend, use_colors: bool) -> String {
    let text = match trend.status {
        TrendStatus::New => "new".to_string(),
        TrendStatus::Rising => format!("▲ {} ({:+} stars)", trend.rank_change, trend.star_change),
        TrendStatus::Falling => format!("▼ {} ({:+} stars)", -trend.rank_change, trend.star_change),
        TrendStatus::Stable => format!("= ({:+} stars)", trend.star_change),
    };

    if !use_colors {
        return text;
    }

    match trend.status {
        TrendStatus::New => text.cyan().to_string(),
        TrendStatus::Rising => text.green().to_string(),
        TrendStatus::Falling => text.red().to_string(),
        TrendStatus::Stable => text,
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{EnrichedRepo, RawRepo, WindowKind};
    use crate::model::{Period, RepositorySnapshot};
    use crate::ranking::{compute_statistics, precision_ranking};
    use chrono::Utc;

    fn report(names: &[&str]) -> WeeklyReport {
        let repos = names
            .iter()
            .zip(1..)
            .map(|(name, rank)| {
                let repo = RawRepo {
                    full_name: (*name).into(),
                    language: Some("Rust".into()),
                    stargazers_count: 100,
                    ..RawRepo::default()
                };
                RepositorySnapshot::from_enriched(EnrichedRepo::minimal(repo), rank, Utc::now())
            })
            .collect();
        WeeklyReport::new(Period::Week { year: 2024, week: 7 }, WindowKind::Weekly, Utc::now(), repos)
    }

    #[test]
    fn test_generate_report_lists_repositories() {
        let mut output = String::new();
        generate_report(&report(&["a/one", "b/two"]), false, &mut output).unwrap();

        assert!(output.starts_with("Trending repositories 2024-W07\n"));
        assert!(output.contains("a/one*"));
        assert!(output.contains("b/two*"));
        assert!(output.contains("new"));
        assert!(output.contains("This report covers 2 trending repositories."));
    }

    #[test]
    fn test_generate_report_empty() {
        let mut output = String::new();
        generate_report(&report(&[]), false, &mut output).unwrap();
        assert!(output.contains("No repositories."));
    }

    #[test]
    fn test_generate_statistics() {
        let reports = vec![report(&["a/one", "b/two"])];
        let stats = compute_statistics(&reports);
        let ranking = precision_ranking(&reports);

        let mut output = String::new();
        generate_statistics(&stats, &ranking, 10, false, &mut output).unwrap();

        assert!(output.contains("Reports      : 1"));
        assert!(output.contains("2024-W07"));
        assert!(output.contains("Precision ranking"));
        assert!(output.contains("a/one"));
    }

    #[test]
    fn test_generate_statistics_without_history() {
        let mut output = String::new();
        generate_statistics(&FrequencyStatistics::default(), &[], 10, false, &mut output).unwrap();
        assert!(output.contains("No reports have been stored yet."));
    }

    #[test]
    fn test_format_trend() {
        let mut trend = Trend::new_entry();
        assert_eq!(format_trend(&trend, false), "new");

        trend.status = TrendStatus::Falling;
        trend.rank_change = -3;
        trend.star_change = 12;
        trend.is_new = false;
        assert_eq!(format_trend(&trend, false), "▼ 3 (+12 stars)");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
