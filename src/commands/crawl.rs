use super::common::{Common, CommonArgs, write_output};
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Parser;
use ohno::bail;
use repo_trending::Result;
use repo_trending::fetch::{Progress, WindowKind};
use repo_trending::pipeline::{CrawlOutcome, CrawlRequest, Crawler};
use repo_trending::reports::{console, json};
use std::sync::Arc;

#[derive(Parser, Debug)]
pub struct CrawlArgs {
    /// Maximum number of repositories in the report
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub limit: usize,

    /// Only consider repositories written in this language
    #[arg(long, default_value = "", value_name = "LANGUAGE", hide_default_value = true)]
    pub language: String,

    /// How far back a push counts as recent activity
    #[arg(long, value_name = "WINDOW", default_value = "weekly")]
    pub since: WindowKind,

    /// Skip downloading representative images
    #[arg(long)]
    pub no_images: bool,

    /// Exit with a failure status if the crawl does not produce a report
    #[arg(long)]
    pub strict: bool,

    /// Write the report as JSON to this file instead of printing it
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn crawl(args: &CrawlArgs) -> Result<()> {
    let mut common = Common::new(&args.common)?;
    if args.no_images {
        common.config.download_images = false;
    }

    let now = Utc::now();
    let crawler = Crawler::new(
        &common.config,
        args.common.github_token.as_deref(),
        Arc::new(common.store()),
        common.images_dir(),
        now,
    )?;

    let request = CrawlRequest {
        window: args.since,
        language: args.language.trim().to_string(),
        limit: args.limit,
    };

    let progress = common.progress_reporter();
    let outcome = crawler.run(&request, now, &progress).await;
    progress.done();

    match &outcome {
        CrawlOutcome::Success { report, location, stats } => {
            if !stats.issues.is_empty() {
                eprintln!("\n⚠️  {} repositories had problems:", stats.issues.len());
                for issue in &stats.issues {
                    eprintln!("  - {} ({}): {}", issue.full_name, issue.kind, issue.message);
                }
                eprintln!();
            }

            if let Some(path) = &args.json {
                let mut text = String::new();
                json::generate_report(report, Some(stats), &mut text)?;
                write_output(path, &text)?;
                println!("Wrote report for {} to {path}", report.period);
            } else {
                let mut text = String::new();
                console::generate_report(report, common.stdout_colors(), &mut text)?;
                print!("{text}");
            }

            eprintln!("Stored {location}");
        }

        CrawlOutcome::Skipped { .. } => eprintln!("{outcome}"),

        CrawlOutcome::Failure { .. } => {
            eprintln!("❌ Crawl failed: {outcome}");
            if args.strict {
                bail!("crawl did not produce a report");
            }
        }
    }

    Ok(())
}
