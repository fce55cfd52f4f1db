use super::common::{Common, CommonArgs, write_output};
use camino::Utf8PathBuf;
use clap::Parser;
use repo_trending::Result;
use repo_trending::ranking::{compute_statistics, precision_ranking};
use repo_trending::reports::{console, json};
use repo_trending::store::ReportStore;

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Number of entries shown in each listing
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub top: usize,

    /// Write the statistics as JSON to this file instead of printing them
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn stats(args: &StatsArgs) -> Result<()> {
    let common = Common::new(&args.common)?;
    let reports = common.store().load_all()?;
    log::info!("Computing statistics over {} report(s)", reports.len());

    let statistics = compute_statistics(&reports);
    let ranking = precision_ranking(&reports);

    let mut text = String::new();
    if let Some(path) = &args.json {
        json::generate_statistics(&statistics, &ranking, &mut text)?;
        write_output(path, &text)?;
        println!("Wrote statistics for {} report(s) to {path}", statistics.total_reports);
    } else {
        console::generate_statistics(&statistics, &ranking, args.top, common.stdout_colors(), &mut text)?;
        print!("{text}");
    }

    Ok(())
}
