//! Command-line front end for `repo-trending`.
//!
//! ```bash
//! repo-trending crawl --since daily --limit 25
//! repo-trending crawl --language rust --json week.json --strict
//! repo-trending stats --top 20
//! repo-trending init
//! repo-trending validate trending.toml
//! ```

use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};
use repo_trending::Result;

mod commands;

use crate::commands::{CrawlArgs, InitArgs, StatsArgs, ValidateArgs, crawl, init_config, stats, validate_config};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "repo-trending", version, about)]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl trending repositories and store a new report
    Crawl(Box<CrawlArgs>),
    /// Show frequency statistics and the precision ranking over stored reports
    Stats(Box<StatsArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    match &Cli::parse().command {
        Command::Crawl(args) => crawl(args).await,
        Command::Stats(args) => stats(args),
        Command::Init(args) => init_config(args),
        Command::Validate(args) => validate_config(args),
    }
}
