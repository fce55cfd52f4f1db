use camino::Utf8PathBuf;
use clap::Parser;
use ohno::{IntoAppError, bail};
use repo_trending::Result;
use repo_trending::config::{Config, DEFAULT_CONFIG_TOML};
use std::fs;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path
    #[arg(value_name = "PATH", default_value = "trending.toml")]
    pub output: Utf8PathBuf,

    /// Overwrite the file if it already exists
    #[arg(long)]
    pub force: bool,
}

pub fn init_config(args: &InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!("{} already exists; use --force to overwrite it", args.output);
    }

    if args.output.extension() == Some("toml") {
        fs::write(&args.output, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing configuration to {}", args.output))?;
    } else {
        Config::default().save(&args.output)?;
    }

    println!("Generated default configuration file: {}", args.output);
    Ok(())
}
