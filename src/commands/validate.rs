use super::common::print_warnings;
use camino::Utf8PathBuf;
use clap::Parser;
use repo_trending::Result;
use repo_trending::config::Config;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file [default: one of trending.[toml|yml|yaml|json] ]
    #[arg(value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

#[expect(clippy::unnecessary_wraps, reason = "Consistent interface with other subcommands")]
pub fn validate_config(args: &ValidateArgs) -> Result<()> {
    let config_path = args.config.as_ref();

    match Config::load(&Utf8PathBuf::from("."), config_path) {
        Ok((_, warnings)) => {
            println!("Configuration validation successful");
            if let Some(path) = config_path {
                println!("Config file: {path}");
            }

            print_warnings(&warnings);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {e}");
            std::process::exit(1);
        }
    }
}
