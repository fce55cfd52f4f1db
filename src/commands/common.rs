//! Setup shared by the `crawl` and `stats` commands.

use super::ProgressReporter;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use core::time::Duration;
use directories::BaseDirs;
use ohno::{IntoAppError, app_err};
use repo_trending::Result;
use repo_trending::config::Config;
use repo_trending::store::JsonReportStore;
use std::fs;
use std::io::IsTerminal;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    /// Whether to emit colors on a stream that may or may not be a terminal.
    pub fn enabled_for(self, stream: &impl IsTerminal) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stream.is_terminal(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by the commands that touch the report history
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Path to configuration file [default: one of trending.[toml|yml|yaml|json] ]
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory holding stored reports and images [default: the platform data directory]
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

/// Everything a command needs after the shared arguments have been processed
#[derive(Debug)]
pub struct Common {
    pub config: Config,
    pub data_dir: Utf8PathBuf,
    pub color: ColorMode,
    pub log_level: LogLevel,
}

impl Common {
    /// Initialize logging, load the configuration and resolve the data directory
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or no data directory can be found
    pub fn new(args: &CommonArgs) -> Result<Self> {
        init_logging(args.log_level);

        let (config, warnings) = Config::load(Utf8Path::new("."), args.config.as_ref())?;
        print_warnings(&warnings);

        let data_dir = if let Some(dir) = &args.data_dir {
            dir.clone()
        } else {
            default_data_dir()?
        };
        log::debug!("Using data directory '{data_dir}'");

        Ok(Self {
            config,
            data_dir,
            color: args.color,
            log_level: args.log_level,
        })
    }

    #[must_use]
    pub fn reports_dir(&self) -> Utf8PathBuf {
        self.data_dir.join("reports")
    }

    #[must_use]
    pub fn images_dir(&self) -> Utf8PathBuf {
        self.data_dir.join("images")
    }

    #[must_use]
    pub fn store(&self) -> JsonReportStore {
        JsonReportStore::new(self.reports_dir(), self.config.history_policy)
    }

    /// A progress bar that stays hidden while log output is enabled.
    #[must_use]
    pub fn progress_reporter(&self) -> ProgressReporter {
        let delay = if self.log_level == LogLevel::None {
            Duration::from_millis(300)
        } else {
            Duration::from_hours(365 * 24)
        };

        ProgressReporter::new(delay, self.color.enabled_for(&std::io::stderr()))
    }

    #[must_use]
    pub fn stdout_colors(&self) -> bool {
        self.color.enabled_for(&std::io::stdout())
    }
}

fn default_data_dir() -> Result<Utf8PathBuf> {
    let base = BaseDirs::new().into_app_err("could not determine the data directory")?;
    let dir = base.data_dir().join("repo-trending");
    Utf8PathBuf::from_path_buf(dir).map_err(|p| app_err!("data directory '{}' is not valid UTF-8", p.display()))
}

/// Write a rendered document to a file.
pub fn write_output(path: &Utf8Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory {parent}"))?;
    }
    fs::write(path, text).into_app_err_with(|| format!("writing {path}"))
}

pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }

    eprintln!("\n⚠️  Configuration validation warnings:");
    for warning in warnings {
        eprintln!("   {warning}");
    }
    eprintln!();
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .init();
}
