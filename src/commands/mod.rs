mod common;
mod crawl;
mod init;
mod progress_reporter;
mod stats;
mod validate;

pub use crawl::{CrawlArgs, crawl};
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use stats::{StatsArgs, stats};
pub use validate::{ValidateArgs, validate_config};
