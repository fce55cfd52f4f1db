//! Configuration loading, saving and validation.

#[expect(clippy::module_inception, reason = "the module holds the Config type and its helpers")]
mod config;

pub use config::{Config, DEFAULT_API_BASE_URL, DEFAULT_CONFIG_TOML};
