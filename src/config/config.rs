use crate::Result;
use crate::enrich::{DEFAULT_MAX_IMAGE_BYTES, DEFAULT_RAW_CONTENT_BASE};
use crate::fetch::FetchOptions;
use crate::pipeline::ExhaustionPolicy;
use crate::store::HistoryPolicy;
use crate::trends::TrendPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// The API used when no other base URL is configured
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// File names probed, in order, when no configuration path is given
const CANDIDATE_FILES: [&str; 4] = ["trending.toml", "trending.yml", "trending.yaml", "trending.json"];

/// Settings for a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the repository hosting API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL that relative README image references are resolved against
    #[serde(default = "default_raw_content_base_url")]
    pub raw_content_base_url: String,

    /// Only repositories with at least this many stars are considered
    #[serde(default = "default_min_stars")]
    pub min_stars: u64,

    /// Number of repositories enriched concurrently
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Timeout in seconds for a single request and for a whole enrichment task
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Longest pause in seconds after the rate limit is exhausted
    #[serde(default = "default_max_rate_limit_wait_secs")]
    pub max_rate_limit_wait_secs: u64,

    /// Largest representative image that will be downloaded, in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,

    /// Whether to download a representative image for each repository
    #[serde(default = "default_download_images")]
    pub download_images: bool,

    #[serde(default)]
    pub history_policy: HistoryPolicy,

    #[serde(default)]
    pub trend_policy: TrendPolicy,

    #[serde(default)]
    pub exhaustion_policy: ExhaustionPolicy,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_raw_content_base_url() -> String {
    DEFAULT_RAW_CONTENT_BASE.to_string()
}

const fn default_min_stars() -> u64 {
    50
}

const fn default_max_concurrent_requests() -> usize {
    5
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_rate_limit_wait_secs() -> u64 {
    60
}

const fn default_max_image_bytes() -> u64 {
    DEFAULT_MAX_IMAGE_BYTES
}

const fn default_download_images() -> bool {
    true
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// When `config_path` is `None`, the candidate files are probed in `dir`. If none exists,
    /// the defaults are returned. Validation warnings are returned alongside the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<(Self, Vec<String>)> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration from {path}"))?;
            (path.clone(), text)
        } else {
            let mut found = None;
            for path in CANDIDATE_FILES.iter().map(|name| dir.join(name)) {
                match fs::read_to_string(&path) {
                    Ok(text) => {
                        found = Some((path, text));
                        break;
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration from {path}")),
                }
            }

            let Some(result) = found else {
                return Ok((Self::default(), Vec::new()));
            };
            result
        };

        let config = Self::parse(&final_path, &text)?;
        let warnings = config.validate();
        Ok((config, warnings))
    }

    fn parse(path: &Utf8Path, text: &str) -> Result<Self> {
        let extension = path.extension().unwrap_or_default();
        match extension {
            "toml" => toml::from_str(text).into_app_err_with(|| format!("parsing TOML configuration from {path}")),
            "yml" | "yaml" => serde_yaml::from_str(text).into_app_err_with(|| format!("parsing YAML configuration from {path}")),
            "json" => serde_json::from_str(text).into_app_err_with(|| format!("parsing JSON configuration from {path}")),
            _ => Err(app_err!("unsupported configuration file extension: {extension}")),
        }
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save(&self, output_path: &Utf8Path) -> Result<()> {
        let extension = output_path.extension().unwrap_or_default();
        let text = match extension {
            "toml" => toml::to_string_pretty(self)
                .into_app_err_with(|| format!("serializing configuration to TOML for saving to {output_path}"))?,
            "yml" | "yaml" => serde_yaml::to_string(self)
                .into_app_err_with(|| format!("serializing configuration to YAML for saving to {output_path}"))?,
            "json" => serde_json::to_string_pretty(self)
                .into_app_err_with(|| format!("serializing configuration to JSON for saving to {output_path}"))?,
            _ => return Err(app_err!("unsupported configuration file extension: {extension}")),
        };

        fs::write(output_path, text).into_app_err_with(|| format!("writing configuration to {output_path}"))?;
        Ok(())
    }

    /// Detect settings that would make a crawl useless or stall it.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.api_base_url.trim().is_empty() {
            warnings.push("api_base_url is empty; no repositories can be fetched".to_string());
        }

        if self.raw_content_base_url.trim().is_empty() {
            warnings.push("raw_content_base_url is empty; relative image references cannot be resolved".to_string());
        }

        if self.max_concurrent_requests == 0 {
            warnings.push("max_concurrent_requests is 0; it will be treated as 1".to_string());
        }

        if self.request_timeout_secs == 0 {
            warnings.push("request_timeout_secs is 0; every request will time out".to_string());
        }

        if self.download_images && self.max_image_bytes == 0 {
            warnings.push("max_image_bytes is 0 while download_images is enabled; every image will be rejected".to_string());
        }

        warnings
    }

    /// The fetcher settings derived from this configuration.
    #[must_use]
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            min_stars: self.min_stars,
            max_concurrent_requests: self.max_concurrent_requests.max(1),
            request_timeout: self.request_timeout(),
            max_rate_limit_wait: Duration::from_secs(self.max_rate_limit_wait_secs),
        }
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            raw_content_base_url: default_raw_content_base_url(),
            min_stars: default_min_stars(),
            max_concurrent_requests: default_max_concurrent_requests(),
            request_timeout_secs: default_request_timeout_secs(),
            max_rate_limit_wait_secs: default_max_rate_limit_wait_secs(),
            max_image_bytes: default_max_image_bytes(),
            download_images: default_download_images(),
            history_policy: HistoryPolicy::default(),
            trend_policy: TrendPolicy::default(),
            exhaustion_policy: ExhaustionPolicy::default(),
        }
    }
}
