//! Minimal client for the repository search API.

use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::app_err;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("repo-trending/", env!("CARGO_PKG_VERSION"));

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of an API call
#[derive(Debug)]
pub enum ApiResult<T> {
    /// Request succeeded - contains data and optional rate limit info
    Success(T, Option<RateLimitInfo>),

    /// Rate limited - no more requests until the reset time
    RateLimited(RateLimitInfo),

    /// The requested resource was not found (404)
    NotFound(Option<RateLimitInfo>),

    /// Request failed - never retried
    Failed(ohno::AppError, Option<RateLimitInfo>),
}

/// Unwrap an `ApiResult::Success` or return the other variants unchanged.
macro_rules! unwrap_or_return {
    ($expr:expr) => {
        match $expr {
            ApiResult::Success(data, rate_limit) => (data, rate_limit),
            ApiResult::RateLimited(rate_limit) => return ApiResult::RateLimited(rate_limit),
            ApiResult::NotFound(rate_limit) => return ApiResult::NotFound(rate_limit),
            ApiResult::Failed(e, rate_limit) => return ApiResult::Failed(e, rate_limit),
        }
    };
}

/// Search API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
    now: DateTime<Utc>,
}

impl Client {
    /// Create a new API client with an optional bearer token.
    ///
    /// Every request made through the client gives up after `timeout`.
    pub fn new(token: Option<&str>, base_url: impl Into<String>, timeout: Duration, now: DateTime<Utc>) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(t) = token.filter(|t| !t.is_empty()) {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            now,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an API path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make an API call and classify the result
    pub async fn api_call(&self, url: &str) -> ApiResult<reqwest::Response> {
        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return ApiResult::Failed(e.into(), None),
        };

        // Extract rate limit info from response headers before checking status
        let rate_limit = extract_rate_limit_from_headers(resp.headers());

        let status = resp.status();
        if status.is_success() {
            return ApiResult::Success(resp, rate_limit);
        }

        let status_code = status.as_u16();
        if matches!(status_code, 403 | 429) {
            // Without headers, assume the limit resets within the hour
            let rate_limit = rate_limit.unwrap_or_else(|| RateLimitInfo {
                remaining: 0,
                reset_at: self.now + chrono::Duration::hours(1),
            });
            return ApiResult::RateLimited(rate_limit);
        }

        if status_code == 404 {
            return ApiResult::NotFound(rate_limit);
        }

        ApiResult::Failed(app_err!("HTTP {status} from {url}"), rate_limit)
    }

    /// Make an API call and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let (resp, rate_limit) = unwrap_or_return!(self.api_call(url).await);

        match resp.json::<T>().await {
            Ok(data) => ApiResult::Success(data, rate_limit),
            Err(e) => ApiResult::Failed(e.into(), rate_limit),
        }
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;
    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
