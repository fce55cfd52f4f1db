use super::images::{ImageCandidate, select_representative_image};
use crate::Result;
use crate::fetch::ProviderResult;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{EnrichableExt, IntoAppError, app_err};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::fs;

const LOG_TARGET: &str = "    images";

/// Default upper bound on the size of a downloaded image.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// A downloaded representative image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub filename: String,
    pub path: Utf8PathBuf,
    pub size: u64,
    pub content_type: String,
    pub original_url: String,
    pub absolute_url: String,
}

/// Downloads README images under a size cap and a content-type check.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: reqwest::Client,
    max_bytes: u64,
    raw_content_base: String,
}

impl ImageDownloader {
    pub fn new(max_bytes: u64, timeout: Duration, raw_content_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("repo-trending/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            max_bytes,
            raw_content_base: raw_content_base.into(),
        })
    }

    /// Find the first usable image in `doc_text`, download it and store it in `dest_dir`.
    ///
    /// Every failure is confined to this repository and reported through the result.
    pub async fn extract_representative_image(
        &self,
        doc_text: &str,
        full_name: &str,
        default_branch: Option<&str>,
        dest_dir: &Utf8Path,
    ) -> ProviderResult<ImageRef> {
        let Some(candidate) = select_representative_image(doc_text, full_name, default_branch, &self.raw_content_base) else {
            return ProviderResult::unavailable("README has no usable image reference");
        };

        let result = self.download(&candidate, dest_dir).await;
        match &result {
            ProviderResult::Found(image) => {
                log::debug!(target: LOG_TARGET, "Stored image for '{full_name}' at {}", image.path);
            }
            other => {
                log::info!(target: LOG_TARGET, "No image for '{full_name}' from {}: {other}", candidate.absolute_url);
            }
        }

        result
    }

    /// Download one image and write it into `dest_dir`.
    pub async fn download(&self, candidate: &ImageCandidate, dest_dir: &Utf8Path) -> ProviderResult<ImageRef> {
        let mut resp = match self.client.get(&candidate.absolute_url).send().await {
            Ok(resp) => resp,
            Err(e) => return ProviderResult::error(ohno::AppError::from(e).enrich_with(|| format!("requesting {}", candidate.absolute_url))),
        };

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return ProviderResult::unavailable(format!("image not found at {}", candidate.absolute_url));
        }
        if !status.is_success() {
            return ProviderResult::error(app_err!("HTTP {status} from {}", candidate.absolute_url));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .unwrap_or_default();

        if !content_type.starts_with("image/") {
            return ProviderResult::rejected(format!("content type '{content_type}' is not an image"));
        }

        if let Some(declared) = resp.content_length()
            && declared > self.max_bytes
        {
            return ProviderResult::rejected(format!("image is {declared} bytes, limit is {}", self.max_bytes));
        }

        let mut body = Vec::new();
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    if (body.len() + chunk.len()) as u64 > self.max_bytes {
                        return ProviderResult::rejected(format!("image exceeds the {} byte limit", self.max_bytes));
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    return ProviderResult::error(
                        ohno::AppError::from(e).enrich_with(|| format!("reading image body from {}", candidate.absolute_url)),
                    );
                }
            }
        }

        let filename = image_file_name(&candidate.absolute_url, &content_type, 0);
        match write_image(dest_dir, &filename, &body) {
            Ok(path) => ProviderResult::Found(ImageRef {
                filename,
                path,
                size: body.len() as u64,
                content_type,
                original_url: candidate.original_url.clone(),
                absolute_url: candidate.absolute_url.clone(),
            }),
            Err(e) => ProviderResult::error(e),
        }
    }
}

fn write_image(dest_dir: &Utf8Path, filename: &str, body: &[u8]) -> Result<Utf8PathBuf> {
    fs::create_dir_all(dest_dir).into_app_err_with(|| format!("creating image directory {dest_dir}"))?;
    let path = dest_dir.join(filename);
    fs::write(&path, body).into_app_err_with(|| format!("writing image {path}"))?;
    Ok(path)
}

/// Name a stored image after its URL, or after its content type if the URL has no file name.
#[must_use]
pub fn image_file_name(url: &str, content_type: &str, index: usize) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let original = path.rsplit('/').next().unwrap_or_default();

    if original.rsplit_once('.').is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty()) {
        return format!("{}_{}", index + 1, sanitize_file_name(original));
    }

    let ext = match content_type {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "image/webp" => "webp",
        _ => "png",
    };
    format!("image_{}.{ext}", index + 1)
}

/// Make a string safe to use as a single path component.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if matches!(c, '<' | '>' | ':' | '/' | '\\' | '|' | '?' | '*' | ' ') { '_' } else { c })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.to_lowercase()
}
