use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Where relative README references are resolved when no other base is configured.
pub const DEFAULT_RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// File extensions accepted as images.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

const RAW_CONTENT_DOMAIN: &str = "githubusercontent.com";
const DEFAULT_BRANCH: &str = "main";

static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"!\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+["'][^)]*)?\)"#).expect("invalid regex"));

static HTML_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']?([^"'\s>]+)"#).expect("invalid regex"));

/// An image reference picked from a README, before download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// The reference exactly as written in the README.
    pub original_url: String,

    /// The reference resolved to an absolute URL.
    pub absolute_url: String,
}

/// Collect image references from markdown image links and HTML `img` tags.
///
/// Markdown references come first; each reference appears once, in first-seen order.
#[must_use]
pub fn find_image_references(doc_text: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    MARKDOWN_IMAGE
        .captures_iter(doc_text)
        .chain(HTML_IMAGE.captures_iter(doc_text))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|reference| !reference.is_empty() && seen.insert(reference.clone()))
        .collect()
}

/// Whether a reference is worth downloading.
///
/// Data URIs are never accepted. Anything else qualifies if its path ends in a supported
/// extension or if it is served from the raw-content host.
#[must_use]
pub fn is_supported_reference(reference: &str, raw_content_base: &str) -> bool {
    if reference.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:")) {
        return false;
    }

    let path = reference.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();
    let has_image_extension = path
        .rsplit_once('.')
        .is_some_and(|(_, ext)| SUPPORTED_EXTENSIONS.contains(&ext));

    has_image_extension || is_raw_content_url(reference, raw_content_base)
}

fn is_raw_content_url(reference: &str, raw_content_base: &str) -> bool {
    let Ok(url) = url::Url::parse(reference) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };

    let configured_host = url::Url::parse(raw_content_base).ok().and_then(|base| base.host_str().map(str::to_string));
    configured_host.as_deref() == Some(host) || host == RAW_CONTENT_DOMAIN || host.ends_with(".githubusercontent.com")
}

/// Resolve a README image reference to an absolute URL.
///
/// Relative references (`./x`, `/x` and bare `x`) are resolved against
/// `{raw_content_base}/{full_name}/{branch}`.
#[must_use]
pub fn resolve_image_url(reference: &str, raw_content_base: &str, full_name: &str, branch: Option<&str>) -> String {
    let lowered = reference.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return reference.to_string();
    }

    if let Some(rest) = reference.strip_prefix("//") {
        return format!("https://{rest}");
    }

    let branch = branch.filter(|b| !b.is_empty()).unwrap_or(DEFAULT_BRANCH);
    let base = format!("{}/{full_name}/{branch}", raw_content_base.trim_end_matches('/'));

    let relative = reference
        .strip_prefix("./")
        .or_else(|| reference.strip_prefix('/'))
        .unwrap_or(reference);

    format!("{base}/{relative}")
}

/// Pick the README image that represents a repository: the first supported reference.
#[must_use]
pub fn select_representative_image(
    doc_text: &str,
    full_name: &str,
    default_branch: Option<&str>,
    raw_content_base: &str,
) -> Option<ImageCandidate> {
    find_image_references(doc_text)
        .into_iter()
        .find(|reference| is_supported_reference(reference, raw_content_base))
        .map(|reference| ImageCandidate {
            absolute_url: resolve_image_url(&reference, raw_content_base, full_name, default_branch),
            original_url: reference,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_dot_reference_resolves_against_raw_base() {
        let candidate = select_representative_image("![x](./img/logo.png)", "o/r", Some("main"), DEFAULT_RAW_CONTENT_BASE).unwrap();
        assert_eq!(candidate.absolute_url, "https://raw.githubusercontent.com/o/r/main/img/logo.png");
        assert_eq!(candidate.original_url, "./img/logo.png");
    }

    #[test]
    fn test_resolution_conventions() {
        let base = DEFAULT_RAW_CONTENT_BASE;
        assert_eq!(resolve_image_url("/docs/a.png", base, "o/r", Some("dev")), "https://raw.githubusercontent.com/o/r/dev/docs/a.png");
        assert_eq!(resolve_image_url("a.png", base, "o/r", None), "https://raw.githubusercontent.com/o/r/main/a.png");
        assert_eq!(resolve_image_url("https://x.io/a.png", base, "o/r", None), "https://x.io/a.png");
        assert_eq!(resolve_image_url("//cdn.io/a.png", base, "o/r", None), "https://cdn.io/a.png");
    }

    #[test]
    fn test_markdown_and_html_references_are_merged() {
        let readme = r#"
![logo](logo.svg)
<p align="center"><img src="https://example.com/banner.png" width="300"></p>
![again](logo.svg "Logo")
<IMG SRC='shot.webp'>
"#;
        assert_eq!(find_image_references(readme), vec!["logo.svg", "https://example.com/banner.png", "shot.webp"]);
    }

    #[test]
    fn test_data_uris_are_rejected() {
        assert!(!is_supported_reference("data:image/png;base64,iVBORw0KGgo=", DEFAULT_RAW_CONTENT_BASE));
        assert!(!is_supported_reference("DATA:image/gif;base64,R0lGOD", DEFAULT_RAW_CONTENT_BASE));
    }

    #[test]
    fn test_extension_filter_ignores_query_string() {
        assert!(is_supported_reference("https://example.com/chart.PNG?raw=true", DEFAULT_RAW_CONTENT_BASE));
        assert!(!is_supported_reference("https://img.shields.io/badge/build-passing-green", DEFAULT_RAW_CONTENT_BASE));
        assert!(!is_supported_reference("docs/guide.md", DEFAULT_RAW_CONTENT_BASE));
    }

    #[test]
    fn test_raw_host_accepted_without_extension() {
        assert!(is_supported_reference("https://raw.githubusercontent.com/o/r/main/assets/demo", DEFAULT_RAW_CONTENT_BASE));
        assert!(is_supported_reference("https://user-images.githubusercontent.com/1/abc", DEFAULT_RAW_CONTENT_BASE));
        assert!(is_supported_reference("http://127.0.0.1:4000/o/r/main/demo", "http://127.0.0.1:4000"));
    }

    #[test]
    fn test_first_supported_reference_wins() {
        let readme = "![badge](https://img.shields.io/badge/x) ![a](first.gif) ![b](second.png)";
        let candidate = select_representative_image(readme, "o/r", Some("main"), DEFAULT_RAW_CONTENT_BASE).unwrap();
        assert_eq!(candidate.original_url, "first.gif");
    }

    #[test]
    fn test_no_images() {
        assert!(select_representative_image("# Title\n\nJust text.", "o/r", None, DEFAULT_RAW_CONTENT_BASE).is_none());
        assert!(select_representative_image("", "o/r", None, DEFAULT_RAW_CONTENT_BASE).is_none());
    }
}
