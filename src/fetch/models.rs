//! Wire types for the repository search API.

use crate::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use ohno::IntoAppError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Bytes of source per language, as reported by the languages endpoint.
pub type LanguageHistogram = BTreeMap<String, u64>;

/// Sentinel used when no language can be determined.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Repository owner, as embedded in search and detail records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,

    #[serde(default)]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,
}

/// A repository record as returned by the search and detail endpoints.
///
/// Both endpoints share this shape; the detail endpoint fills in a few extra fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRepo {
    pub full_name: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub owner: Option<Owner>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub homepage: Option<String>,

    #[serde(default)]
    pub html_url: Option<String>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default, deserialize_with = "deserialize_topics")]
    pub topics: Vec<String>,

    #[serde(default)]
    pub stargazers_count: u64,

    #[serde(default)]
    pub forks_count: u64,

    #[serde(default)]
    pub open_issues_count: u64,

    #[serde(default)]
    pub watchers_count: u64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub default_branch: Option<String>,
}

impl RawRepo {
    /// The owner and repository name, if `full_name` has the `owner/repo` shape.
    #[must_use]
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        let (owner, name) = self.full_name.split_once('/')?;
        (!owner.is_empty() && !name.is_empty() && !name.contains('/')).then_some((owner, name))
    }

    /// The declared language, or [`UNKNOWN_LANGUAGE`].
    #[must_use]
    pub fn language_or_unknown(&self) -> &str {
        match self.language.as_deref() {
            Some(lang) if !lang.is_empty() && lang != "None" => lang,
            _ => UNKNOWN_LANGUAGE,
        }
    }
}

/// Response body of the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub incomplete_results: bool,

    #[serde(default)]
    pub items: Vec<RawRepo>,
}

/// Response body of the readme endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadmeContent {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub encoding: Option<String>,
}

impl ReadmeContent {
    /// Decode the base64 payload into text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn decode(&self) -> Result<String> {
        match self.encoding.as_deref() {
            None | Some("base64") => {
                let compact: String = self.content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                let bytes = STANDARD.decode(compact).into_app_err("decoding base64 readme content")?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some(other) => ohno::bail!("unsupported readme encoding '{other}'"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicsRepr {
    List(Vec<String>),
    Encoded(String),
}

/// Topics arrive as a list, as a JSON-encoded list inside a string, or not at all.
fn deserialize_topics<'de, D>(deserializer: D) -> core::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let topics = match Option::<TopicsRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(TopicsRepr::List(list)) => list,
        Some(TopicsRepr::Encoded(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<Vec<String>>(text)
                    .unwrap_or_else(|_| text.split(',').map(|t| t.trim().to_string()).collect())
            }
        }
    };

    Ok(topics.into_iter().filter(|t| !t.is_empty()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_repo_minimal_record() {
        let repo: RawRepo = serde_json::from_str(r#"{"full_name": "octo/cat"}"#).unwrap();
        assert_eq!(repo.full_name, "octo/cat");
        assert_eq!(repo.stargazers_count, 0);
        assert!(repo.topics.is_empty());
        assert!(repo.pushed_at.is_none());
    }

    #[test]
    fn test_raw_repo_full_record() {
        let json = r#"{
            "full_name": "octo/cat",
            "name": "cat",
            "owner": {"login": "octo", "avatar_url": "https://avatars/octo.png"},
            "language": "Rust",
            "topics": ["cli", "async"],
            "stargazers_count": 1200,
            "forks_count": 80,
            "open_issues_count": 7,
            "watchers_count": 1200,
            "created_at": "2024-01-01T00:00:00Z",
            "pushed_at": "2024-02-10T08:30:00Z",
            "default_branch": "trunk"
        }"#;

        let repo: RawRepo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.owner.unwrap().login, "octo");
        assert_eq!(repo.topics, vec!["cli", "async"]);
        assert_eq!(repo.stargazers_count, 1200);
        assert_eq!(repo.default_branch.as_deref(), Some("trunk"));
    }

    #[test]
    fn test_topics_as_encoded_string() {
        let repo: RawRepo = serde_json::from_str(r#"{"full_name": "a/b", "topics": "[\"web\", \"api\"]"}"#).unwrap();
        assert_eq!(repo.topics, vec!["web", "api"]);
    }

    #[test]
    fn test_topics_as_comma_separated_string() {
        let repo: RawRepo = serde_json::from_str(r#"{"full_name": "a/b", "topics": "web, api"}"#).unwrap();
        assert_eq!(repo.topics, vec!["web", "api"]);
    }

    #[test]
    fn test_topics_null() {
        let repo: RawRepo = serde_json::from_str(r#"{"full_name": "a/b", "topics": null}"#).unwrap();
        assert!(repo.topics.is_empty());
    }

    #[test]
    fn test_owner_and_name() {
        let repo = RawRepo {
            full_name: "octo/cat".into(),
            ..RawRepo::default()
        };
        assert_eq!(repo.owner_and_name(), Some(("octo", "cat")));

        let bad = RawRepo {
            full_name: "nocat".into(),
            ..RawRepo::default()
        };
        assert_eq!(bad.owner_and_name(), None);
    }

    #[test]
    fn test_language_or_unknown() {
        let mut repo = RawRepo::default();
        assert_eq!(repo.language_or_unknown(), UNKNOWN_LANGUAGE);
        repo.language = Some("Go".into());
        assert_eq!(repo.language_or_unknown(), "Go");
    }

    #[test]
    fn test_readme_decode_with_line_breaks() {
        // "# Hello\n" split over two lines the way the API wraps it
        let readme = ReadmeContent {
            content: "IyBIZWxs\nbwo=\n".into(),
            encoding: Some("base64".into()),
        };
        assert_eq!(readme.decode().unwrap(), "# Hello\n");
    }

    #[test]
    fn test_readme_decode_invalid_base64() {
        let readme = ReadmeContent {
            content: "!!!not base64!!!".into(),
            encoding: Some("base64".into()),
        };
        let _ = readme.decode().unwrap_err();
    }

    #[test]
    fn test_search_response_defaults() {
        let resp: SearchResponse = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(resp.items.is_empty());
        assert!(!resp.incomplete_results);
    }
}
