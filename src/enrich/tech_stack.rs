use crate::fetch::{LanguageHistogram, RawRepo, UNKNOWN_LANGUAGE};
use std::collections::HashSet;

/// Maximum number of entries in a repository's technology stack.
pub const MAX_TECH_STACK: usize = 8;

/// Technologies recognized in README text, in match priority order.
pub const KNOWN_TECHNOLOGIES: &[&str] = &[
    "React",
    "Vue",
    "Angular",
    "Node.js",
    "Express",
    "Django",
    "Flask",
    "Spring",
    "Docker",
    "Kubernetes",
    "Redis",
    "MongoDB",
    "PostgreSQL",
    "MySQL",
    "TypeScript",
    "GraphQL",
    "REST API",
    "Microservices",
    "AWS",
    "Azure",
    "GCP",
    "Terraform",
    "Ansible",
];

/// Ordered, case-insensitively deduplicated list with a fixed capacity.
struct StackBuilder {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl StackBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_TECH_STACK),
            seen: HashSet::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.entries.len() >= MAX_TECH_STACK
    }

    fn push(&mut self, entry: &str) {
        let entry = entry.trim();
        if entry.is_empty() || self.is_full() {
            return;
        }

        if self.seen.insert(entry.to_lowercase()) {
            self.entries.push(entry.to_string());
        }
    }

    fn finish(self) -> Vec<String> {
        self.entries
    }
}

/// Derive the technology stack of a repository.
///
/// Entries come from the language histogram (largest first), then the topics in API order,
/// then every known technology mentioned in `doc_text`. The result holds at most
/// [`MAX_TECH_STACK`] entries and is identical across runs for identical input.
#[must_use]
pub fn extract_tech_stack(detail: &RawRepo, histogram: &LanguageHistogram, doc_text: &str) -> Vec<String> {
    let mut stack = StackBuilder::new();

    let mut languages: Vec<(&String, &u64)> = histogram.iter().collect();
    languages.sort_by(|(a_name, a_bytes), (b_name, b_bytes)| b_bytes.cmp(a_bytes).then_with(|| a_name.cmp(b_name)));
    for (language, _) in languages {
        stack.push(language);
    }

    for topic in &detail.topics {
        stack.push(topic);
    }

    if !stack.is_full() && !doc_text.is_empty() {
        let lowered = doc_text.to_lowercase();
        for tech in KNOWN_TECHNOLOGIES {
            if lowered.contains(&tech.to_lowercase()) {
                stack.push(tech);
            }
        }
    }

    stack.finish()
}

/// The stack used when a repository could not be enriched: its declared language and topics.
#[must_use]
pub fn minimal_tech_stack(primary_language: &str, topics: &[String]) -> Vec<String> {
    let mut stack = StackBuilder::new();

    if primary_language != UNKNOWN_LANGUAGE && primary_language != "None" {
        stack.push(primary_language);
    }

    for topic in topics {
        stack.push(topic);
    }

    stack.finish()
}
