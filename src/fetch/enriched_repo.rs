use super::models::{LanguageHistogram, RawRepo, UNKNOWN_LANGUAGE};
use crate::enrich::{extract_tech_stack, minimal_tech_stack};

/// A search candidate together with the data gathered for it during enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRepo {
    /// The detail record, or the search record when enrichment failed.
    pub repo: RawRepo,

    /// Decoded README text; empty when the repository has none.
    pub readme: String,

    pub languages: LanguageHistogram,
    pub primary_language: String,
    pub tech_stack: Vec<String>,

    /// Set when enrichment failed and the record was built from the search result alone.
    pub degraded: bool,
}

impl EnrichedRepo {
    /// Build a fully enriched record.
    #[must_use]
    pub fn from_parts(detail: RawRepo, readme: String, languages: LanguageHistogram) -> Self {
        let primary_language = primary_language(&languages);
        let tech_stack = extract_tech_stack(&detail, &languages, &readme);

        Self {
            repo: detail,
            readme,
            languages,
            primary_language,
            tech_stack,
            degraded: false,
        }
    }

    /// Build the fallback record for a candidate whose enrichment failed.
    #[must_use]
    pub fn minimal(repo: RawRepo) -> Self {
        let primary_language = repo.language_or_unknown().to_string();
        let tech_stack = minimal_tech_stack(&primary_language, &repo.topics);

        Self {
            repo,
            readme: String::new(),
            languages: LanguageHistogram::new(),
            primary_language,
            tech_stack,
            degraded: true,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.repo.full_name
    }
}

/// The language with the most bytes, or `"Unknown"` for an empty histogram.
///
/// Ties go to the alphabetically first language.
#[must_use]
pub fn primary_language(histogram: &LanguageHistogram) -> String {
    histogram
        .iter()
        .max_by(|(a_name, a_bytes), (b_name, b_bytes)| a_bytes.cmp(b_bytes).then_with(|| b_name.cmp(a_name)))
        .map_or_else(|| UNKNOWN_LANGUAGE.to_string(), |(name, _)| name.clone())
}
