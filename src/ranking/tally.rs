use serde::Serialize;
use std::collections::HashMap;

/// One row of a ranked tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub name: String,
    pub count: usize,
}

/// Counts occurrences of names and lists them by count.
///
/// Names with equal counts keep the order in which they were first added.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Tally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str) {
        match self.counts.get_mut(name) {
            Some(count) => *count += 1,
            None => {
                let _ = self.counts.insert(name.to_string(), 1);
                self.order.push(name.to_string());
            }
        }
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// All names, most frequent first.
    #[must_use]
    pub fn ranked(&self) -> Vec<TallyEntry> {
        let mut entries: Vec<TallyEntry> = self
            .order
            .iter()
            .map(|name| TallyEntry {
                name: name.clone(),
                count: self.count(name),
            })
            .collect();

        // Stable sort keeps first-seen order among equal counts
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }

    /// The `n` most frequent names.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<TallyEntry> {
        let mut entries = self.ranked();
        entries.truncate(n);
        entries
    }
}

impl<'a> FromIterator<&'a str> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Self::new();
        for name in iter {
            tally.add(name);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_by_count_then_first_seen() {
        let tally: Tally = ["go", "rust", "c", "rust", "c", "zig"].into_iter().collect();
        let names: Vec<_> = tally.ranked().into_iter().map(|e| (e.name, e.count)).collect();

        assert_eq!(
            names,
            vec![("rust".into(), 2), ("c".into(), 2), ("go".into(), 1), ("zig".into(), 1)]
        );
    }

    #[test]
    fn test_top_truncates() {
        let tally: Tally = ["a", "b", "c", "a"].into_iter().collect();
        let top = tally.top(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "a");
        assert_eq!(top[1].name, "b");
    }

    #[test]
    fn test_counts_and_len() {
        let mut tally = Tally::new();
        assert_eq!(tally.len(), 0);
        tally.add("x");
        tally.add("x");
        assert_eq!(tally.len(), 1);
        assert_eq!(tally.count("x"), 2);
        assert_eq!(tally.count("y"), 0);
    }
}
