//! Rule-based arc identifier.
//!
//! Resolves a noisy library entry to at most one catalog arc. Rules run in a
//! fixed order and the first one that fires wins, so the same input against
//! the same snapshot always gives the same answer.

use crate::catalog::{CatalogSnapshot, IndexedTitle};
use crate::identifier::types::{LookupInfo, MatchMethod, MatchResult};

/// Configuration for the arc identifier.
#[derive(Debug, Clone)]
pub struct IdentifierConfig {
    /// Shortest matched substring (in characters) accepted by the containment rule.
    ///
    /// The default of 1 accepts any containment. Raising it keeps stray short
    /// fragments from matching, at the cost of short titles like "W7".
    pub min_substring_len: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            min_substring_len: 1,
        }
    }
}

/// Deterministic arc identifier.
///
/// Rules, in order:
/// 1. Index number equals an arc number
/// 2. Normalized name equals a normalized title (canonical before alternates)
/// 3. Containment in either direction, longest matched substring first
///
/// Ties always go to the lowest arc number.
#[derive(Debug, Clone, Default)]
pub struct ArcIdentifier {
    config: IdentifierConfig,
}

impl ArcIdentifier {
    /// Create a new identifier with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new identifier with custom config.
    pub fn with_config(config: IdentifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// Identify the arc for `lookup` in `snapshot`.
    ///
    /// `None` is the normal outcome for unrelated entries.
    pub fn identify(&self, lookup: &LookupInfo, snapshot: &CatalogSnapshot) -> Option<MatchResult> {
        if lookup.name.trim().is_empty() {
            return None;
        }

        if let Some(result) = Self::match_index_number(lookup, snapshot) {
            return Some(result);
        }

        let normalized = snapshot.normalizer().normalize(&lookup.name);
        if normalized.is_empty() {
            return None;
        }

        Self::match_exact_title(&normalized, snapshot)
            .or_else(|| self.match_title_substring(&normalized, snapshot))
    }

    fn match_index_number(lookup: &LookupInfo, snapshot: &CatalogSnapshot) -> Option<MatchResult> {
        let number = lookup.index_number?;
        snapshot.get(number).map(|arc| MatchResult {
            number: arc.number,
            method: MatchMethod::ExactNumber,
            matched_title: None,
            via_alternate: false,
        })
    }

    fn match_exact_title(normalized: &str, snapshot: &CatalogSnapshot) -> Option<MatchResult> {
        // The index is ordered by (number, position): lowest arc first, canonical first
        snapshot
            .titles_matching(normalized)
            .next()
            .map(|title| Self::title_result(title, MatchMethod::TitleExact))
    }

    fn match_title_substring(
        &self,
        normalized: &str,
        snapshot: &CatalogSnapshot,
    ) -> Option<MatchResult> {
        let lookup_len = normalized.chars().count();
        let mut best: Option<(&IndexedTitle, usize)> = None;

        for title in snapshot.titles() {
            let matched_len = if normalized.contains(title.normalized.as_str()) {
                title.normalized.chars().count()
            } else if title.normalized.contains(normalized) {
                lookup_len
            } else {
                continue;
            };

            if matched_len < self.config.min_substring_len {
                continue;
            }

            // Titles are sorted by (number, position), so strict `>` keeps the
            // lowest number on equal lengths
            if best.is_none_or(|(_, best_len)| matched_len > best_len) {
                best = Some((title, matched_len));
            }
        }

        best.map(|(title, _)| Self::title_result(title, MatchMethod::TitleSubstring))
    }

    fn title_result(title: &IndexedTitle, method: MatchMethod) -> MatchResult {
        MatchResult {
            number: title.number,
            method,
            matched_title: Some(title.normalized.clone()),
            via_alternate: !title.is_canonical(),
        }
    }
}
