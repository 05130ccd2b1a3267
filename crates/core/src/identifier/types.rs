//! Types for arc identification.

use serde::{Deserialize, Serialize};

/// What kind of library entry is being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    /// A season folder; arcs map onto seasons.
    #[default]
    Season,
    Series,
    Episode,
}

/// Caller-provided lookup descriptor for a library entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupInfo {
    /// Raw entry name, possibly with season markers, punctuation or numerals.
    pub name: String,
    /// Index number assigned by the library (season number for seasons).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_number: Option<u32>,
    #[serde(default)]
    pub kind: LookupKind,
}

impl LookupInfo {
    /// A season lookup.
    pub fn season(name: impl Into<String>, index_number: Option<u32>) -> Self {
        Self {
            name: name.into(),
            index_number,
            kind: LookupKind::Season,
        }
    }

    pub fn with_kind(mut self, kind: LookupKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// `index_number` equals an arc number.
    ExactNumber,
    /// Normalized name equals a normalized catalog title.
    TitleExact,
    /// One normalized string contains the other.
    TitleSubstring,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::ExactNumber => "exact_number",
            MatchMethod::TitleExact => "title_exact",
            MatchMethod::TitleSubstring => "title_substring",
        }
    }
}

/// Outcome of a successful identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched arc number.
    pub number: u32,
    pub method: MatchMethod,
    /// Normalized catalog title that matched (title rules only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_title: Option<String>,
    /// True when an alternate title, not the canonical one, matched.
    #[serde(default)]
    pub via_alternate: bool,
}
