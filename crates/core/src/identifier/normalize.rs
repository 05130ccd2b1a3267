//! Title normalization shared by catalog indexing and lookups.

use regex_lite::Regex;

/// Prefix patterns stripped from lower-cased titles before comparison.
///
/// Applied repeatedly so stacked prefixes ("one pace - arc 12: ...") all go.
pub const DEFAULT_PREFIX_PATTERNS: &[&str] = &[
    r"^one\s*pace\b\s*[:.\-]?\s*",
    r"^(?:season|arc|saga|part|chapter)\b\s*\d*\s*[:.\-]?\s*",
    r"^s\d+\b\s*[:.\-]?\s*",
    r"^\d+\s*[:.\-]\s*",
];

/// Upper bound on prefix stripping passes.
pub const MAX_STRIP_PASSES: usize = 8;

/// Turns noisy titles into compact comparison keys.
///
/// Steps: lower-case, strip known prefix tokens, drop everything that is not
/// alphanumeric (punctuation and whitespace runs).
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    prefixes: Vec<Regex>,
}

impl TitleNormalizer {
    /// Build a normalizer from custom prefix patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex_lite::Error> {
        let prefixes = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { prefixes })
    }

    /// Normalize a title. Returns an empty string when nothing meaningful is left.
    pub fn normalize(&self, title: &str) -> String {
        let mut text = title.trim().to_lowercase();

        for _ in 0..MAX_STRIP_PASSES {
            let before = text.len();
            for prefix in &self.prefixes {
                if let Some(m) = prefix.find(&text) {
                    if m.start() == 0 && m.end() > 0 {
                        text = text[m.end()..].trim_start().to_string();
                    }
                }
            }
            if text.len() == before || text.is_empty() {
                break;
            }
        }

        text.chars().filter(|c| c.is_alphanumeric()).collect()
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX_PATTERNS).expect("default prefix patterns are valid")
    }
}
