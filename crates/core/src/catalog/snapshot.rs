//! Immutable, indexed view of one catalog load.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::types::{ArcRecord, CatalogDocument, SnapshotInfo};
use super::LoadError;
use crate::identifier::TitleNormalizer;

/// A catalog title after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedTitle {
    /// Arc this title belongs to.
    pub number: u32,
    /// 0 for the canonical title, 1.. for alternates in stored order.
    pub position: usize,
    /// Normalized comparison key (never empty).
    pub normalized: String,
}

impl IndexedTitle {
    pub fn is_canonical(&self) -> bool {
        self.position == 0
    }
}

/// One published version of the catalog.
///
/// Never mutated after construction; refreshes build a new snapshot and
/// swap it in whole.
#[derive(Debug)]
pub struct CatalogSnapshot {
    generation: u64,
    version: Option<String>,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
    /// Arena of arcs, sorted by number.
    arcs: Vec<ArcRecord>,
    by_number: HashMap<u32, usize>,
    /// All matchable titles, sorted by (number, position).
    titles: Vec<IndexedTitle>,
    /// Normalized title -> indices into `titles`, ascending.
    title_index: HashMap<String, Vec<usize>>,
    normalizer: Arc<TitleNormalizer>,
}

impl CatalogSnapshot {
    /// An empty snapshot (generation 0), used before the first successful load.
    pub fn empty(normalizer: Arc<TitleNormalizer>) -> Self {
        Self {
            generation: 0,
            version: None,
            fingerprint: String::new(),
            loaded_at: Utc::now(),
            arcs: Vec::new(),
            by_number: HashMap::new(),
            titles: Vec::new(),
            title_index: HashMap::new(),
            normalizer,
        }
    }

    /// Parse raw catalog JSON into a snapshot.
    pub fn from_bytes(
        bytes: &[u8],
        generation: u64,
        normalizer: Arc<TitleNormalizer>,
    ) -> Result<Self, LoadError> {
        let document: CatalogDocument = serde_json::from_slice(bytes)
            .map_err(|e| LoadError::Parse(format!("Failed to parse catalog JSON: {}", e)))?;
        let fingerprint = format!("{:x}", Sha256::digest(bytes));
        Self::from_document(document, generation, fingerprint, normalizer)
    }

    /// Validate and index an already-parsed document.
    pub fn from_document(
        document: CatalogDocument,
        generation: u64,
        fingerprint: String,
        normalizer: Arc<TitleNormalizer>,
    ) -> Result<Self, LoadError> {
        let mut arcs = document.arcs;
        validate_arcs(&arcs)?;
        arcs.sort_by_key(|arc| arc.number);

        let by_number = arcs
            .iter()
            .enumerate()
            .map(|(idx, arc)| (arc.number, idx))
            .collect();

        let mut titles = Vec::new();
        for arc in &arcs {
            for (position, title) in arc.titles().enumerate() {
                let normalized = normalizer.normalize(title);
                if normalized.is_empty() {
                    continue;
                }
                titles.push(IndexedTitle {
                    number: arc.number,
                    position,
                    normalized,
                });
            }
        }

        let mut title_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, title) in titles.iter().enumerate() {
            title_index
                .entry(title.normalized.clone())
                .or_default()
                .push(idx);
        }

        Ok(Self {
            generation,
            version: document.version,
            fingerprint,
            loaded_at: Utc::now(),
            arcs,
            by_number,
            titles,
            title_index,
            normalizer,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// All arcs, sorted by number.
    pub fn arcs(&self) -> &[ArcRecord] {
        &self.arcs
    }

    /// O(1) lookup by arc number.
    pub fn get(&self, number: u32) -> Option<&ArcRecord> {
        self.by_number.get(&number).map(|&idx| &self.arcs[idx])
    }

    /// All matchable titles, sorted by (number, position).
    pub fn titles(&self) -> &[IndexedTitle] {
        &self.titles
    }

    /// Titles whose normalized form equals `normalized`, lowest arc number first.
    pub fn titles_matching<'a>(
        &'a self,
        normalized: &str,
    ) -> impl Iterator<Item = &'a IndexedTitle> + 'a {
        self.title_index
            .get(normalized)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.titles[idx])
    }

    /// Whether any arc lists `url` as cover art.
    pub fn has_cover_art_url(&self, url: &str) -> bool {
        self.arcs
            .iter()
            .flat_map(|arc| &arc.cover_art)
            .any(|art| art.url == url)
    }

    /// The normalizer this snapshot's titles were indexed with.
    pub fn normalizer(&self) -> &TitleNormalizer {
        &self.normalizer
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            generation: self.generation,
            version: self.version.clone(),
            fingerprint: self.fingerprint.clone(),
            loaded_at: self.loaded_at,
            arc_count: self.arcs.len(),
            cover_art_count: self.arcs.iter().map(|a| a.cover_art.len()).sum(),
        }
    }
}

fn validate_arcs(arcs: &[ArcRecord]) -> Result<(), LoadError> {
    let mut seen = HashSet::new();

    for arc in arcs {
        if arc.number == 0 {
            return Err(LoadError::Invalid(format!(
                "arc '{}' has number 0 (numbers must be positive)",
                arc.canonical_title
            )));
        }
        if !seen.insert(arc.number) {
            return Err(LoadError::Invalid(format!(
                "duplicate arc number {}",
                arc.number
            )));
        }
        if arc.canonical_title.trim().is_empty() {
            return Err(LoadError::Invalid(format!(
                "arc {} has an empty title",
                arc.number
            )));
        }
        for art in &arc.cover_art {
            if art.width == 0 {
                return Err(LoadError::Invalid(format!(
                    "arc {} cover art {} has zero width",
                    arc.number, art.url
                )));
            }
            reqwest::Url::parse(&art.url).map_err(|e| {
                LoadError::Invalid(format!(
                    "arc {} cover art URL '{}' is not absolute: {}",
                    arc.number, art.url, e
                ))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{ArtSource, CoverArtCandidate};

    fn normalizer() -> Arc<TitleNormalizer> {
        Arc::new(TitleNormalizer::default())
    }

    fn arc(number: u32, title: &str, alternates: &[&str]) -> ArcRecord {
        ArcRecord {
            number,
            canonical_title: title.to_string(),
            alternate_titles: alternates.iter().map(|s| s.to_string()).collect(),
            cover_art: vec![],
        }
    }

    fn document(arcs: Vec<ArcRecord>) -> CatalogDocument {
        CatalogDocument {
            version: Some("test".to_string()),
            arcs,
        }
    }

    #[test]
    fn test_from_bytes_indexes_arcs() {
        let json = r#"{
            "version": "2024.1",
            "arcs": [
                { "number": 2, "title": "Orange Town" },
                { "number": 1, "title": "Romance Dawn", "alternate_titles": ["Romance Dawn Arc"] }
            ]
        }"#;
        let snapshot = CatalogSnapshot::from_bytes(json.as_bytes(), 1, normalizer()).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.version(), Some("2024.1"));
        assert_eq!(snapshot.generation(), 1);
        assert_eq!(snapshot.fingerprint().len(), 64);
        // Sorted by number
        assert_eq!(snapshot.arcs()[0].number, 1);
        assert_eq!(snapshot.get(2).unwrap().canonical_title, "Orange Town");
        assert!(snapshot.get(3).is_none());
    }

    #[test]
    fn test_every_arc_is_reachable_by_number() {
        let arcs: Vec<ArcRecord> = (1..=20).map(|n| arc(n, &format!("Arc Title {}", n), &[])).collect();
        let snapshot =
            CatalogSnapshot::from_document(document(arcs.clone()), 1, String::new(), normalizer())
                .unwrap();
        for expected in &arcs {
            assert_eq!(snapshot.get(expected.number), Some(expected));
        }
    }

    #[test]
    fn test_title_index_orders_by_number_then_position() {
        let snapshot = CatalogSnapshot::from_document(
            document(vec![
                arc(7, "Loguetown", &["Shared"]),
                arc(3, "Shared", &[]),
            ]),
            1,
            String::new(),
            normalizer(),
        )
        .unwrap();

        let matches: Vec<(u32, usize)> = snapshot
            .titles_matching("shared")
            .map(|t| (t.number, t.position))
            .collect();
        assert_eq!(matches, vec![(3, 0), (7, 1)]);
    }

    #[test]
    fn test_titles_normalizing_to_empty_are_skipped() {
        let snapshot = CatalogSnapshot::from_document(
            document(vec![arc(5, "Baratie", &["Season 5"])]),
            1,
            String::new(),
            normalizer(),
        )
        .unwrap();
        assert_eq!(snapshot.titles().len(), 1);
        assert!(snapshot.titles()[0].is_canonical());
    }

    #[test]
    fn test_duplicate_numbers_rejected() {
        let result = CatalogSnapshot::from_document(
            document(vec![arc(4, "Gaimon", &[]), arc(4, "Gaimon Again", &[])]),
            1,
            String::new(),
            normalizer(),
        );
        assert!(matches!(result, Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_zero_number_rejected() {
        let result = CatalogSnapshot::from_document(
            document(vec![arc(0, "Specials", &[])]),
            1,
            String::new(),
            normalizer(),
        );
        assert!(matches!(result, Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_relative_cover_art_url_rejected() {
        let mut bad = arc(6, "Arlong Park", &[]);
        bad.cover_art.push(CoverArtCandidate {
            url: "/images/arlong.png".to_string(),
            width: 500,
            source: ArtSource::Website,
        });
        let result =
            CatalogSnapshot::from_document(document(vec![bad]), 1, String::new(), normalizer());
        assert!(matches!(result, Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut bad = arc(6, "Arlong Park", &[]);
        bad.cover_art.push(CoverArtCandidate {
            url: "https://example.org/arlong.png".to_string(),
            width: 0,
            source: ArtSource::Website,
        });
        let result =
            CatalogSnapshot::from_document(document(vec![bad]), 1, String::new(), normalizer());
        assert!(matches!(result, Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = CatalogSnapshot::from_bytes(b"{ not json", 1, normalizer());
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_info_counts() {
        let mut with_art = arc(1, "Romance Dawn", &[]);
        with_art.cover_art.push(CoverArtCandidate {
            url: "https://example.org/1.png".to_string(),
            width: 1000,
            source: ArtSource::Website,
        });
        let snapshot = CatalogSnapshot::from_document(
            document(vec![with_art, arc(2, "Orange Town", &[])]),
            4,
            "abc".to_string(),
            normalizer(),
        )
        .unwrap();

        let info = snapshot.info();
        assert_eq!(info.generation, 4);
        assert_eq!(info.arc_count, 2);
        assert_eq!(info.cover_art_count, 1);
        assert_eq!(info.fingerprint, "abc");
        assert!(snapshot.has_cover_art_url("https://example.org/1.png"));
        assert!(!snapshot.has_cover_art_url("https://example.org/2.png"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CatalogSnapshot::empty(normalizer());
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.is_empty());
        assert!(snapshot.get(1).is_none());
    }
}
