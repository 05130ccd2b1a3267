//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the catalog source and the image fetcher so the store,
//! repository and image service can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use arcpace_core::testing::{fixtures, MockCatalogSource, MockImageFetcher};
//!
//! let source = MockCatalogSource::new();
//! source.set_document(fixtures::catalog_json(&fixtures::sample_arcs())).await;
//!
//! let fetcher = MockImageFetcher::new();
//! fetcher.set_response(fixtures::image_response("https://img.example/18.png")).await;
//! ```

mod mock_catalog_source;
mod mock_image_fetcher;

pub use mock_catalog_source::MockCatalogSource;
pub use mock_image_fetcher::{MockImageFetcher, RecordedFetch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use crate::catalog::{ArcRecord, ArtSource, CatalogDocument, CatalogSnapshot, CoverArtCandidate};
    use crate::identifier::{LookupInfo, TitleNormalizer};
    use crate::images::ImageResponse;

    /// Create an arc with titles and no cover art.
    pub fn arc(number: u32, title: &str, alternates: &[&str]) -> ArcRecord {
        ArcRecord {
            number,
            canonical_title: title.to_string(),
            alternate_titles: alternates.iter().map(|t| t.to_string()).collect(),
            cover_art: Vec::new(),
        }
    }

    /// Create a cover art candidate.
    pub fn cover_art(url: &str, width: u32, source: ArtSource) -> CoverArtCandidate {
        CoverArtCandidate {
            url: url.to_string(),
            width,
            source,
        }
    }

    /// Attach cover art to an arc.
    pub fn with_art(mut arc: ArcRecord, art: Vec<CoverArtCandidate>) -> ArcRecord {
        arc.cover_art = art;
        arc
    }

    /// A small catalog covering the East Blue through Water Seven.
    ///
    /// Arc 18 (Water Seven) carries art from both sources; arc 14 has an
    /// alternate spelling.
    pub fn sample_arcs() -> Vec<ArcRecord> {
        vec![
            with_art(
                arc(1, "Romance Dawn", &[]),
                vec![cover_art("https://img.example/web/1.png", 1000, ArtSource::Website)],
            ),
            arc(2, "Orange Town", &[]),
            arc(3, "Syrup Village", &[]),
            arc(4, "Gaimon", &[]),
            arc(5, "Baratie", &[]),
            arc(6, "Arlong Park", &[]),
            arc(7, "Loguetown", &[]),
            arc(8, "Reverse Mountain", &[]),
            arc(9, "Whisky Peak", &[]),
            arc(10, "Little Garden", &[]),
            arc(11, "Drum Island", &[]),
            arc(14, "Arabasta", &["Alabasta"]),
            arc(15, "Jaya", &[]),
            arc(16, "Skypiea", &[]),
            arc(17, "Long Ring Long Land", &[]),
            with_art(
                arc(18, "Water Seven", &[]),
                vec![
                    cover_art("https://img.example/web/18-small.png", 300, ArtSource::Website),
                    cover_art("https://img.example/chat/18.png", 1200, ArtSource::CommunityChat),
                    cover_art("https://img.example/web/18-large.png", 1000, ArtSource::Website),
                    cover_art("https://img.example/web/18-medium.png", 600, ArtSource::Website),
                ],
            ),
        ]
    }

    /// Serialize arcs as catalog JSON.
    pub fn catalog_json(arcs: &[ArcRecord]) -> Vec<u8> {
        versioned_catalog_json("test", arcs)
    }

    /// Serialize arcs as catalog JSON with a data version.
    pub fn versioned_catalog_json(version: &str, arcs: &[ArcRecord]) -> Vec<u8> {
        let document = CatalogDocument {
            version: Some(version.to_string()),
            arcs: arcs.to_vec(),
        };
        serde_json::to_vec(&document).expect("catalog fixtures serialize")
    }

    /// Build a generation 1 snapshot with the default normalizer.
    pub fn snapshot(arcs: Vec<ArcRecord>) -> CatalogSnapshot {
        let document = CatalogDocument {
            version: Some("test".to_string()),
            arcs,
        };
        CatalogSnapshot::from_document(
            document,
            1,
            String::new(),
            Arc::new(TitleNormalizer::default()),
        )
        .expect("fixture catalog is valid")
    }

    /// A season lookup.
    pub fn lookup(name: &str, index_number: Option<u32>) -> LookupInfo {
        LookupInfo::season(name, index_number)
    }

    /// A successful PNG response for `url`.
    pub fn image_response(url: &str) -> ImageResponse {
        ImageResponse {
            url: url.to_string(),
            status: 200,
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }
}
