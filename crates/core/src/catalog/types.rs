//! Types for the arc catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a piece of cover art was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtSource {
    /// The project website.
    Website,
    /// The community chat server (posters shared by the community).
    #[serde(alias = "discord")]
    CommunityChat,
}

impl ArtSource {
    /// All known sources, in default preference order.
    pub const ALL: [ArtSource; 2] = [ArtSource::Website, ArtSource::CommunityChat];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtSource::Website => "website",
            ArtSource::CommunityChat => "community_chat",
        }
    }

    /// Parse a source tag as it appears in query strings and config.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "website" => Some(ArtSource::Website),
            "community_chat" | "community-chat" | "discord" => Some(ArtSource::CommunityChat),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArtSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which art source wins when candidates from several sources are ranked together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePreference {
    #[default]
    WebsiteFirst,
    CommunityFirst,
}

impl SourcePreference {
    /// Map the "prefer community art" flag to a preference.
    pub fn from_flag(prefer_community: bool) -> Self {
        if prefer_community {
            SourcePreference::CommunityFirst
        } else {
            SourcePreference::WebsiteFirst
        }
    }

    /// The source that sorts first.
    pub fn preferred(&self) -> ArtSource {
        match self {
            SourcePreference::WebsiteFirst => ArtSource::Website,
            SourcePreference::CommunityFirst => ArtSource::CommunityChat,
        }
    }

    /// Sort rank of a source (lower sorts first).
    pub fn rank(&self, source: ArtSource) -> u8 {
        if source == self.preferred() {
            0
        } else {
            1
        }
    }
}

/// A single located cover image for an arc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverArtCandidate {
    /// Absolute image URL.
    pub url: String,
    /// Pixel width, used for quality ranking.
    pub width: u32,
    /// Where the image was published.
    pub source: ArtSource,
}

/// A canonical arc record.
///
/// Named `ArcRecord` to stay clear of `std::sync::Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRecord {
    /// Ordinal arc number (positive, unique within a catalog).
    pub number: u32,
    /// Canonical title.
    #[serde(rename = "title")]
    pub canonical_title: String,
    /// Alternate titles, in stored order.
    #[serde(default)]
    pub alternate_titles: Vec<String>,
    /// Known cover art.
    #[serde(default)]
    pub cover_art: Vec<CoverArtCandidate>,
}

impl ArcRecord {
    /// Canonical title first, then alternates in stored order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_title.as_str())
            .chain(self.alternate_titles.iter().map(String::as_str))
    }
}

/// Raw catalog document as published by a catalog source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Publisher-assigned data version, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub arcs: Vec<ArcRecord>,
}

/// Summary of the active catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotInfo {
    /// Monotonic publish counter (0 = nothing loaded yet).
    pub generation: u64,
    /// Publisher-assigned data version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// SHA-256 of the raw catalog bytes.
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
    pub arc_count: usize,
    pub cover_art_count: usize,
}
