//! Types exchanged with the image host.

use serde::{Deserialize, Serialize};

use crate::catalog::ArtSource;

/// Kind of image a host asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    /// Poster / cover art.
    #[default]
    Primary,
    Backdrop,
    Thumb,
}

/// A locatable image the host can fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub kind: ImageKind,
    pub url: String,
    /// Pixel width.
    pub width: u32,
    /// Name of the provider that produced this descriptor.
    pub provider_name: String,
    pub source: ArtSource,
}

/// Raw bytes fetched for an image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
