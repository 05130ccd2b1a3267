//! Image resolution: turning a library entry into cover art descriptors.
//!
//! [`ImageResolutionService`] is the [`RemoteImageProvider`] a host registers.
//! It identifies the arc, looks up its cover art on the same catalog snapshot,
//! and hands byte fetches to an [`ImageFetcher`].

mod fetcher;
mod preferences;
mod service;
mod types;

pub use fetcher::HttpImageFetcher;
pub use preferences::ArtworkPreferences;
pub use service::{ImageResolutionService, ProviderScope};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::identifier::LookupInfo;

/// Errors that can occur when fetching image bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (network, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote returned a non-success status.
    #[error("Image request returned status {status}")]
    Status { status: u16 },

    /// URL could not be parsed as an absolute http(s) URL.
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// The fetch was cancelled before it completed.
    #[error("Image fetch cancelled")]
    Cancelled,
}

/// Retrieves image bytes by URL.
///
/// Retries and timeouts belong to the implementation, not to callers.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ImageResponse, FetchError>;
}

/// Capability a host uses to obtain remote images for library entries.
#[async_trait]
pub trait RemoteImageProvider: Send + Sync {
    /// Provider name shown to the host.
    fn name(&self) -> &str;

    /// Ordering among providers. Lower is preferred.
    fn priority(&self) -> u32;

    /// Whether this provider handles the given entry at all.
    fn supports(&self, lookup: &LookupInfo) -> bool;

    /// Image kinds this provider can return for the entry.
    fn supported_images(&self, lookup: &LookupInfo) -> Vec<ImageKind>;

    /// Ordered image descriptors. Empty when nothing matches.
    async fn get_images(&self, lookup: &LookupInfo) -> Vec<ImageDescriptor>;

    /// Fetch the bytes behind an image URL.
    async fn fetch_bytes(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageResponse, FetchError>;
}
