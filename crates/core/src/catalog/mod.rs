//! Arc catalog: the versioned list of known arcs and their cover art.
//!
//! A [`CatalogSource`] produces raw catalog bytes, [`CatalogSnapshot`] parses and
//! indexes them, and [`CatalogStore`] publishes the active snapshot. Readers
//! clone an `Arc<CatalogSnapshot>` and keep using it even if a refresh swaps in
//! a newer one.

mod snapshot;
mod source;
mod store;
mod types;

pub use snapshot::{CatalogSnapshot, IndexedTitle};
pub use source::{create_catalog_source, FileCatalogSource, HttpCatalogSource};
pub use store::CatalogStore;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while loading the catalog.
///
/// A load error fails the refresh that hit it; the previously published
/// snapshot stays active.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading a local catalog file failed.
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote catalog returned a non-success status.
    #[error("Catalog source returned status {status}")]
    Status { status: u16 },

    /// Catalog data could not be parsed.
    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    /// Catalog data parsed but violates catalog invariants.
    #[error("Invalid catalog: {0}")]
    Invalid(String),

    /// Source is missing required settings.
    #[error("Catalog source not configured: {0}")]
    NotConfigured(String),

    /// The load was cancelled before it completed.
    #[error("Catalog load cancelled")]
    Cancelled,
}

/// Where raw catalog data comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable description for logs (e.g. `file:/data/arcs.json`).
    fn describe(&self) -> String;

    /// Fetch the raw catalog document bytes.
    async fn fetch(&self) -> Result<Vec<u8>, LoadError>;
}
