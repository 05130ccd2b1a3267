//! Catalog sources: a bundled JSON file or a remote URL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{CatalogSource, LoadError};
use crate::config::{CatalogConfig, CatalogSourceKind};

/// Reads the catalog from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        debug!("Reading catalog from {:?}", self.path);
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.display().to_string(),
                source,
            })
    }
}

/// Fetches the catalog from a remote URL.
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    /// Create a new HTTP source with a request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(LoadError::NotConfigured(
                "catalog URL is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        debug!("Fetching catalog from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Create a catalog source from configuration.
pub fn create_catalog_source(config: &CatalogConfig) -> Result<Arc<dyn CatalogSource>, LoadError> {
    match config.source {
        CatalogSourceKind::File => {
            let path = config.path.clone().ok_or_else(|| {
                LoadError::NotConfigured("catalog.path is required for file source".to_string())
            })?;
            Ok(Arc::new(FileCatalogSource::new(path)))
        }
        CatalogSourceKind::Http => {
            let url = config.url.clone().ok_or_else(|| {
                LoadError::NotConfigured("catalog.url is required for http source".to_string())
            })?;
            let timeout = Duration::from_secs(u64::from(config.timeout_secs));
            Ok(Arc::new(HttpCatalogSource::new(url, timeout)?))
        }
    }
}
