use super::{
    types::{CatalogSourceKind, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Catalog section exists (enforced by serde)
/// - Server port is not 0
/// - The selected catalog source has its path or URL, and the URL is absolute
/// - Catalog and artwork fetch timeouts are not 0
/// - Matcher prefix patterns compile and min_substring_len is at least 1
/// - Artwork provider name is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Catalog validation
    match config.catalog.source {
        CatalogSourceKind::File => {
            if config.catalog.path.is_none() {
                return Err(ConfigError::ValidationError(
                    "catalog.path is required when catalog.source = \"file\"".to_string(),
                ));
            }
        }
        CatalogSourceKind::Http => {
            let url = config.catalog.url.as_deref().unwrap_or_default();
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "catalog.url is required when catalog.source = \"http\"".to_string(),
                ));
            }
            reqwest::Url::parse(url).map_err(|e| {
                ConfigError::ValidationError(format!("catalog.url is invalid: {}", e))
            })?;
        }
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Matcher validation
    config.matcher.build_normalizer().map_err(|e| {
        ConfigError::ValidationError(format!("matcher.prefix_patterns is invalid: {}", e))
    })?;

    if config.matcher.min_substring_len == 0 {
        return Err(ConfigError::ValidationError(
            "matcher.min_substring_len must be at least 1".to_string(),
        ));
    }

    // Artwork validation
    if config.artwork.provider_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "artwork.provider_name cannot be empty".to_string(),
        ));
    }

    if config.artwork.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "artwork.fetch_timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
