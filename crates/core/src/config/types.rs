use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::identifier::{IdentifierConfig, TitleNormalizer, DEFAULT_PREFIX_PATTERNS};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub artwork: ArtworkConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Where the arc catalog is loaded from
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSourceKind {
    File,
    Http,
}

/// Catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,
    /// Catalog JSON file (required when source = "file")
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Catalog JSON URL (required when source = "http")
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Background refresh interval in seconds, 0 disables (default: 3600)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl CatalogConfig {
    /// Background refresh interval, `None` when disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_secs))
    }
}

fn default_timeout() -> u32 {
    30
}

fn default_refresh_interval() -> u64 {
    3600
}

/// Artwork configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtworkConfig {
    /// Rank community chat posters ahead of website art (default: false)
    #[serde(default)]
    pub prefer_community_art: bool,
    /// Name stamped on every image descriptor (default: "One Pace")
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    /// Drop repeated cover art URLs (default: false)
    #[serde(default)]
    pub dedupe_urls: bool,
    /// Image byte fetch timeout in seconds (default: 15)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u32,
}

impl ArtworkConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.fetch_timeout_secs))
    }
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            prefer_community_art: false,
            provider_name: default_provider_name(),
            dedupe_urls: false,
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_fetch_timeout() -> u32 {
    15
}

fn default_provider_name() -> String {
    "One Pace".to_string()
}

/// Title matching configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatcherConfig {
    /// Regex prefixes stripped from lower-cased titles before comparison
    #[serde(default = "default_prefix_patterns")]
    pub prefix_patterns: Vec<String>,
    /// Shortest accepted substring match, in characters (default: 1)
    #[serde(default = "default_min_substring_len")]
    pub min_substring_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            prefix_patterns: default_prefix_patterns(),
            min_substring_len: default_min_substring_len(),
        }
    }
}

impl MatcherConfig {
    /// Compile the configured prefix patterns.
    pub fn build_normalizer(&self) -> Result<TitleNormalizer, regex_lite::Error> {
        TitleNormalizer::new(self.prefix_patterns.as_slice())
    }

    pub fn identifier_config(&self) -> IdentifierConfig {
        IdentifierConfig {
            min_substring_len: self.min_substring_len,
        }
    }
}

fn default_prefix_patterns() -> Vec<String> {
    DEFAULT_PREFIX_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_min_substring_len() -> usize {
    IdentifierConfig::default().min_substring_len
}

/// Sanitized config for API responses (catalog URL query redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub catalog: SanitizedCatalogConfig,
    pub artwork: ArtworkConfig,
    pub matcher: MatcherConfig,
}

/// Sanitized catalog config (URL query string may carry tokens)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub source: CatalogSourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub timeout_secs: u32,
    pub refresh_interval_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            catalog: SanitizedCatalogConfig {
                source: config.catalog.source,
                path: config.catalog.path.clone(),
                url: config.catalog.url.as_deref().map(strip_query),
                timeout_secs: config.catalog.timeout_secs,
                refresh_interval_secs: config.catalog.refresh_interval_secs,
            },
            artwork: config.artwork.clone(),
            matcher: config.matcher.clone(),
        }
    }
}

fn strip_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?<redacted>", base),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_file_catalog() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[catalog]
source = "file"
path = "/data/arcs.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.catalog.source, CatalogSourceKind::File);
        assert_eq!(config.catalog.path, Some(PathBuf::from("/data/arcs.json")));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[catalog]
source = "http"
url = "https://example.org/arcs.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert_eq!(config.catalog.refresh_interval(), Some(Duration::from_secs(3600)));
        assert!(!config.artwork.prefer_community_art);
        assert_eq!(config.artwork.provider_name, "One Pace");
        assert_eq!(config.artwork.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.matcher.min_substring_len, 1);
        assert_eq!(config.matcher.prefix_patterns.len(), DEFAULT_PREFIX_PATTERNS.len());
    }

    #[test]
    fn test_zero_refresh_interval_disables_loop() {
        let toml = r#"
[catalog]
source = "file"
path = "arcs.json"
refresh_interval_secs = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.refresh_interval(), None);
    }

    #[test]
    fn test_sanitized_config_hides_url_query() {
        let toml = r#"
[catalog]
source = "http"
url = "https://example.org/arcs.json?token=secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("https://example.org/arcs.json?<redacted>"));
    }

    #[test]
    fn test_build_normalizer_from_custom_patterns() {
        let matcher = MatcherConfig {
            prefix_patterns: vec![r"^episode\s*\d+\s*".to_string()],
            min_substring_len: 3,
        };
        let normalizer = matcher.build_normalizer().unwrap();
        assert_eq!(normalizer.normalize("Episode 4 Gaimon"), "gaimon");
    }
}
