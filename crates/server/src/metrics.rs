//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the arcpace server:
//! - HTTP request metrics (latency, counts)
//! - Artwork preference state (collected dynamically)
//! - Core catalog, identification and image metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

use arcpace_core::metrics::{CATALOG_ARCS, CATALOG_GENERATION};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "arcpace_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("arcpace_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "arcpace_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Artwork Metrics
// =============================================================================

/// 1 when community chat art is preferred.
pub static ARTWORK_PREFER_COMMUNITY: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "arcpace_artwork_prefer_community",
        "Whether community chat art is ranked first (1) or website art (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Artwork
    registry
        .register(Box::new(ARTWORK_PREFER_COMMUNITY.clone()))
        .unwrap();

    // Core metrics (catalog, identification, images)
    for metric in arcpace_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the active snapshot even when no
/// refresh has run since startup.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let snapshot = state.store().snapshot();
    CATALOG_ARCS.set(snapshot.len() as i64);
    CATALOG_GENERATION.set(snapshot.generation() as i64);

    ARTWORK_PREFER_COMMUNITY.set(i64::from(state.preferences().prefer_community_art()));
}

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace arc numbers with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Applied twice: adjacent numeric segments share a slash
    let result = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_arc_number() {
        let path = "/api/v1/arcs/18";
        assert_eq!(normalize_path(path), "/api/v1/arcs/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_middle() {
        let path = "/api/v1/arcs/18/cover-art";
        assert_eq!(normalize_path(path), "/api/v1/arcs/{id}/cover-art");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("arcpace_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        ARTWORK_PREFER_COMMUNITY.set(0);
        CATALOG_ARCS.set(0);
        CATALOG_GENERATION.set(0);

        let output = encode_metrics();

        // HTTP metrics
        assert!(output.contains("arcpace_http_request_duration_seconds"));
        assert!(output.contains("arcpace_http_requests_in_flight"));

        // Artwork and catalog metrics
        assert!(output.contains("arcpace_artwork_prefer_community"));
        assert!(output.contains("arcpace_catalog_arcs"));
        assert!(output.contains("arcpace_catalog_generation"));
    }
}
