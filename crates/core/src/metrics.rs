//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog (refreshes, active snapshot size and generation)
//! - Identification (outcomes by match method)
//! - Image resolution and byte fetches

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Catalog
// =============================================================================

/// Catalog refresh attempts by result.
pub static CATALOG_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("arcpace_catalog_refreshes_total", "Total catalog refreshes"),
        &["result"], // "success", "failed", "cancelled"
    )
    .unwrap()
});

/// Catalog refresh duration in seconds.
pub static CATALOG_REFRESH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "arcpace_catalog_refresh_duration_seconds",
            "Duration of catalog refreshes",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// Arcs in the active snapshot.
pub static CATALOG_ARCS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("arcpace_catalog_arcs", "Number of arcs in the active catalog").unwrap()
});

/// Generation of the active snapshot.
pub static CATALOG_GENERATION: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "arcpace_catalog_generation",
        "Generation of the active catalog snapshot",
    )
    .unwrap()
});

// =============================================================================
// Identification
// =============================================================================

/// Identification outcomes by method.
pub static IDENTIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "arcpace_identifications_total",
            "Arc identification attempts by outcome",
        ),
        &["method"], // "exact_number", "title_exact", "title_substring", "none"
    )
    .unwrap()
});

// =============================================================================
// Images
// =============================================================================

/// Image descriptors returned per resolution.
pub static IMAGES_RESOLVED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "arcpace_images_resolved",
            "Number of image descriptors returned per resolution",
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0]),
        &["scope"],
    )
    .unwrap()
});

/// Image byte fetches by result.
pub static IMAGE_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("arcpace_image_fetches_total", "Image byte fetches"),
        &["result"], // "success", "failed", "cancelled"
    )
    .unwrap()
});

/// All core metrics, for registration by the host process.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Catalog
        Box::new(CATALOG_REFRESHES.clone()),
        Box::new(CATALOG_REFRESH_DURATION.clone()),
        Box::new(CATALOG_ARCS.clone()),
        Box::new(CATALOG_GENERATION.clone()),
        // Identification
        Box::new(IDENTIFICATIONS.clone()),
        // Images
        Box::new(IMAGES_RESOLVED.clone()),
        Box::new(IMAGE_FETCHES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_registers_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        IDENTIFICATIONS.with_label_values(&["none"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "arcpace_identifications_total"));
    }
}
