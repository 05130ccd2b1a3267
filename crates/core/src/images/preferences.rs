//! Artwork preferences shared between the settings surface and providers.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::catalog::SourcePreference;

/// Runtime-adjustable artwork preferences.
///
/// Providers read these on every query, so a settings change applies to the
/// next lookup without rebuilding anything.
#[derive(Debug, Default)]
pub struct ArtworkPreferences {
    prefer_community_art: AtomicBool,
}

impl ArtworkPreferences {
    pub fn new(prefer_community_art: bool) -> Self {
        Self {
            prefer_community_art: AtomicBool::new(prefer_community_art),
        }
    }

    pub fn prefer_community_art(&self) -> bool {
        self.prefer_community_art.load(Ordering::Relaxed)
    }

    pub fn set_prefer_community_art(&self, value: bool) {
        self.prefer_community_art.store(value, Ordering::Relaxed);
    }

    pub fn source_preference(&self) -> SourcePreference {
        SourcePreference::from_flag(self.prefer_community_art())
    }
}
