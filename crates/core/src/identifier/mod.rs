//! Arc identification.
//!
//! Maps a noisy library entry ([`LookupInfo`]) to at most one catalog arc.
//! Identification is pure: it reads a [`CatalogSnapshot`](crate::catalog::CatalogSnapshot)
//! and never logs, records metrics, or touches the network.

mod matcher;
mod normalize;
mod types;

pub use matcher::{ArcIdentifier, IdentifierConfig};
pub use normalize::{TitleNormalizer, DEFAULT_PREFIX_PATTERNS, MAX_STRIP_PASSES};
pub use types::*;
