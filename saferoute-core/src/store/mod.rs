//! Sources of hazard snapshots.
//!
//! A [`HazardStore`] produces an immutable [`HazardSnapshot`] on demand.
//! Stores return every active record they hold; expiry is applied against
//! `now` by the classifier and the warnings assembly, not here.

use thiserror::Error;

use chrono::{DateTime, Utc};

use crate::HazardSnapshot;

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteHazardStore, SqliteHazardStoreError};

/// Error raised by a [`HazardStore`] backend.
#[derive(Debug, Error)]
pub enum HazardStoreError {
    /// The backing store failed to produce a snapshot.
    #[error("{store} hazard store failed: {source}")]
    Backend {
        /// Short backend name, e.g. `"sqlite"` or `"json"`.
        store: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl HazardStoreError {
    /// Wrap a backend failure.
    pub fn backend(
        store: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            store,
            source: source.into(),
        }
    }
}

/// Read-only source of hazard snapshots.
///
/// # Examples
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use saferoute_core::{HazardSnapshot, HazardStore, HazardStoreError};
///
/// struct Empty;
///
/// impl HazardStore for Empty {
///     fn snapshot(&self, now: DateTime<Utc>) -> Result<HazardSnapshot, HazardStoreError> {
///         let version = u64::try_from(now.timestamp()).unwrap_or_default();
///         Ok(HazardSnapshot::empty(version))
///     }
/// }
///
/// let snapshot = Empty.snapshot(Utc::now()).expect("snapshot");
/// assert!(snapshot.zones().is_empty());
/// ```
pub trait HazardStore {
    /// Capture the store's current hazards.
    ///
    /// `now` stamps the snapshot version when the backend has none of its
    /// own; it does not filter records.
    fn snapshot(&self, now: DateTime<Utc>) -> Result<HazardSnapshot, HazardStoreError>;
}

/// Snapshot version derived from a capture time, in milliseconds.
pub fn version_at(now: DateTime<Utc>) -> u64 {
    u64::try_from(now.timestamp_millis()).unwrap_or_default()
}
