//! Hazard snapshot loading shared by the subcommands.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use saferoute_core::store::version_at;
use saferoute_core::{HazardSnapshot, HazardStore};
use saferoute_data::JsonHazardStore;

use crate::{ARG_HAZARDS, ARG_HAZARDS_DB, CliError, fs::require_existing};

/// Where hazards are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HazardSource {
    Json(Utf8PathBuf),
    Sqlite(Utf8PathBuf),
    None,
}

impl HazardSource {
    /// Pick the source from the `--hazards` and `--hazards-db` options.
    pub(crate) fn from_options(
        hazards: Option<Utf8PathBuf>,
        hazards_db: Option<Utf8PathBuf>,
    ) -> Result<Self, CliError> {
        match (hazards, hazards_db) {
            (Some(_), Some(_)) => Err(CliError::ConflictingHazardSources),
            (Some(path), None) => Ok(Self::Json(path)),
            (None, Some(path)) => Ok(Self::Sqlite(path)),
            (None, None) => Ok(Self::None),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CliError> {
        match self {
            Self::Json(path) => require_existing(path, ARG_HAZARDS),
            Self::Sqlite(path) => require_existing(path, ARG_HAZARDS_DB),
            Self::None => Ok(()),
        }
    }

    /// Capture a snapshot at `now`.
    pub(crate) fn load(&self, now: DateTime<Utc>) -> Result<HazardSnapshot, CliError> {
        match self {
            Self::Json(path) => Ok(JsonHazardStore::open(path)?.snapshot(now)?),
            Self::Sqlite(path) => load_sqlite(path, now),
            Self::None => {
                log::warn!("no hazard source configured; every point will classify as low risk");
                Ok(HazardSnapshot::empty(version_at(now)))
            }
        }
    }
}

#[cfg(feature = "store-sqlite")]
fn load_sqlite(path: &Utf8Path, now: DateTime<Utc>) -> Result<HazardSnapshot, CliError> {
    let store = saferoute_core::SqliteHazardStore::open(path.as_std_path())
        .map_err(saferoute_core::HazardStoreError::from)?;
    Ok(store.snapshot(now)?)
}

#[cfg(not(feature = "store-sqlite"))]
fn load_sqlite(_path: &Utf8Path, _now: DateTime<Utc>) -> Result<HazardSnapshot, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "reading --hazards-db",
    })
}
