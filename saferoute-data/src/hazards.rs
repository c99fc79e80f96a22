//! JSON-file hazard store and gazetteer loader.
//!
//! The hazard document is a single object:
//!
//! ```json
//! {
//!   "version": 42,
//!   "zones": [{"id": "centro", "name": "Centro", "lat": 28.6353, "lon": -106.0886,
//!              "radius_km": 0.5, "level": "high"}],
//!   "reports": [{"id": "r1", "lat": 28.64, "lon": -106.08, "severity": "medium",
//!                "verified": true, "created_at": "2024-05-01T10:00:00Z"}],
//!   "disasters": [{"id": "d1", "kind": "flood", "lat": 28.65, "lon": -106.07,
//!                  "radius_km": 2.0, "severity": "critical"}]
//! }
//! ```
//!
//! Every section is optional. Levels accept English or Spanish labels.
//! Records with `"active": false` are dropped on load; expiry is left to
//! the engines.
//!
//! A verified Medium or High report also yields a 0.5 km zone of its level,
//! expiring 24 hours after `verified_at` (or `created_at` when the report
//! carries no verification time).

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use chrono::{DateTime, Utc};
use geo::Coord;
use saferoute_core::store::version_at;
use saferoute_core::{
    DisasterKind, DisasterRecord, Gazetteer, HazardSnapshot, HazardStore, HazardStoreError,
    IncidentReport, Place, RiskLevel, RiskZone,
};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading JSON hazard or gazetteer files.
#[derive(Debug, Error)]
pub enum HazardFileError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Open {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The document was not valid JSON of the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that was parsed.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A record carried an invalid value.
    #[error("record {id} is invalid: {message}")]
    InvalidRecord {
        /// Identifier of the offending record.
        id: String,
        /// What was wrong with it.
        message: String,
    },
}

impl HazardFileError {
    fn invalid(id: &str, message: impl std::fmt::Display) -> Self {
        Self::InvalidRecord {
            id: id.to_owned(),
            message: message.to_string(),
        }
    }
}

const fn active_by_default() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct HazardDocument {
    #[serde(default)]
    version: Option<u64>,
    #[serde(default)]
    zones: Vec<ZoneEntry>,
    #[serde(default)]
    reports: Vec<ReportEntry>,
    #[serde(default)]
    disasters: Vec<DisasterEntry>,
}

#[derive(Debug, Deserialize)]
struct ZoneEntry {
    id: String,
    name: String,
    lat: f64,
    lon: f64,
    radius_km: f64,
    level: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    active: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportEntry {
    id: String,
    lat: f64,
    lon: f64,
    severity: String,
    #[serde(default)]
    verified: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisasterEntry {
    id: String,
    kind: String,
    lat: f64,
    lon: f64,
    radius_km: f64,
    severity: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    active: bool,
}

#[derive(Debug, Deserialize)]
struct PlaceEntry {
    name: String,
    #[serde(default)]
    address: Option<String>,
    lat: f64,
    lon: f64,
}

fn parse_level(id: &str, label: &str) -> Result<RiskLevel, HazardFileError> {
    label
        .parse()
        .map_err(|err| HazardFileError::invalid(id, err))
}

impl ZoneEntry {
    fn into_zone(self) -> Result<RiskZone, HazardFileError> {
        let level = parse_level(&self.id, &self.level)?;
        let centre = Coord {
            x: self.lon,
            y: self.lat,
        };
        let mut zone = RiskZone::new(&self.id, self.name, centre, self.radius_km, level)
            .map_err(|err| HazardFileError::invalid(&self.id, err))?;
        if let Some(expires_at) = self.expires_at {
            zone = zone.with_expiry(expires_at);
        }
        if let Some(description) = self.description {
            zone = zone.with_description(description);
        }
        Ok(zone)
    }
}

impl ReportEntry {
    fn into_report(self) -> Result<IncidentReport, HazardFileError> {
        let severity = parse_level(&self.id, &self.severity)?;
        let location = Coord {
            x: self.lon,
            y: self.lat,
        };
        if !saferoute_core::is_valid_coord(location) {
            return Err(HazardFileError::invalid(&self.id, "invalid coordinate"));
        }
        let mut report = IncidentReport::new(self.id, location, severity, self.created_at)
            .with_verified(self.verified);
        if let Some(description) = self.description {
            report = report.with_description(description);
        }
        Ok(report)
    }
}

impl DisasterEntry {
    fn into_record(self) -> Result<DisasterRecord, HazardFileError> {
        let severity = parse_level(&self.id, &self.severity)?;
        let kind: DisasterKind = self
            .kind
            .parse()
            .map_err(|err| HazardFileError::invalid(&self.id, err))?;
        let centre = Coord {
            x: self.lon,
            y: self.lat,
        };
        let mut record = DisasterRecord::new(&self.id, kind, centre, self.radius_km, severity)
            .map_err(|err| HazardFileError::invalid(&self.id, err))?;
        if let Some(expires_at) = self.expires_at {
            record = record.with_expiry(expires_at);
        }
        if let Some(description) = self.description {
            record = record.with_description(description);
        }
        Ok(record)
    }
}

fn read_document(path: &Utf8Path) -> Result<String, HazardFileError> {
    let open_error = |source| HazardFileError::Open {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(open_error)?;
    let mut text = String::new();
    file.read_to_string(&mut text).map_err(open_error)?;
    Ok(text)
}

fn parse_document<T: for<'de> Deserialize<'de>>(
    path: &Utf8Path,
    text: &str,
) -> Result<T, HazardFileError> {
    serde_json::from_str(text).map_err(|source| HazardFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Hazard store backed by a JSON document loaded once at open.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use chrono::Utc;
/// use saferoute_core::HazardStore;
/// use saferoute_data::JsonHazardStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = JsonHazardStore::open(Utf8Path::new("hazards.json"))?;
/// let snapshot = store.snapshot(Utc::now())?;
/// println!("{} zones", snapshot.zones().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonHazardStore {
    path: Utf8PathBuf,
    version: Option<u64>,
    zones: Vec<RiskZone>,
    reports: Vec<IncidentReport>,
    disasters: Vec<DisasterRecord>,
}

impl JsonHazardStore {
    /// Read and validate the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HazardFileError`] when the file cannot be read, is not
    /// valid JSON, or holds an invalid active record.
    pub fn open(path: &Utf8Path) -> Result<Self, HazardFileError> {
        let text = read_document(path)?;
        let document: HazardDocument = parse_document(path, &text)?;
        let mut zones = document
            .zones
            .into_iter()
            .filter(|zone| zone.active)
            .map(ZoneEntry::into_zone)
            .collect::<Result<Vec<_>, _>>()?;
        let mut reports = Vec::with_capacity(document.reports.len());
        let mut derived = 0_usize;
        for entry in document.reports {
            let verified_at = entry.verified_at.unwrap_or(entry.created_at);
            let report = entry.into_report()?;
            if let Some(zone) = RiskZone::from_verified_report(&report, verified_at) {
                zones.push(zone);
                derived += 1;
            }
            reports.push(report);
        }
        let disasters = document
            .disasters
            .into_iter()
            .filter(|disaster| disaster.active)
            .map(DisasterEntry::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "loaded {} zones ({derived} from verified reports), {} reports and {} disasters \
             from {path}",
            zones.len(),
            reports.len(),
            disasters.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            version: document.version,
            zones,
            reports,
            disasters,
        })
    }

    /// Path the store was loaded from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl HazardStore for JsonHazardStore {
    fn snapshot(&self, now: DateTime<Utc>) -> Result<HazardSnapshot, HazardStoreError> {
        let version = self.version.unwrap_or_else(|| version_at(now));
        Ok(HazardSnapshot::new(
            version,
            self.zones.clone(),
            self.reports.clone(),
            self.disasters.clone(),
        ))
    }
}

/// Read a gazetteer from a JSON array of `{name, address?, lat, lon}`.
///
/// # Errors
///
/// Returns [`HazardFileError`] when the file cannot be read or parsed, or a
/// place has an invalid coordinate.
pub fn read_gazetteer(path: &Utf8Path) -> Result<Gazetteer, HazardFileError> {
    let text = read_document(path)?;
    let entries: Vec<PlaceEntry> = parse_document(path, &text)?;
    let places = entries
        .into_iter()
        .map(|entry| {
            let location = Coord {
                x: entry.lon,
                y: entry.lat,
            };
            if !saferoute_core::is_valid_coord(location) {
                return Err(HazardFileError::invalid(&entry.name, "invalid coordinate"));
            }
            Ok(Place {
                name: entry.name,
                address: entry.address,
                location,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Gazetteer::new(places))
}
