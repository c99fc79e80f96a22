//! SQLite-backed hazard store reading the `risk_zones`, `reports` and
//! `natural_disasters` tables.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use geo::Coord;
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

use crate::{DisasterRecord, HazardSnapshot, IncidentReport, RiskLevel, RiskZone};

use super::{HazardStore, HazardStoreError, version_at};

/// Timestamp layouts written by the legacy backend, tried after RFC 3339.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Error raised when reading hazards from SQLite.
#[derive(Debug, Error)]
pub enum SqliteHazardStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Generic SQLite error when reading hazard rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl From<SqliteHazardStoreError> for HazardStoreError {
    fn from(err: SqliteHazardStoreError) -> Self {
        Self::backend("sqlite", err)
    }
}

/// Read-only hazard store over a legacy SQLite database.
///
/// Rows with unknown levels or kinds, invalid geometry, or unparseable
/// timestamps are skipped with a warning.
pub struct SqliteHazardStore {
    path: PathBuf,
    connection: Connection,
}

impl fmt::Debug for SqliteHazardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteHazardStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteHazardStore {
    /// Open the database at `path` read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteHazardStoreError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteHazardStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            connection,
        })
    }

    /// Read every active zone, report and disaster.
    pub fn load(&self, now: DateTime<Utc>) -> Result<HazardSnapshot, SqliteHazardStoreError> {
        let zones = load_zones(&self.connection)?;
        let reports = load_reports(&self.connection)?;
        let disasters = load_disasters(&self.connection)?;
        log::debug!(
            "loaded {} zones, {} reports and {} disasters from {}",
            zones.len(),
            reports.len(),
            disasters.len(),
            self.path.display()
        );
        Ok(HazardSnapshot::new(version_at(now), zones, reports, disasters))
    }
}

impl HazardStore for SqliteHazardStore {
    fn snapshot(&self, now: DateTime<Utc>) -> Result<HazardSnapshot, HazardStoreError> {
        Ok(self.load(now)?)
    }
}

fn load_zones(connection: &Connection) -> Result<Vec<RiskZone>, SqliteHazardStoreError> {
    let mut statement = connection.prepare(
        "SELECT id, name, lat, lon, radius_km, level, expires_at, description \
         FROM risk_zones WHERE active = 1",
    )?;
    let mut rows = statement.query([])?;
    let mut zones = Vec::new();
    while let Some(row) = rows.next()? {
        if let Some(zone) = zone_from_row(row)? {
            zones.push(zone);
        }
    }
    Ok(zones)
}

fn zone_from_row(row: &Row<'_>) -> Result<Option<RiskZone>, rusqlite::Error> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let centre: Coord = Coord {
        x: row.get(3)?,
        y: row.get(2)?,
    };
    let radius_km: f64 = row.get(4)?;
    let level_label: String = row.get(5)?;
    let expires_at: Option<String> = row.get(6)?;
    let description: Option<String> = row.get(7)?;

    let Some(level) = parse_level("risk_zones", &id, &level_label) else {
        return Ok(None);
    };
    let Some(expires_at) = parse_optional_timestamp("risk_zones", &id, expires_at.as_deref())
    else {
        return Ok(None);
    };
    let mut zone = match RiskZone::new(id, name, centre, radius_km, level) {
        Ok(zone) => zone,
        Err(err) => {
            log::warn!("skipping risk_zones row: {err}");
            return Ok(None);
        }
    };
    if let Some(expires_at) = expires_at {
        zone = zone.with_expiry(expires_at);
    }
    if let Some(description) = description {
        zone = zone.with_description(description);
    }
    Ok(Some(zone))
}

fn load_reports(connection: &Connection) -> Result<Vec<IncidentReport>, SqliteHazardStoreError> {
    let mut statement = connection.prepare(
        "SELECT id, lat, lon, severity, verified, created_at, description \
         FROM reports WHERE status = 'active'",
    )?;
    let mut rows = statement.query([])?;
    let mut reports = Vec::new();
    while let Some(row) = rows.next()? {
        if let Some(report) = report_from_row(row)? {
            reports.push(report);
        }
    }
    Ok(reports)
}

fn report_from_row(row: &Row<'_>) -> Result<Option<IncidentReport>, rusqlite::Error> {
    let id: String = row.get(0)?;
    let location: Coord = Coord {
        x: row.get(2)?,
        y: row.get(1)?,
    };
    let severity_label: String = row.get(3)?;
    let verified: Option<i64> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let description: Option<String> = row.get(6)?;

    let Some(severity) = parse_level("reports", &id, &severity_label) else {
        return Ok(None);
    };
    let Some(created_at) = parse_timestamp("reports", &id, &created_at) else {
        return Ok(None);
    };
    let mut report = IncidentReport::new(id, location, severity, created_at)
        .with_verified(verified.is_some_and(|flag| flag != 0));
    if let Some(description) = description {
        report = report.with_description(description);
    }
    Ok(Some(report))
}

fn load_disasters(connection: &Connection) -> Result<Vec<DisasterRecord>, SqliteHazardStoreError> {
    let mut statement = connection.prepare(
        "SELECT id, type, lat, lon, radius_km, severity, description, expires_at \
         FROM natural_disasters WHERE active = 1",
    )?;
    let mut rows = statement.query([])?;
    let mut disasters = Vec::new();
    while let Some(row) = rows.next()? {
        if let Some(disaster) = disaster_from_row(row)? {
            disasters.push(disaster);
        }
    }
    Ok(disasters)
}

fn disaster_from_row(row: &Row<'_>) -> Result<Option<DisasterRecord>, rusqlite::Error> {
    let id: String = row.get(0)?;
    let kind_label: String = row.get(1)?;
    let centre: Coord = Coord {
        x: row.get(3)?,
        y: row.get(2)?,
    };
    let radius_km: f64 = row.get(4)?;
    let severity_label: String = row.get(5)?;
    let description: Option<String> = row.get(6)?;
    let expires_at: Option<String> = row.get(7)?;

    let Some(severity) = parse_level("natural_disasters", &id, &severity_label) else {
        return Ok(None);
    };
    let Some(expires_at) =
        parse_optional_timestamp("natural_disasters", &id, expires_at.as_deref())
    else {
        return Ok(None);
    };
    let kind = match kind_label.parse() {
        Ok(kind) => kind,
        Err(err) => {
            log::warn!("skipping natural_disasters row {id}: {err}");
            return Ok(None);
        }
    };
    let mut disaster = match DisasterRecord::new(id, kind, centre, radius_km, severity) {
        Ok(disaster) => disaster,
        Err(err) => {
            log::warn!("skipping natural_disasters row: {err}");
            return Ok(None);
        }
    };
    if let Some(expires_at) = expires_at {
        disaster = disaster.with_expiry(expires_at);
    }
    if let Some(description) = description {
        disaster = disaster.with_description(description);
    }
    Ok(Some(disaster))
}

fn parse_level(table: &str, id: &str, label: &str) -> Option<RiskLevel> {
    label
        .parse()
        .map_err(|err| log::warn!("skipping {table} row {id}: {err}"))
        .ok()
}

/// Outer `None` means the row must be skipped.
fn parse_optional_timestamp(
    table: &str,
    id: &str,
    value: Option<&str>,
) -> Option<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Some(None),
        Some(value) => parse_timestamp(table, id, value).map(Some),
    }
}

fn parse_timestamp(table: &str, id: &str, value: &str) -> Option<DateTime<Utc>> {
    let parsed = decode_timestamp(value.trim());
    if parsed.is_none() {
        log::warn!("skipping {table} row {id}: unrecognised timestamp {value:?}");
    }
    parsed
}

/// RFC 3339, or a naive timestamp taken as UTC.
fn decode_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
