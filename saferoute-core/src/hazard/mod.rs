//! Hazard model: risk zones, incident reports and natural disasters.
//!
//! Records are collected into an immutable [`HazardSnapshot`] which indexes
//! zone envelopes in an R\*-tree. Snapshots are cheap to share across threads
//! and are passed explicitly to every engine that needs hazard data.

mod disaster;
mod report;
mod snapshot;
mod zone;

pub use disaster::{
    DisasterKind, DisasterRecord, DisasterRecordError, ParseDisasterKindError,
    USER_REPORTED_DISASTER_RADIUS_KM, USER_REPORTED_DISASTER_TTL_HOURS,
};
pub use report::IncidentReport;
pub use snapshot::HazardSnapshot;
pub use zone::{
    AUTO_ZONE_NAME_CHARS, AUTO_ZONE_RADIUS_KM, AUTO_ZONE_TTL_HOURS, RiskZone, RiskZoneError,
};

use geo::Coord;

use crate::geodesy::is_valid_coord;

/// Shared validation for circular hazard footprints.
fn validate_circle(centre: Coord, radius_km: f64) -> Result<(), CircleError> {
    if !is_valid_coord(centre) {
        return Err(CircleError::Centre);
    }
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(CircleError::Radius);
    }
    Ok(())
}

enum CircleError {
    Centre,
    Radius,
}
