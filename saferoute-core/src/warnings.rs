//! Advisory warnings derived from the route risk and the hazard snapshot.

use chrono::{DateTime, Utc};
use geo::{Coord, Intersects, Rect};

use crate::geodesy::distance_km;
use crate::{DisasterRecord, HazardSnapshot, RiskLevel, RiskZone};

/// What a [`Warning`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WarningKind {
    /// The route as a whole is risky.
    Risk,
    /// A severe zone lies along the route.
    Zone,
    /// A natural disaster reaches the route.
    Disaster,
}

/// A human-readable caution attached to an advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    /// Warning category.
    pub kind: WarningKind,
    /// Message for the traveller.
    pub message: String,
    /// Severity of the underlying hazard.
    pub severity: RiskLevel,
}

/// Build the warnings for a route.
///
/// Order: a route-risk warning when `route_risk` is High or Critical; then
/// one warning per live High/Critical zone centred inside `envelope`, by
/// level descending and snapshot order within a level; then one Critical
/// warning per live disaster whose circle reaches `envelope`.
#[must_use]
pub fn assemble_warnings(
    route_risk: RiskLevel,
    envelope: &Rect<f64>,
    snapshot: &HazardSnapshot,
    now: DateTime<Utc>,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if route_risk.is_severe() {
        warnings.push(Warning {
            kind: WarningKind::Risk,
            message: format!("This route passes through a {route_risk} risk area"),
            severity: route_risk,
        });
    }

    let mut zones: Vec<&RiskZone> = snapshot
        .zones()
        .iter()
        .filter(|zone| {
            zone.is_live(now) && zone.level().is_severe() && envelope.intersects(&zone.centre())
        })
        .collect();
    // Stable sort keeps snapshot order within a level.
    zones.sort_by(|a, b| b.level().cmp(&a.level()));
    warnings.extend(zones.into_iter().map(|zone| Warning {
        kind: WarningKind::Zone,
        message: format!("Route crosses {} ({} risk)", zone.name(), zone.level()),
        severity: zone.level(),
    }));

    warnings.extend(
        snapshot
            .disasters()
            .iter()
            .filter(|disaster| disaster.is_live(now) && reaches(disaster, envelope))
            .map(|disaster| Warning {
                kind: WarningKind::Disaster,
                message: disaster_message(disaster),
                severity: RiskLevel::Critical,
            }),
    );

    warnings
}

/// Whether the disaster circle touches the envelope, measured from the
/// envelope point closest to the disaster centre.
fn reaches(disaster: &DisasterRecord, envelope: &Rect<f64>) -> bool {
    let centre = disaster.centre();
    let min = envelope.min();
    let max = envelope.max();
    let nearest = Coord {
        x: centre.x.clamp(min.x, max.x),
        y: centre.y.clamp(min.y, max.y),
    };
    distance_km(centre, nearest) <= disaster.radius_km()
}

fn disaster_message(disaster: &DisasterRecord) -> String {
    match disaster.description() {
        Some(description) if !description.trim().is_empty() => {
            format!("{}: {}", disaster.kind().title(), description.trim())
        }
        _ => format!("{} reported near the route", disaster.kind().title()),
    }
}
