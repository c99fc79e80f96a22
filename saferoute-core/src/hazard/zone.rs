//! Circular risk zones.

use chrono::{DateTime, TimeDelta, Utc};
use geo::Coord;
use thiserror::Error;

use super::{CircleError, IncidentReport, validate_circle};
use crate::RiskLevel;
use crate::geodesy::distance_km;

/// Radius of zones derived from verified incident reports.
pub const AUTO_ZONE_RADIUS_KM: f64 = 0.5;
/// Lifetime of zones derived from verified incident reports.
pub const AUTO_ZONE_TTL_HOURS: i64 = 24;
/// Maximum length, in characters, of a derived zone's name.
pub const AUTO_ZONE_NAME_CHARS: usize = 50;

/// Errors returned by [`RiskZone::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskZoneError {
    /// The centre was not a finite WGS84 coordinate.
    #[error("zone {id} has an invalid centre coordinate")]
    InvalidCentre {
        /// Identifier of the rejected zone.
        id: String,
    },
    /// The radius was not finite and strictly positive.
    #[error("zone {id} radius must be finite and greater than zero")]
    InvalidRadius {
        /// Identifier of the rejected zone.
        id: String,
    },
}

/// A circular area with a fixed risk level.
///
/// Geometry and level are fixed at construction; only the active flag may be
/// toggled afterwards. A zone stops contributing once it is deactivated or
/// its expiry is reached.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use geo::Coord;
/// use saferoute_core::{RiskLevel, RiskZone};
///
/// # fn main() -> Result<(), saferoute_core::RiskZoneError> {
/// let centre = Coord { x: -106.0886, y: 28.6353 };
/// let zone = RiskZone::new("z1", "Centro", centre, 0.5, RiskLevel::High)?;
/// assert!(zone.contains(centre));
/// assert!(zone.is_live(Utc::now()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RiskZone {
    id: String,
    name: String,
    centre: Coord,
    radius_km: f64,
    level: RiskLevel,
    expires_at: Option<DateTime<Utc>>,
    active: bool,
    description: Option<String>,
}

impl RiskZone {
    /// Validate and construct an active, non-expiring zone.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        centre: Coord,
        radius_km: f64,
        level: RiskLevel,
    ) -> Result<Self, RiskZoneError> {
        let id = id.into();
        validate_circle(centre, radius_km).map_err(|err| match err {
            CircleError::Centre => RiskZoneError::InvalidCentre { id: id.clone() },
            CircleError::Radius => RiskZoneError::InvalidRadius { id: id.clone() },
        })?;
        Ok(Self {
            id,
            name: name.into(),
            centre,
            radius_km,
            level,
            expires_at: None,
            active: true,
            description: None,
        })
    }

    /// Derive a short-lived zone from a verified incident report.
    ///
    /// Only verified reports of Medium or High severity produce a zone. The
    /// zone is named after the first [`AUTO_ZONE_NAME_CHARS`] characters of
    /// the report description and expires [`AUTO_ZONE_TTL_HOURS`] after
    /// `verified_at`.
    #[must_use]
    pub fn from_verified_report(report: &IncidentReport, verified_at: DateTime<Utc>) -> Option<Self> {
        if !report.verified || !matches!(report.severity, RiskLevel::Medium | RiskLevel::High) {
            return None;
        }
        let name = report.description.as_deref().map_or_else(
            || format!("Incident {}", report.id),
            |text| text.chars().take(AUTO_ZONE_NAME_CHARS).collect(),
        );
        let zone = Self::new(
            format!("report-{}", report.id),
            name,
            report.location,
            AUTO_ZONE_RADIUS_KM,
            report.severity,
        )
        .ok()?;
        Some(zone.with_expiry(verified_at + TimeDelta::hours(AUTO_ZONE_TTL_HOURS)))
    }

    /// Set the expiry timestamp.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Attach a free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the initial activation state.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Toggle activation.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Zone identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Centre coordinate (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn centre(&self) -> Coord {
        self.centre
    }

    /// Radius in kilometres.
    #[must_use]
    pub const fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Risk level contributed by the zone.
    #[must_use]
    pub const fn level(&self) -> RiskLevel {
        self.level
    }

    /// Expiry timestamp, if the zone is time-bounded.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the zone is switched on.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the zone is active and unexpired at `now`.
    ///
    /// A zone whose expiry equals `now` has already expired.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|expiry| expiry > now)
    }

    /// Whether `point` lies within the zone, boundary included.
    #[must_use]
    pub fn contains(&self, point: Coord) -> bool {
        distance_km(self.centre, point) <= self.radius_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn centre() -> Coord {
        Coord {
            x: -106.0886,
            y: 28.6353,
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_invalid_radius(#[case] radius: f64) {
        let err = RiskZone::new("z", "zone", centre(), radius, RiskLevel::Low)
            .expect_err("invalid radius");
        assert_eq!(err, RiskZoneError::InvalidRadius { id: "z".into() });
    }

    #[rstest]
    fn rejects_invalid_centre() {
        let err = RiskZone::new("z", "zone", Coord { x: 0.0, y: 91.0 }, 1.0, RiskLevel::Low)
            .expect_err("invalid centre");
        assert!(matches!(err, RiskZoneError::InvalidCentre { .. }));
    }

    #[rstest]
    fn expiry_equal_to_now_is_expired(now: DateTime<Utc>) {
        let zone = RiskZone::new("z", "zone", centre(), 1.0, RiskLevel::High)
            .expect("zone")
            .with_expiry(now);
        assert!(!zone.is_live(now));
        assert!(zone.is_live(now - TimeDelta::seconds(1)));
    }

    #[rstest]
    fn deactivated_zone_is_not_live(now: DateTime<Utc>) {
        let mut zone = RiskZone::new("z", "zone", centre(), 1.0, RiskLevel::High).expect("zone");
        zone.set_active(false);
        assert!(!zone.is_live(now));
        zone.set_active(true);
        assert!(zone.is_live(now));
    }

    #[rstest]
    fn containment_is_inclusive_of_the_boundary() {
        let zone = RiskZone::new("z", "zone", centre(), 0.5, RiskLevel::High).expect("zone");
        let inside = Coord {
            x: -106.0890,
            y: 28.6360,
        };
        let outside = Coord {
            x: -106.0886,
            y: 28.6453,
        };
        assert!(zone.contains(inside));
        assert!(!zone.contains(outside));
    }

    #[rstest]
    #[case(RiskLevel::High, true)]
    #[case(RiskLevel::Medium, true)]
    #[case(RiskLevel::Low, false)]
    #[case(RiskLevel::Critical, false)]
    fn verified_reports_derive_zones_by_severity(
        now: DateTime<Utc>,
        #[case] severity: RiskLevel,
        #[case] expected: bool,
    ) {
        let report = IncidentReport::new("r1", centre(), severity, now)
            .with_verified(true)
            .with_description("Robo a transeúnte");
        let zone = RiskZone::from_verified_report(&report, now);
        assert_eq!(zone.is_some(), expected);
    }

    #[rstest]
    fn derived_zone_carries_report_details(now: DateTime<Utc>) {
        let long = "x".repeat(80);
        let report = IncidentReport::new("r9", centre(), RiskLevel::High, now)
            .with_verified(true)
            .with_description(long);
        let zone = RiskZone::from_verified_report(&report, now).expect("zone");
        assert_eq!(zone.id(), "report-r9");
        assert_eq!(zone.name().chars().count(), AUTO_ZONE_NAME_CHARS);
        assert_eq!(zone.radius_km(), AUTO_ZONE_RADIUS_KM);
        assert_eq!(zone.level(), RiskLevel::High);
        assert_eq!(zone.expires_at(), Some(now + TimeDelta::hours(24)));
    }

    #[rstest]
    fn unverified_reports_never_derive_zones(now: DateTime<Utc>) {
        let report = IncidentReport::new("r2", centre(), RiskLevel::High, now);
        assert!(RiskZone::from_verified_report(&report, now).is_none());
    }
}
