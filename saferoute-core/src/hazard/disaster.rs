//! Natural disaster records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use geo::Coord;
use thiserror::Error;

use super::{CircleError, validate_circle};
use crate::RiskLevel;

/// Footprint radius assigned to user-reported disasters.
pub const USER_REPORTED_DISASTER_RADIUS_KM: f64 = 2.0;
/// Lifetime of user-reported disasters.
pub const USER_REPORTED_DISASTER_TTL_HOURS: i64 = 48;

/// Kind of natural disaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DisasterKind {
    /// Flooding.
    Flood,
    /// Wildfire or urban fire.
    Fire,
    /// Earthquake.
    Earthquake,
    /// Severe storm.
    Storm,
    /// Landslide.
    Landslide,
}

/// Error returned when a disaster kind is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown disaster kind {label:?}")]
pub struct ParseDisasterKindError {
    /// The label that failed to parse.
    pub label: String,
}

impl DisasterKind {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Fire => "fire",
            Self::Earthquake => "earthquake",
            Self::Storm => "storm",
            Self::Landslide => "landslide",
        }
    }

    /// Capitalised label for messages.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Flood => "Flood",
            Self::Fire => "Fire",
            Self::Earthquake => "Earthquake",
            Self::Storm => "Storm",
            Self::Landslide => "Landslide",
        }
    }
}

impl fmt::Display for DisasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisasterKind {
    type Err = ParseDisasterKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flood" => Ok(Self::Flood),
            "fire" => Ok(Self::Fire),
            "earthquake" => Ok(Self::Earthquake),
            "storm" => Ok(Self::Storm),
            "landslide" => Ok(Self::Landslide),
            _ => Err(ParseDisasterKindError {
                label: s.to_owned(),
            }),
        }
    }
}

/// Errors returned when constructing a [`DisasterRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisasterRecordError {
    /// The disaster kind was not one of the supported kinds.
    #[error(transparent)]
    UnknownKind(#[from] ParseDisasterKindError),
    /// The centre was not a finite WGS84 coordinate.
    #[error("disaster {id} has an invalid centre coordinate")]
    InvalidCentre {
        /// Identifier of the rejected record.
        id: String,
    },
    /// The radius was not finite and strictly positive.
    #[error("disaster {id} radius must be finite and greater than zero")]
    InvalidRadius {
        /// Identifier of the rejected record.
        id: String,
    },
}

/// A natural disaster affecting a circular area.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DisasterRecord {
    id: String,
    kind: DisasterKind,
    centre: Coord,
    radius_km: f64,
    severity: RiskLevel,
    description: Option<String>,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl DisasterRecord {
    /// Validate and construct an active, non-expiring record.
    pub fn new(
        id: impl Into<String>,
        kind: DisasterKind,
        centre: Coord,
        radius_km: f64,
        severity: RiskLevel,
    ) -> Result<Self, DisasterRecordError> {
        let id = id.into();
        validate_circle(centre, radius_km).map_err(|err| match err {
            CircleError::Centre => DisasterRecordError::InvalidCentre { id: id.clone() },
            CircleError::Radius => DisasterRecordError::InvalidRadius { id: id.clone() },
        })?;
        Ok(Self {
            id,
            kind,
            centre,
            radius_km,
            severity,
            description: None,
            active: true,
            expires_at: None,
        })
    }

    /// Build a record for a disaster reported by a user.
    ///
    /// The kind label must name a supported kind. The record covers
    /// [`USER_REPORTED_DISASTER_RADIUS_KM`] and expires
    /// [`USER_REPORTED_DISASTER_TTL_HOURS`] after `reported_at`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use geo::Coord;
    /// use saferoute_core::{DisasterRecord, RiskLevel};
    ///
    /// let centre = Coord { x: -106.08, y: 28.64 };
    /// let record = DisasterRecord::user_reported("d1", "flood", centre, RiskLevel::High, Utc::now())
    ///     .expect("flood is a known kind");
    /// assert_eq!(record.radius_km(), 2.0);
    /// assert!(DisasterRecord::user_reported("d2", "meteor", centre, RiskLevel::High, Utc::now()).is_err());
    /// ```
    pub fn user_reported(
        id: impl Into<String>,
        kind: &str,
        centre: Coord,
        severity: RiskLevel,
        reported_at: DateTime<Utc>,
    ) -> Result<Self, DisasterRecordError> {
        let kind = kind.parse::<DisasterKind>()?;
        let record = Self::new(id, kind, centre, USER_REPORTED_DISASTER_RADIUS_KM, severity)?;
        Ok(record.with_expiry(reported_at + TimeDelta::hours(USER_REPORTED_DISASTER_TTL_HOURS)))
    }

    /// Set the expiry timestamp.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the activation state.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Record identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Kind of disaster.
    #[must_use]
    pub const fn kind(&self) -> DisasterKind {
        self.kind
    }

    /// Centre coordinate.
    #[must_use]
    pub const fn centre(&self) -> Coord {
        self.centre
    }

    /// Radius in kilometres.
    #[must_use]
    pub const fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Reported severity.
    #[must_use]
    pub const fn severity(&self) -> RiskLevel {
        self.severity
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Expiry timestamp, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the record is active and unexpired at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|expiry| expiry > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn centre() -> Coord {
        Coord {
            x: -106.08,
            y: 28.64,
        }
    }

    #[rstest]
    #[case("flood", DisasterKind::Flood)]
    #[case("FIRE", DisasterKind::Fire)]
    #[case("earthquake", DisasterKind::Earthquake)]
    #[case("storm", DisasterKind::Storm)]
    #[case(" landslide", DisasterKind::Landslide)]
    fn parses_known_kinds(#[case] label: &str, #[case] expected: DisasterKind) {
        assert_eq!(label.parse::<DisasterKind>(), Ok(expected));
    }

    #[rstest]
    fn user_reported_records_expire_after_two_days() {
        let reported_at = Utc::now();
        let record =
            DisasterRecord::user_reported("d1", "storm", centre(), RiskLevel::Medium, reported_at)
                .expect("record");
        assert_eq!(record.kind(), DisasterKind::Storm);
        assert_eq!(record.radius_km(), USER_REPORTED_DISASTER_RADIUS_KM);
        assert_eq!(record.expires_at(), Some(reported_at + TimeDelta::hours(48)));
        assert!(record.is_live(reported_at + TimeDelta::hours(47)));
        assert!(!record.is_live(reported_at + TimeDelta::hours(48)));
    }

    #[rstest]
    fn unknown_kind_is_rejected() {
        let err = DisasterRecord::user_reported("d1", "tsunami", centre(), RiskLevel::High, Utc::now())
            .expect_err("unknown kind");
        assert!(matches!(err, DisasterRecordError::UnknownKind(_)));
    }

    #[rstest]
    fn inactive_record_is_not_live() {
        let record = DisasterRecord::new("d1", DisasterKind::Fire, centre(), 1.0, RiskLevel::High)
            .expect("record")
            .with_active(false);
        assert!(!record.is_live(Utc::now()));
    }
}
