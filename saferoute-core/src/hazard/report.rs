//! Incident reports submitted by users.

use chrono::{DateTime, Utc};
use geo::Coord;

use crate::RiskLevel;

/// The risk-relevant subset of a user-submitted incident report.
///
/// Only verified reports contribute to classification, and only while they
/// fall inside the classifier's trailing window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IncidentReport {
    /// Report identifier.
    pub id: String,
    /// Reported position (`x = longitude`, `y = latitude`).
    pub location: Coord,
    /// Severity assigned by the reporter.
    pub severity: RiskLevel,
    /// Whether a moderator has verified the report.
    pub verified: bool,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Free-text description.
    pub description: Option<String>,
}

impl IncidentReport {
    /// Construct an unverified report without a description.
    pub fn new(
        id: impl Into<String>,
        location: Coord,
        severity: RiskLevel,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            location,
            severity,
            verified: false,
            created_at,
            description: None,
        }
    }

    /// Set the verification flag.
    #[must_use]
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
