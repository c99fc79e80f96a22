//! Point risk classification.
//!
//! A point's level is the highest level contributed by live zones that
//! contain it and by severe verified incidents nearby. A dense cluster of
//! nearby incidents lifts an otherwise Low point to Medium.

use chrono::{DateTime, TimeDelta, Utc};
use geo::Coord;

use crate::geodesy::distance_km;
use crate::{HazardSnapshot, RiskLevel, RiskZone};

/// Distance within which verified incidents count towards a point.
pub const DEFAULT_INCIDENT_RADIUS_KM: f64 = 0.5;
/// Trailing window, in days, for incidents to count.
pub const DEFAULT_INCIDENT_WINDOW_DAYS: i64 = 7;
/// Nearby incident count that escalates a Low point to Medium.
pub const DEFAULT_DENSITY_THRESHOLD: usize = 5;

/// Tunables for [`RiskClassifier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Radius around the point within which incidents are counted.
    pub incident_radius_km: f64,
    /// Incidents older than `now - incident_window` are ignored.
    pub incident_window: TimeDelta,
    /// Nearby incident count at which a Low point becomes Medium.
    pub density_threshold: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            incident_radius_km: DEFAULT_INCIDENT_RADIUS_KM,
            incident_window: TimeDelta::days(DEFAULT_INCIDENT_WINDOW_DAYS),
            density_threshold: DEFAULT_DENSITY_THRESHOLD,
        }
    }
}

impl ClassifierConfig {
    /// Set the incident radius.
    #[must_use]
    pub fn with_incident_radius_km(mut self, radius_km: f64) -> Self {
        self.incident_radius_km = radius_km;
        self
    }

    /// Set the incident window.
    #[must_use]
    pub fn with_incident_window(mut self, window: TimeDelta) -> Self {
        self.incident_window = window;
        self
    }

    /// Set the density threshold.
    #[must_use]
    pub fn with_density_threshold(mut self, threshold: usize) -> Self {
        self.density_threshold = threshold;
        self
    }
}

/// Classification of a single point with its supporting evidence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RiskAssessment {
    /// Resulting level.
    pub level: RiskLevel,
    /// Highest-level live zone containing the point; the first one wins ties.
    pub dominant_zone: Option<RiskZone>,
    /// Number of live zones containing the point.
    pub zone_matches: usize,
    /// Verified incidents inside the window and radius.
    pub nearby_incidents: usize,
    /// Whether incident density lifted the level from Low to Medium.
    pub density_escalated: bool,
}

/// Classifies points against a [`HazardSnapshot`].
///
/// Classification is a pure function of its inputs, so one classifier can be
/// shared between threads.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use geo::Coord;
/// use saferoute_core::{HazardSnapshot, RiskClassifier, RiskLevel, RiskZone};
///
/// # fn main() -> Result<(), saferoute_core::RiskZoneError> {
/// let zone = RiskZone::new(
///     "centro",
///     "Centro",
///     Coord { x: -106.0886, y: 28.6353 },
///     0.5,
///     RiskLevel::High,
/// )?;
/// let snapshot = HazardSnapshot::new(1, vec![zone], Vec::new(), Vec::new());
/// let classifier = RiskClassifier::default();
/// let point = Coord { x: -106.0890, y: 28.6360 };
/// assert_eq!(classifier.classify(point, &snapshot, Utc::now()), RiskLevel::High);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier {
    config: ClassifierConfig,
}

impl RiskClassifier {
    /// Create a classifier with explicit tunables.
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Risk level at `point`.
    #[must_use]
    pub fn classify(&self, point: Coord, snapshot: &HazardSnapshot, now: DateTime<Utc>) -> RiskLevel {
        self.assess(point, snapshot, now).level
    }

    /// Risk level at `point` together with the evidence behind it.
    #[must_use]
    pub fn assess(
        &self,
        point: Coord,
        snapshot: &HazardSnapshot,
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let mut dominant: Option<&RiskZone> = None;
        let mut zone_matches = 0;
        for zone in snapshot
            .zone_candidates(point)
            .filter(|zone| zone.is_live(now) && zone.contains(point))
        {
            zone_matches += 1;
            if dominant.is_none_or(|current| zone.level() > current.level()) {
                dominant = Some(zone);
            }
        }

        let mut level = dominant.map_or(RiskLevel::Low, RiskZone::level);

        let window_start = now - self.config.incident_window;
        let mut nearby_incidents = 0;
        for report in snapshot.reports().iter().filter(|report| {
            report.verified
                && report.created_at > window_start
                && distance_km(report.location, point) <= self.config.incident_radius_km
        }) {
            nearby_incidents += 1;
            if report.severity >= RiskLevel::High {
                level = level.max(RiskLevel::High);
            }
        }

        let density_escalated =
            level == RiskLevel::Low && nearby_incidents >= self.config.density_threshold;
        if density_escalated {
            level = RiskLevel::Medium;
        }

        RiskAssessment {
            level,
            dominant_zone: dominant.cloned(),
            zone_matches,
            nearby_incidents,
            density_escalated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IncidentReport;
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

    fn zone(id: &str, radius_km: f64, level: RiskLevel) -> RiskZone {
        RiskZone::new(id, id, centre(), radius_km, level).expect("zone")
    }

    fn reports(count: usize, severity: RiskLevel, created_at: DateTime<Utc>) -> Vec<IncidentReport> {
        (0..count)
            .map(|i| {
                IncidentReport::new(format!("r{i}"), centre(), severity, created_at)
                    .with_verified(true)
            })
            .collect()
    }

    #[rstest]
    fn nothing_nearby_is_low(now: DateTime<Utc>) {
        let assessment = RiskClassifier::default().assess(centre(), &HazardSnapshot::empty(1), now);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert_eq!(assessment.zone_matches, 0);
        assert!(assessment.dominant_zone.is_none());
    }

    #[rstest]
    fn highest_level_wins_regardless_of_distance(now: DateTime<Utc>) {
        let snapshot = HazardSnapshot::new(
            1,
            vec![
                zone("near-medium", 0.2, RiskLevel::Medium),
                zone("wide-critical", 5.0, RiskLevel::Critical),
                zone("other-critical", 3.0, RiskLevel::Critical),
            ],
            Vec::new(),
            Vec::new(),
        );
        let assessment = RiskClassifier::default().assess(centre(), &snapshot, now);
        assert_eq!(assessment.level, RiskLevel::Critical);
        assert_eq!(assessment.zone_matches, 3);
        let dominant = assessment.dominant_zone.expect("dominant zone");
        assert_eq!(dominant.id(), "wide-critical");
    }

    #[rstest]
    fn expired_and_inactive_zones_are_ignored(now: DateTime<Utc>) {
        let snapshot = HazardSnapshot::new(
            1,
            vec![
                zone("expired", 1.0, RiskLevel::Critical).with_expiry(now),
                zone("off", 1.0, RiskLevel::High).with_active(false),
                zone("future", 1.0, RiskLevel::Medium).with_expiry(now + TimeDelta::hours(1)),
            ],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(
            RiskClassifier::default().classify(centre(), &snapshot, now),
            RiskLevel::Medium
        );
    }

    #[rstest]
    fn severe_recent_incident_contributes_high(now: DateTime<Utc>) {
        let snapshot = HazardSnapshot::new(
            1,
            vec![zone("medium", 1.0, RiskLevel::Medium)],
            reports(1, RiskLevel::High, now - TimeDelta::days(1)),
            Vec::new(),
        );
        assert_eq!(
            RiskClassifier::default().classify(centre(), &snapshot, now),
            RiskLevel::High
        );
    }

    #[rstest]
    #[case(4, RiskLevel::Low, false)]
    #[case(5, RiskLevel::Medium, true)]
    #[case(9, RiskLevel::Medium, true)]
    fn incident_density_escalates_low_points(
        now: DateTime<Utc>,
        #[case] count: usize,
        #[case] expected: RiskLevel,
        #[case] escalated: bool,
    ) {
        let snapshot = HazardSnapshot::new(
            1,
            Vec::new(),
            reports(count, RiskLevel::Low, now - TimeDelta::hours(2)),
            Vec::new(),
        );
        let assessment = RiskClassifier::default().assess(centre(), &snapshot, now);
        assert_eq!(assessment.level, expected);
        assert_eq!(assessment.density_escalated, escalated);
        assert_eq!(assessment.nearby_incidents, count);
    }

    #[rstest]
    fn density_does_not_lift_points_already_above_low(now: DateTime<Utc>) {
        let snapshot = HazardSnapshot::new(
            1,
            vec![zone("medium", 1.0, RiskLevel::Medium)],
            reports(8, RiskLevel::Low, now - TimeDelta::hours(2)),
            Vec::new(),
        );
        let assessment = RiskClassifier::default().assess(centre(), &snapshot, now);
        assert_eq!(assessment.level, RiskLevel::Medium);
        assert!(!assessment.density_escalated);
    }

    #[rstest]
    fn stale_and_unverified_incidents_are_ignored(now: DateTime<Utc>) {
        let mut stale = reports(6, RiskLevel::High, now - TimeDelta::days(7));
        stale.push(IncidentReport::new("pending", centre(), RiskLevel::High, now));
        let snapshot = HazardSnapshot::new(1, Vec::new(), stale, Vec::new());
        let assessment = RiskClassifier::default().assess(centre(), &snapshot, now);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert_eq!(assessment.nearby_incidents, 0);
    }

    #[rstest]
    fn configuration_overrides_apply(now: DateTime<Utc>) {
        let config = ClassifierConfig::default()
            .with_density_threshold(2)
            .with_incident_window(TimeDelta::days(30))
            .with_incident_radius_km(1.0);
        let snapshot = HazardSnapshot::new(
            1,
            Vec::new(),
            reports(2, RiskLevel::Low, now - TimeDelta::days(20)),
            Vec::new(),
        );
        assert_eq!(
            RiskClassifier::new(config).classify(centre(), &snapshot, now),
            RiskLevel::Medium
        );
    }
}
