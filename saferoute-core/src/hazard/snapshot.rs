//! Immutable, versioned collection of hazard records.

use std::fmt;

use geo::Coord;
use rstar::{AABB, RTree, RTreeObject};

use super::{DisasterRecord, IncidentReport, RiskZone};

/// Kilometres per degree of latitude, rounded down so envelopes over-cover.
const KM_PER_DEGREE: f64 = 110.0;
/// Lower bound on `cos(latitude)` to keep polar envelopes finite.
const MIN_LONGITUDE_SCALE: f64 = 1e-6;
/// Relative padding added to every envelope.
const ENVELOPE_PADDING: f64 = 1.01;

/// R\*-tree entry pointing back at a zone by its position in the snapshot.
#[derive(Debug, Clone, Copy)]
struct ZoneEnvelope {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Degree-space box that fully covers a zone's great-circle disc.
fn zone_envelope(zone: &RiskZone) -> AABB<[f64; 2]> {
    let centre = zone.centre();
    let lat_delta = zone.radius_km() / KM_PER_DEGREE * ENVELOPE_PADDING;
    let widest_lat = (centre.y.abs() + lat_delta).min(90.0);
    let lon_scale = widest_lat.to_radians().cos().max(MIN_LONGITUDE_SCALE);
    let lon_delta = (zone.radius_km() / (KM_PER_DEGREE * lon_scale) * ENVELOPE_PADDING).min(360.0);
    AABB::from_corners(
        [centre.x - lon_delta, centre.y - lat_delta],
        [centre.x + lon_delta, centre.y + lat_delta],
    )
}

/// Hazard records captured at a point in time.
///
/// The snapshot never changes once built, so a single instance can be shared
/// between concurrent requests (for example behind an `Arc`). Zones keep the
/// order they were supplied in; "first seen" tie-breaks elsewhere refer to
/// that order.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use saferoute_core::{HazardSnapshot, RiskLevel, RiskZone};
///
/// # fn main() -> Result<(), saferoute_core::RiskZoneError> {
/// let centre = Coord { x: -106.0886, y: 28.6353 };
/// let zone = RiskZone::new("z1", "Centro", centre, 0.5, RiskLevel::High)?;
/// let snapshot = HazardSnapshot::new(1, vec![zone], Vec::new(), Vec::new());
/// assert_eq!(snapshot.zone_candidates(centre).count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HazardSnapshot {
    version: u64,
    zones: Vec<RiskZone>,
    reports: Vec<IncidentReport>,
    disasters: Vec<DisasterRecord>,
    index: RTree<ZoneEnvelope>,
}

impl fmt::Debug for HazardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HazardSnapshot")
            .field("version", &self.version)
            .field("zones", &self.zones.len())
            .field("reports", &self.reports.len())
            .field("disasters", &self.disasters.len())
            .finish_non_exhaustive()
    }
}

impl HazardSnapshot {
    /// Build a snapshot and index its zones.
    #[must_use]
    pub fn new(
        version: u64,
        zones: Vec<RiskZone>,
        reports: Vec<IncidentReport>,
        disasters: Vec<DisasterRecord>,
    ) -> Self {
        let entries = zones
            .iter()
            .enumerate()
            .map(|(slot, zone)| ZoneEnvelope {
                slot,
                envelope: zone_envelope(zone),
            })
            .collect();
        Self {
            version,
            zones,
            reports,
            disasters,
            index: RTree::bulk_load(entries),
        }
    }

    /// A snapshot without any hazards.
    #[must_use]
    pub fn empty(version: u64) -> Self {
        Self::new(version, Vec::new(), Vec::new(), Vec::new())
    }

    /// Version stamp supplied by the store.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// All zones in snapshot order.
    #[must_use]
    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    /// All incident reports.
    #[must_use]
    pub fn reports(&self) -> &[IncidentReport] {
        &self.reports
    }

    /// All disaster records.
    #[must_use]
    pub fn disasters(&self) -> &[DisasterRecord] {
        &self.disasters
    }

    /// Zones whose envelope covers `point`, in snapshot order.
    ///
    /// This is a coarse filter: callers still check the exact great-circle
    /// distance and the zone's liveness.
    pub fn zone_candidates(&self, point: Coord) -> impl Iterator<Item = &RiskZone> + '_ {
        let mut slots: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .map(|entry| entry.slot)
            .collect();
        slots.sort_unstable();
        slots.into_iter().filter_map(|slot| self.zones.get(slot))
    }
}
