//! Advisory request and response types.

use geo::Coord;

use crate::{RiskLevel, TransportOption, Warning};

/// Travel request as given by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdviseRequest {
    /// Origin text; blank or absent means the default origin.
    #[cfg_attr(feature = "serde", serde(default))]
    pub origin: Option<String>,
    /// Destination text.
    pub destination: String,
    /// Whether to score candidates and prefer the least risky one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub avoid_risk: bool,
}

impl AdviseRequest {
    /// Request a route to `destination` from the default origin.
    #[must_use]
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            origin: None,
            destination: destination.into(),
            avoid_risk: false,
        }
    }

    /// Set the origin text.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Toggle risk avoidance.
    #[must_use]
    pub fn with_avoid_risk(mut self, avoid_risk: bool) -> Self {
        self.avoid_risk = avoid_risk;
        self
    }
}

/// A resolved route endpoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Endpoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Human label.
    pub label: String,
}

impl Endpoint {
    pub(crate) fn new(coord: Coord, label: impl Into<String>) -> Self {
        Self {
            lat: coord.y,
            lon: coord.x,
            label: label.into(),
        }
    }

    /// Position as a [`Coord`].
    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Why the straight-line fallback was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FallbackReason {
    /// The router did not answer in time.
    Timeout,
    /// The router failed.
    ProviderError,
}

/// Where the advised route geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum RouteSource {
    /// The routing provider.
    Provider,
    /// A straight line between the endpoints.
    Fallback {
        /// Why the provider was not used.
        reason: FallbackReason,
    },
}

/// The complete answer to an [`AdviseRequest`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Advisory {
    /// Resolved origin.
    pub origin: Endpoint,
    /// Resolved destination.
    pub destination: Endpoint,
    /// Risk of the selected route.
    pub risk_level: RiskLevel,
    /// Score of the selected route, when candidates were scored.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub risk_score: Option<u32>,
    /// Route length in kilometres.
    pub distance_km: f64,
    /// Route duration in minutes.
    pub duration_min: f64,
    /// Per-mode estimates.
    pub transport_options: Vec<TransportOption>,
    /// Route vertices as `[lon, lat]` pairs.
    pub route_geometry: Vec<[f64; 2]>,
    /// Provenance of the route.
    pub route_source: RouteSource,
    /// Cautions for the traveller.
    pub warnings: Vec<Warning>,
    /// Echo of the request flag.
    pub avoid_risk: bool,
    /// Version of the hazard snapshot used.
    pub snapshot_version: u64,
}
