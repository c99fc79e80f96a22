//! Core domain types and engines for SafeRoute.
//!
//! The crate turns hazard data (risk zones, verified incident reports and
//! natural disasters) into per-point risk classifications, scores candidate
//! route geometries against those classifications, and assembles a route
//! advisory with per-transport-mode estimates.
//!
//! Boundaries:
//! - Geocoding and routing are collaborator traits ([`Geocoder`],
//!   [`Router`]); HTTP adapters live in `saferoute-data`.
//! - Hazard data arrives as an immutable, versioned [`HazardSnapshot`] that
//!   callers pass explicitly. The engines never mutate shared state.
//!
//! Coordinates use WGS84 [`geo::Coord`] values with `x = longitude` and
//! `y = latitude`.

pub mod advisor;
pub mod classify;
pub mod evaluate;
pub mod geocode;
pub mod geodesy;
pub mod hazard;
pub mod resolve;
pub mod risk;
pub mod route;
pub mod routing;
pub mod store;
pub mod transport;
pub mod warnings;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use advisor::{
    AdviseError, AdviseRequest, Advisory, AdvisorConfig, Endpoint, EndpointRole, FallbackReason,
    RouteAdvisor, RouteSource,
};
pub use classify::{ClassifierConfig, RiskAssessment, RiskClassifier};
pub use evaluate::{DEFAULT_SAMPLING_STRIDE, EvaluateError, RouteEvaluator, RouteSelection};
pub use geocode::{GeocodeError, Geocoder};
pub use geodesy::{ServiceArea, distance_km, is_valid_coord};
pub use hazard::{
    DisasterKind, DisasterRecord, DisasterRecordError, HazardSnapshot, IncidentReport, RiskZone,
    RiskZoneError,
};
pub use resolve::{
    Gazetteer, GazetteerResolver, GeocoderResolver, LiteralResolver, Place, ResolveError,
    Resolver, ResolverChain,
};
pub use risk::{ParseRiskLevelError, RiskLevel};
pub use route::{RouteCandidate, RouteCandidateError};
pub use routing::{RouteProviderError, Router};
pub use store::{HazardStore, HazardStoreError};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteHazardStore, SqliteHazardStoreError};
pub use transport::{
    EstimateError, RiskMultipliers, TransportEstimator, TransportMode, TransportOption,
};
pub use warnings::{Warning, WarningKind, assemble_warnings};
