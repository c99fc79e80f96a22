//! Facade crate for the SafeRoute advisory engine.
//!
//! This crate re-exports the core domain types and exposes the HTTP and file
//! adapters and the SQLite hazard store behind feature flags.

#![forbid(unsafe_code)]

pub use saferoute_core::{
    AdviseError, AdviseRequest, Advisory, AdvisorConfig, ClassifierConfig, DisasterKind,
    DisasterRecord, Endpoint, FallbackReason, GeocodeError, Geocoder, HazardSnapshot,
    HazardStore, HazardStoreError, IncidentReport, RiskAssessment, RiskClassifier, RiskLevel,
    RiskZone, RouteAdvisor, RouteCandidate, RouteEvaluator, RouteProviderError, RouteSelection,
    RouteSource, Router, ServiceArea, TransportEstimator, TransportMode, TransportOption,
    Warning, WarningKind,
};

#[cfg(feature = "store-sqlite")]
pub use saferoute_core::{SqliteHazardStore, SqliteHazardStoreError};

#[cfg(feature = "adapters")]
pub use saferoute_data::{
    HazardFileError, JsonHazardStore, NominatimGeocoder, NominatimGeocoderConfig, OsrmRouter,
    OsrmRouterConfig, read_gazetteer,
};
