//! Adapters that connect SafeRoute to the outside world.
//!
//! Responsibilities:
//! - Implement [`saferoute_core::Router`] over the OSRM route service.
//! - Implement [`saferoute_core::Geocoder`] over Nominatim search and reverse.
//! - Load hazard snapshots and gazetteers from JSON documents.
//!
//! Boundaries:
//! - Do not encode domain rules (those live in `saferoute-core`).
//! - Keep blocking file I/O out of async request paths.
//!
//! Invariants:
//! - Thread-safe by default; adapters are `Send + Sync`.
//! - No global mutable state.

mod client;
pub mod geocoding;
pub mod hazards;
pub mod routing;

pub use client::ProviderBuildError;
pub use geocoding::{NominatimGeocoder, NominatimGeocoderConfig};
pub use hazards::{HazardFileError, JsonHazardStore, read_gazetteer};
pub use routing::{DEFAULT_USER_AGENT, OsrmRouter, OsrmRouterConfig};
