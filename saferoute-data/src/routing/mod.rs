//! OSRM-backed [`saferoute_core::Router`].
//!
//! [`OsrmRouter`] asks the OSRM Route service for the driving route between
//! two coordinates plus its alternatives, with full GeoJSON geometry, and
//! converts each returned route into a [`saferoute_core::RouteCandidate`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use saferoute_core::Router;
//! use saferoute_data::routing::{OsrmRouter, OsrmRouterConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OsrmRouterConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-app/1.0");
//! let router = OsrmRouter::with_config(config)?;
//!
//! let origin = Coord { x: -106.0886, y: 28.6353 };
//! let destination = Coord { x: -106.0772, y: 28.6353 };
//! let candidates = router.route(origin, destination).await?;
//! println!("{} candidate routes", candidates.len());
//! # Ok(())
//! # }
//! ```

mod osrm;
mod provider;

pub use provider::{DEFAULT_USER_AGENT, OsrmRouter, OsrmRouterConfig};
