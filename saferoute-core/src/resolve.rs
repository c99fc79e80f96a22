//! Endpoint resolution: turning user text into coordinates.
//!
//! A [`ResolverChain`] tries each [`Resolver`] in order and returns the first
//! success. The default chain is literal `"lat, lon"` parsing, then a local
//! [`Gazetteer`], then the remote [`Geocoder`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

use crate::geodesy::is_valid_coord;
use crate::{GeocodeError, Geocoder, ServiceArea};

/// Errors reported while resolving an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The resolver has no match for the text.
    #[error("no match for {query:?}")]
    NotFound {
        /// Text that was looked up.
        query: String,
    },
    /// The text is a literal coordinate outside the WGS84 numeric range.
    #[error("{text:?} is not a valid latitude/longitude pair")]
    InvalidCoordinate {
        /// The offending text.
        text: String,
    },
    /// A remote lookup did not finish in time.
    #[error("{resolver} lookup timed out after {timeout_secs}s")]
    Timeout {
        /// Name of the resolver that timed out.
        resolver: &'static str,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// A remote lookup failed.
    #[error("{resolver} lookup failed: {message}")]
    Provider {
        /// Name of the failing resolver.
        resolver: &'static str,
        /// Failure detail.
        message: String,
    },
}

/// One step of endpoint resolution.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Resolve `text` to a coordinate.
    async fn resolve(&self, text: &str) -> Result<Coord, ResolveError>;
}

/// Parses `"lat, lon"` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralResolver;

impl LiteralResolver {
    /// Parse `text` as a literal coordinate.
    ///
    /// Returns `Ok(None)` when the text is not of the form `"lat, lon"`, and
    /// [`ResolveError::InvalidCoordinate`] when it is but the numbers fall
    /// outside the WGS84 range.
    ///
    /// # Examples
    ///
    /// ```
    /// use geo::Coord;
    /// use saferoute_core::LiteralResolver;
    ///
    /// let parsed = LiteralResolver::parse("28.6353, -106.0886").expect("in range");
    /// assert_eq!(parsed, Some(Coord { x: -106.0886, y: 28.6353 }));
    /// assert_eq!(LiteralResolver::parse("Plaza de Armas"), Ok(None));
    /// assert!(LiteralResolver::parse("128.0, -106.0").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Option<Coord>, ResolveError> {
        let Some((lat, lon)) = text.split_once(',') else {
            return Ok(None);
        };
        if lon.contains(',') {
            return Ok(None);
        }
        let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) else {
            return Ok(None);
        };
        let coord = Coord { x: lon, y: lat };
        if is_valid_coord(coord) {
            Ok(Some(coord))
        } else {
            Err(ResolveError::InvalidCoordinate {
                text: text.to_owned(),
            })
        }
    }
}

#[async_trait]
impl Resolver for LiteralResolver {
    fn name(&self) -> &'static str {
        "literal"
    }

    async fn resolve(&self, text: &str) -> Result<Coord, ResolveError> {
        Self::parse(text)?.ok_or_else(|| ResolveError::NotFound {
            query: text.to_owned(),
        })
    }
}

/// A known place in the local gazetteer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place {
    /// Display name.
    pub name: String,
    /// Street address, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: Option<String>,
    /// Position (`x = longitude`, `y = latitude`).
    pub location: Coord,
}

/// Local list of known places matched by substring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gazetteer {
    places: Vec<Place>,
}

impl Gazetteer {
    /// Build a gazetteer from places; lookup order follows input order.
    #[must_use]
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    /// All places.
    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Number of places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Whether the gazetteer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// First place whose name or address contains `text`, ignoring case.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<&Place> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.places.iter().find(|place| {
            place.name.to_lowercase().contains(&needle)
                || place
                    .address
                    .as_deref()
                    .is_some_and(|address| address.to_lowercase().contains(&needle))
        })
    }
}

/// Resolves text against a shared [`Gazetteer`].
#[derive(Debug, Clone)]
pub struct GazetteerResolver {
    gazetteer: Arc<Gazetteer>,
}

impl GazetteerResolver {
    /// Wrap a gazetteer.
    #[must_use]
    pub const fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self { gazetteer }
    }
}

#[async_trait]
impl Resolver for GazetteerResolver {
    fn name(&self) -> &'static str {
        "gazetteer"
    }

    async fn resolve(&self, text: &str) -> Result<Coord, ResolveError> {
        self.gazetteer
            .lookup(text)
            .map(|place| place.location)
            .ok_or_else(|| ResolveError::NotFound {
                query: text.to_owned(),
            })
    }
}

/// Resolves text through a remote [`Geocoder`] under a timeout.
///
/// Results outside the service area are reported as not found.
pub struct GeocoderResolver<G> {
    geocoder: Arc<G>,
    timeout: Duration,
    area: ServiceArea,
}

impl<G> GeocoderResolver<G> {
    /// Wrap a shared geocoder.
    #[must_use]
    pub const fn new(geocoder: Arc<G>, timeout: Duration, area: ServiceArea) -> Self {
        Self {
            geocoder,
            timeout,
            area,
        }
    }
}

#[async_trait]
impl<G: Geocoder> Resolver for GeocoderResolver<G> {
    fn name(&self) -> &'static str {
        "geocoder"
    }

    async fn resolve(&self, text: &str) -> Result<Coord, ResolveError> {
        let timeout_secs = self.timeout.as_secs();
        let outcome = tokio::time::timeout(self.timeout, self.geocoder.resolve(text))
            .await
            .map_err(|_| ResolveError::Timeout {
                resolver: self.name(),
                timeout_secs,
            })?;
        match outcome {
            Ok(coord) if self.area.contains(coord) => Ok(coord),
            Ok(coord) => {
                log::debug!("geocoder match for {text:?} at {coord:?} is outside the service area");
                Err(ResolveError::NotFound {
                    query: text.to_owned(),
                })
            }
            Err(GeocodeError::NotFound { query }) => Err(ResolveError::NotFound { query }),
            Err(GeocodeError::Timeout { timeout_secs }) => Err(ResolveError::Timeout {
                resolver: self.name(),
                timeout_secs,
            }),
            Err(GeocodeError::Provider { message }) => Err(ResolveError::Provider {
                resolver: self.name(),
                message,
            }),
        }
    }
}

/// Ordered list of resolvers; the first success wins.
///
/// An [`ResolveError::InvalidCoordinate`] stops the chain, since later
/// resolvers would only reinterpret malformed coordinates as place names.
/// Otherwise the last error is returned when every resolver fails.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver.
    #[must_use]
    pub fn with(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Names of the resolvers, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|resolver| resolver.name()).collect()
    }
}

#[async_trait]
impl Resolver for ResolverChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn resolve(&self, text: &str) -> Result<Coord, ResolveError> {
        let mut last_error = ResolveError::NotFound {
            query: text.to_owned(),
        };
        for resolver in &self.resolvers {
            match resolver.resolve(text).await {
                Ok(coord) => {
                    log::debug!("{} resolved {text:?} to {coord:?}", resolver.name());
                    return Ok(coord);
                }
                Err(err @ ResolveError::InvalidCoordinate { .. }) => return Err(err),
                Err(err) => {
                    log::debug!("{} could not resolve {text:?}: {err}", resolver.name());
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}
