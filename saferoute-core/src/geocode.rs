//! Geocoding collaborator contract.

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

/// Errors reported by a [`Geocoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// No result, or only results outside the service area.
    #[error("no geocoding match for {query:?}")]
    NotFound {
        /// The text or coordinate that was looked up.
        query: String,
    },
    /// The provider did not answer in time.
    #[error("geocoding request timed out after {timeout_secs}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// Any other provider failure.
    #[error("geocoding provider failed: {message}")]
    Provider {
        /// Failure detail.
        message: String,
    },
}

/// Resolves free text to coordinates and coordinates to labels.
///
/// Implementations query with a regional hint and report results outside
/// the service area as [`GeocodeError::NotFound`].
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use geo::Coord;
/// use saferoute_core::{GeocodeError, Geocoder};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Geocoder for Fixed {
///     async fn resolve(&self, query: &str) -> Result<Coord, GeocodeError> {
///         match query {
///             "Catedral" => Ok(Coord { x: -106.0772, y: 28.6353 }),
///             _ => Err(GeocodeError::NotFound { query: query.to_owned() }),
///         }
///     }
///
///     async fn reverse_resolve(&self, _location: Coord) -> Result<String, GeocodeError> {
///         Ok("Centro".to_owned())
///     }
/// }
/// ```
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up the coordinate for `query`.
    async fn resolve(&self, query: &str) -> Result<Coord, GeocodeError>;

    /// Produce a human label for `location`.
    async fn reverse_resolve(&self, location: Coord) -> Result<String, GeocodeError>;
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Box<T> {
    async fn resolve(&self, query: &str) -> Result<Coord, GeocodeError> {
        (**self).resolve(query).await
    }

    async fn reverse_resolve(&self, location: Coord) -> Result<String, GeocodeError> {
        (**self).reverse_resolve(location).await
    }
}
