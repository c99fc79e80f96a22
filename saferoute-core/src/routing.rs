//! Routing collaborator contract.

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

use crate::RouteCandidate;

/// Errors reported by a [`Router`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteProviderError {
    /// The provider answered but found no route between the endpoints.
    #[error("no route between the requested endpoints")]
    NoRoute,

    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// URL that was requested.
        url: String,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },

    /// Connection-level failure.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// URL that was requested.
        url: String,
        /// Error detail.
        message: String,
    },

    /// The provider reported an application-level error code.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Provider status code.
        code: String,
        /// Provider message.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Error detail.
        message: String,
    },
}

/// Produces candidate routes between two coordinates.
///
/// A successful call returns at least one candidate; an empty result must be
/// reported as [`RouteProviderError::NoRoute`].
#[async_trait]
pub trait Router: Send + Sync {
    /// Candidate routes from `origin` to `destination`, best first.
    async fn route(
        &self,
        origin: Coord,
        destination: Coord,
    ) -> Result<Vec<RouteCandidate>, RouteProviderError>;
}

#[async_trait]
impl<T: Router + ?Sized> Router for Box<T> {
    async fn route(
        &self,
        origin: Coord,
        destination: Coord,
    ) -> Result<Vec<RouteCandidate>, RouteProviderError> {
        (**self).route(origin, destination).await
    }
}
