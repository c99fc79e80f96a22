//! Errors surfaced by [`RouteAdvisor::advise`](super::RouteAdvisor::advise).

use std::fmt;

use thiserror::Error;

use crate::EstimateError;

/// Which endpoint an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EndpointRole {
    /// Route start.
    Origin,
    /// Route end.
    Destination,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
        })
    }
}

/// Errors returned by the advisor.
///
/// Routing provider timeouts and failures do not appear here; they degrade
/// to the straight-line fallback recorded in the advisory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdviseError {
    /// The request was malformed.
    #[error("invalid request: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },
    /// An endpoint resolved outside the service area.
    #[error("{endpoint} ({lat}, {lon}) is outside the service area")]
    OutOfServiceArea {
        /// Offending endpoint.
        endpoint: EndpointRole,
        /// Latitude.
        lat: f64,
        /// Longitude.
        lon: f64,
    },
    /// The destination text could not be resolved.
    #[error("destination {query:?} could not be found")]
    DestinationNotFound {
        /// Destination text as given.
        query: String,
    },
    /// The routing provider answered without any route.
    #[error("no route found between origin and destination")]
    NoRouteFound,
    /// The selected route could not be estimated.
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

impl AdviseError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
