//! Candidate route geometries returned by a routing provider.

use geo::{Coord, LineString, Rect};
use thiserror::Error;

use crate::geodesy::{distance_km, is_valid_coord};

/// Travel time assumed per kilometre when no provider route is available.
pub const FALLBACK_MINUTES_PER_KM: f64 = 3.0;

/// Errors returned by [`RouteCandidate::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteCandidateError {
    /// Fewer than two vertices were supplied.
    #[error("route geometry needs at least two vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },
    /// A vertex was not a finite WGS84 coordinate.
    #[error("route vertex {index} is not a valid coordinate")]
    InvalidVertex {
        /// Position of the offending vertex.
        index: usize,
    },
    /// Distance was negative or not finite.
    #[error("route distance must be finite and non-negative")]
    InvalidDistance,
    /// Duration was negative or not finite.
    #[error("route duration must be finite and non-negative")]
    InvalidDuration,
}

/// A candidate path between two endpoints.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use saferoute_core::RouteCandidate;
///
/// # fn main() -> Result<(), saferoute_core::RouteCandidateError> {
/// let route = RouteCandidate::new(
///     vec![Coord { x: -106.10, y: 28.60 }, Coord { x: -106.08, y: 28.64 }],
///     5.2,
///     11.0,
/// )?;
/// assert_eq!(route.coordinates(), vec![[-106.10, 28.60], [-106.08, 28.64]]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCandidate {
    geometry: LineString<f64>,
    start: Coord,
    end: Coord,
    envelope: Rect<f64>,
    distance_km: f64,
    duration_min: f64,
}

impl RouteCandidate {
    /// Validate and construct a candidate.
    pub fn new(
        vertices: Vec<Coord>,
        distance_km: f64,
        duration_min: f64,
    ) -> Result<Self, RouteCandidateError> {
        if let Some(index) = vertices.iter().position(|vertex| !is_valid_coord(*vertex)) {
            return Err(RouteCandidateError::InvalidVertex { index });
        }
        let (start, end) = match vertices.as_slice() {
            [first, .., last] => (*first, *last),
            _ => {
                return Err(RouteCandidateError::TooFewVertices {
                    count: vertices.len(),
                });
            }
        };
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(RouteCandidateError::InvalidDistance);
        }
        if !duration_min.is_finite() || duration_min < 0.0 {
            return Err(RouteCandidateError::InvalidDuration);
        }
        let envelope = bounding_rect(&vertices, start);
        Ok(Self {
            geometry: LineString::new(vertices),
            start,
            end,
            envelope,
            distance_km,
            duration_min,
        })
    }

    /// Two-vertex route along the great circle, at
    /// [`FALLBACK_MINUTES_PER_KM`].
    pub fn straight_line(origin: Coord, destination: Coord) -> Result<Self, RouteCandidateError> {
        let distance = distance_km(origin, destination);
        Self::new(
            vec![origin, destination],
            distance,
            distance * FALLBACK_MINUTES_PER_KM,
        )
    }

    /// Route geometry.
    #[must_use]
    pub const fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    /// Route vertices in travel order.
    #[must_use]
    pub fn vertices(&self) -> &[Coord] {
        &self.geometry.0
    }

    /// First vertex.
    #[must_use]
    pub const fn start(&self) -> Coord {
        self.start
    }

    /// Last vertex.
    #[must_use]
    pub const fn end(&self) -> Coord {
        self.end
    }

    /// Total distance in kilometres.
    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Total duration in minutes.
    #[must_use]
    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    /// Arithmetic mean of the first and last vertices.
    #[must_use]
    pub fn midpoint(&self) -> Coord {
        Coord {
            x: (self.start.x + self.end.x) / 2.0,
            y: (self.start.y + self.end.y) / 2.0,
        }
    }

    /// Axis-aligned bounding box of all vertices.
    #[must_use]
    pub const fn envelope(&self) -> Rect<f64> {
        self.envelope
    }

    /// Vertices as `[longitude, latitude]` pairs.
    #[must_use]
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.geometry.0.iter().map(|c| [c.x, c.y]).collect()
    }
}

fn bounding_rect(vertices: &[Coord], seed: Coord) -> Rect<f64> {
    let (min, max) = vertices.iter().fold((seed, seed), |(min, max), c| {
        (
            Coord {
                x: min.x.min(c.x),
                y: min.y.min(c.y),
            },
            Coord {
                x: max.x.max(c.x),
                y: max.y.max(c.y),
            },
        )
    });
    Rect::new(min, max)
}
