//! Great-circle distances and the service bounding box.

use geo::{Coord, Distance, Haversine, Intersects, Point, Rect};

/// Great-circle distance between two WGS84 coordinates in kilometres.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use saferoute_core::distance_km;
///
/// let a = Coord { x: -106.0886, y: 28.6353 };
/// assert_eq!(distance_km(a, a), 0.0);
/// ```
#[must_use]
pub fn distance_km(from: Coord, to: Coord) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to)) / 1000.0
}

/// Whether a coordinate is finite and inside the WGS84 numeric range.
#[must_use]
pub fn is_valid_coord(coord: Coord) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

/// Axis-aligned latitude/longitude box the service operates in.
///
/// Containment includes the boundary. The default covers the Chihuahua
/// metropolitan area (latitude 28 to 29, longitude -107 to -106).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceArea {
    bounds: Rect<f64>,
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self::new(
            Coord {
                x: -107.0,
                y: 28.0,
            },
            Coord {
                x: -106.0,
                y: 29.0,
            },
        )
    }
}

impl ServiceArea {
    /// Build an area from two opposite corners; corner order is normalised.
    #[must_use]
    pub fn new(corner_a: Coord, corner_b: Coord) -> Self {
        Self {
            bounds: Rect::new(corner_a, corner_b),
        }
    }

    /// The bounding rectangle (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Whether `coord` lies inside the area, boundary included.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        is_valid_coord(coord) && self.bounds.intersects(&coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn distance_is_symmetric_and_plausible() {
        let centre = Coord {
            x: -106.0886,
            y: 28.6353,
        };
        let north = Coord {
            x: -106.0886,
            y: 28.6443,
        };
        let forward = distance_km(centre, north);
        let backward = distance_km(north, centre);
        assert!((forward - backward).abs() < 1e-12);
        // 0.009 degrees of latitude is roughly one kilometre.
        assert!((forward - 1.0).abs() < 0.01, "got {forward}");
    }

    #[rstest]
    #[case(Coord { x: -106.5, y: 28.5 }, true)]
    #[case(Coord { x: -107.0, y: 28.0 }, true)]
    #[case(Coord { x: -106.0, y: 29.0 }, true)]
    #[case(Coord { x: -105.999, y: 28.5 }, false)]
    #[case(Coord { x: -106.5, y: 27.999 }, false)]
    #[case(Coord { x: f64::NAN, y: 28.5 }, false)]
    fn default_area_containment(#[case] coord: Coord, #[case] expected: bool) {
        assert_eq!(ServiceArea::default().contains(coord), expected);
    }

    #[rstest]
    #[case(Coord { x: 0.0, y: 0.0 }, true)]
    #[case(Coord { x: 180.0, y: -90.0 }, true)]
    #[case(Coord { x: 180.1, y: 0.0 }, false)]
    #[case(Coord { x: 0.0, y: 90.5 }, false)]
    #[case(Coord { x: f64::INFINITY, y: 0.0 }, false)]
    fn validates_numeric_range(#[case] coord: Coord, #[case] expected: bool) {
        assert_eq!(is_valid_coord(coord), expected);
    }
}
