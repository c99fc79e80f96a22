//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
///
/// `code` is `"Ok"` on success. Failures carry a code such as `"NoRoute"`
/// or `"InvalidQuery"` and usually a message.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Routes, best first. Absent on failure.
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// One route in a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Length in metres.
    pub distance: f64,
    /// Travel time in seconds.
    pub duration: f64,
    /// GeoJSON line string.
    pub geometry: LineGeometry,
}

/// GeoJSON `LineString` geometry with `[lon, lat]` positions.
#[derive(Debug, Deserialize)]
pub struct LineGeometry {
    /// Positions in travel order.
    pub coordinates: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 1520.4,
                "duration": 240.0,
                "weight": 240.0,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-106.0886, 28.6353], [-106.0772, 28.6353]]
                }
            }],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert_eq!(response.routes.len(), 1);
        assert_eq!(response.routes[0].geometry.coordinates.len(), 2);
        assert_eq!(response.routes[0].geometry.coordinates[1], [-106.0772, 28.6353]);
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{
            "code": "NoRoute",
            "message": "Impossible route between points"
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert!(response.routes.is_empty());
        assert_eq!(
            response.message.as_deref(),
            Some("Impossible route between points")
        );
    }
}
