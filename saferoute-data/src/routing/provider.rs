//! [`Router`] implementation over OSRM's Route API.

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use reqwest::Client;
use saferoute_core::{RouteCandidate, RouteProviderError, Router};

use super::osrm::RouteResponse;
use crate::client::{ProviderBuildError, build_client};

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "saferoute/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of routes kept from one response.
const DEFAULT_MAX_ALTERNATIVES: usize = 3;

/// Configuration for [`OsrmRouter`].
#[derive(Debug, Clone)]
pub struct OsrmRouterConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// OSRM profile segment of the URL.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Upper bound on the candidates returned per request.
    pub max_alternatives: usize,
}

impl Default for OsrmRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_owned(),
            profile: "driving".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
        }
    }
}

impl OsrmRouterConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the OSRM profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Keep at most `max_alternatives` routes; zero is treated as one.
    #[must_use]
    pub fn with_max_alternatives(mut self, max_alternatives: usize) -> Self {
        self.max_alternatives = max_alternatives.max(1);
        self
    }
}

/// HTTP router backed by the OSRM Route API.
///
/// Requests ask for alternatives and full GeoJSON geometry. Distances are
/// converted from metres to kilometres and durations from seconds to
/// minutes.
#[derive(Debug)]
pub struct OsrmRouter {
    client: Client,
    config: OsrmRouterConfig,
}

impl OsrmRouter {
    /// Create a router with default configuration against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmRouterConfig::new(base_url))
    }

    /// Create a router with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: OsrmRouterConfig) -> Result<Self, ProviderBuildError> {
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmRouterConfig {
        &self.config
    }

    /// Build the OSRM Route API URL.
    ///
    /// The URL format is
    /// `{base_url}/route/v1/{profile}/{lon},{lat};{lon},{lat}?...`.
    fn build_route_url(&self, origin: Coord, destination: Coord) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson&alternatives=true",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            origin.x,
            origin.y,
            destination.x,
            destination.y,
        )
    }

    async fn fetch_routes(
        &self,
        origin: Coord,
        destination: Coord,
    ) -> Result<Vec<RouteCandidate>, RouteProviderError> {
        let url = self.build_route_url(origin, destination);
        log::debug!("requesting routes from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        // OSRM reports NoRoute with HTTP 400 and a JSON body, so read the
        // body before looking at the status.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        match serde_json::from_str::<RouteResponse>(&body) {
            Ok(parsed) => self.convert_response(parsed),
            Err(_) if !status.is_success() => Err(RouteProviderError::Http {
                url,
                status: status.as_u16(),
                message: body,
            }),
            Err(err) => Err(RouteProviderError::Parse {
                message: err.to_string(),
            }),
        }
    }

    /// Convert a reqwest error to a [`RouteProviderError`].
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RouteProviderError {
        if error.is_timeout() {
            return RouteProviderError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RouteProviderError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RouteProviderError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Convert an OSRM response to route candidates.
    fn convert_response(
        &self,
        response: RouteResponse,
    ) -> Result<Vec<RouteCandidate>, RouteProviderError> {
        if response.code == "NoRoute" {
            return Err(RouteProviderError::NoRoute);
        }
        if !response.is_ok() {
            return Err(RouteProviderError::Service {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let candidates = response
            .routes
            .into_iter()
            .take(self.config.max_alternatives)
            .map(|route| {
                let vertices = route
                    .geometry
                    .coordinates
                    .into_iter()
                    .map(|[x, y]| Coord { x, y })
                    .collect();
                RouteCandidate::new(vertices, route.distance / 1000.0, route.duration / 60.0)
                    .map_err(|err| RouteProviderError::Parse {
                        message: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if candidates.is_empty() {
            return Err(RouteProviderError::NoRoute);
        }
        Ok(candidates)
    }
}

#[async_trait]
impl Router for OsrmRouter {
    async fn route(
        &self,
        origin: Coord,
        destination: Coord,
    ) -> Result<Vec<RouteCandidate>, RouteProviderError> {
        self.fetch_routes(origin, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::osrm::{LineGeometry, OsrmRoute};
    use rstest::{fixture, rstest};

    const PLAZA: Coord = Coord {
        x: -106.0886,
        y: 28.6353,
    };
    const CATEDRAL: Coord = Coord {
        x: -106.0772,
        y: 28.6353,
    };

    #[fixture]
    fn router() -> OsrmRouter {
        OsrmRouter::new("http://osrm.example.com").expect("router should build")
    }

    fn route(distance: f64, duration: f64) -> OsrmRoute {
        OsrmRoute {
            distance,
            duration,
            geometry: LineGeometry {
                coordinates: vec![[PLAZA.x, PLAZA.y], [CATEDRAL.x, CATEDRAL.y]],
            },
        }
    }

    fn ok_response(routes: Vec<OsrmRoute>) -> RouteResponse {
        RouteResponse {
            code: "Ok".to_owned(),
            message: None,
            routes,
        }
    }

    #[rstest]
    fn build_route_url_formats_coordinates(router: OsrmRouter) {
        let url = router.build_route_url(PLAZA, CATEDRAL);

        assert_eq!(
            url,
            "http://osrm.example.com/route/v1/driving/-106.0886,28.6353;-106.0772,28.6353\
             ?overview=full&geometries=geojson&alternatives=true"
        );
    }

    #[rstest]
    fn build_route_url_strips_trailing_slash() {
        let router = OsrmRouter::with_config(
            OsrmRouterConfig::new("http://osrm.example.com/").with_profile("car"),
        )
        .expect("router should build");

        let url = router.build_route_url(PLAZA, CATEDRAL);

        assert!(url.starts_with("http://osrm.example.com/route/v1/car/"));
        assert!(!url.contains("//route"));
    }

    #[rstest]
    fn convert_response_converts_units(router: OsrmRouter) {
        let candidates = router
            .convert_response(ok_response(vec![route(1500.0, 240.0)]))
            .expect("should convert");

        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].distance_km() - 1.5).abs() < 1e-9);
        assert!((candidates[0].duration_min() - 4.0).abs() < 1e-9);
        assert_eq!(candidates[0].start(), PLAZA);
        assert_eq!(candidates[0].end(), CATEDRAL);
    }

    #[rstest]
    fn convert_response_caps_alternatives() {
        let router = OsrmRouter::with_config(
            OsrmRouterConfig::new("http://osrm.example.com").with_max_alternatives(2),
        )
        .expect("router should build");
        let routes = (1..=4).map(|i| route(1000.0 * f64::from(i), 60.0)).collect();

        let candidates = router
            .convert_response(ok_response(routes))
            .expect("should convert");

        assert_eq!(candidates.len(), 2);
    }

    #[rstest]
    fn convert_response_maps_no_route(router: OsrmRouter) {
        let response = RouteResponse {
            code: "NoRoute".to_owned(),
            message: Some("Impossible route between points".to_owned()),
            routes: Vec::new(),
        };

        assert_eq!(
            router.convert_response(response),
            Err(RouteProviderError::NoRoute)
        );
    }

    #[rstest]
    fn convert_response_treats_empty_success_as_no_route(router: OsrmRouter) {
        assert_eq!(
            router.convert_response(ok_response(Vec::new())),
            Err(RouteProviderError::NoRoute)
        );
    }

    #[rstest]
    fn convert_response_reports_service_errors(router: OsrmRouter) {
        let response = RouteResponse {
            code: "InvalidQuery".to_owned(),
            message: Some("Query string malformed".to_owned()),
            routes: Vec::new(),
        };

        match router.convert_response(response) {
            Err(RouteProviderError::Service { code, message }) => {
                assert_eq!(code, "InvalidQuery");
                assert_eq!(message, "Query string malformed");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[rstest]
    fn convert_response_rejects_degenerate_geometry(router: OsrmRouter) {
        let degenerate = OsrmRoute {
            distance: 10.0,
            duration: 5.0,
            geometry: LineGeometry {
                coordinates: vec![[PLAZA.x, PLAZA.y]],
            },
        };

        assert!(matches!(
            router.convert_response(ok_response(vec![degenerate])),
            Err(RouteProviderError::Parse { .. })
        ));
    }
}
