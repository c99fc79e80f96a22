//! Tunables for [`RouteAdvisor`](super::RouteAdvisor).

use std::time::Duration;

use geo::Coord;

use crate::{ClassifierConfig, DEFAULT_SAMPLING_STRIDE, RiskMultipliers, ServiceArea};
use crate::transport::DEFAULT_MOTORCYCLE_FACTOR;

/// Origin used when the request has none or it cannot be resolved
/// (Plaza de Armas, Chihuahua).
pub const DEFAULT_ORIGIN: Coord = Coord {
    x: -106.0886,
    y: 28.6353,
};
/// Label for [`DEFAULT_ORIGIN`] when reverse geocoding is unavailable.
pub const DEFAULT_ORIGIN_LABEL: &str = "Centro, Chihuahua";
/// Default bound on each geocoding call.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default bound on the routing call.
pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Advisor configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use saferoute_core::AdvisorConfig;
///
/// let config = AdvisorConfig::default()
///     .with_route_timeout(Duration::from_secs(3))
///     .with_sampling_stride(5);
/// assert_eq!(config.route_timeout, Duration::from_secs(3));
/// assert_eq!(config.sampling_stride, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    /// Bounding box both endpoints must fall within.
    pub service_area: ServiceArea,
    /// Fallback origin.
    pub default_origin: Coord,
    /// Fallback origin label.
    pub default_origin_label: String,
    /// Bound on each geocoding call.
    pub geocode_timeout: Duration,
    /// Bound on the routing call.
    pub route_timeout: Duration,
    /// Point classifier tunables.
    pub classifier: ClassifierConfig,
    /// Vertex stride used when scoring candidates.
    pub sampling_stride: usize,
    /// Travel-time multipliers per risk level.
    pub multipliers: RiskMultipliers,
    /// Motorcycle duration factor.
    pub motorcycle_factor: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            service_area: ServiceArea::default(),
            default_origin: DEFAULT_ORIGIN,
            default_origin_label: DEFAULT_ORIGIN_LABEL.to_owned(),
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            route_timeout: DEFAULT_ROUTE_TIMEOUT,
            classifier: ClassifierConfig::default(),
            sampling_stride: DEFAULT_SAMPLING_STRIDE,
            multipliers: RiskMultipliers::default(),
            motorcycle_factor: DEFAULT_MOTORCYCLE_FACTOR,
        }
    }
}

impl AdvisorConfig {
    /// Override the service area.
    #[must_use]
    pub fn with_service_area(mut self, area: ServiceArea) -> Self {
        self.service_area = area;
        self
    }

    /// Override the fallback origin and its label.
    #[must_use]
    pub fn with_default_origin(mut self, origin: Coord, label: impl Into<String>) -> Self {
        self.default_origin = origin;
        self.default_origin_label = label.into();
        self
    }

    /// Override the geocoding timeout.
    #[must_use]
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Override the routing timeout.
    #[must_use]
    pub fn with_route_timeout(mut self, timeout: Duration) -> Self {
        self.route_timeout = timeout;
        self
    }

    /// Override the classifier tunables.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Override the sampling stride.
    #[must_use]
    pub fn with_sampling_stride(mut self, stride: usize) -> Self {
        self.sampling_stride = stride;
        self
    }

    /// Override the multiplier table.
    #[must_use]
    pub fn with_multipliers(mut self, multipliers: RiskMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    /// Override the motorcycle factor.
    #[must_use]
    pub fn with_motorcycle_factor(mut self, factor: f64) -> Self {
        self.motorcycle_factor = factor;
        self
    }
}
