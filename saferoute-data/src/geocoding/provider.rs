//! [`Geocoder`] implementation over Nominatim.

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use reqwest::Client;
use saferoute_core::{GeocodeError, Geocoder, ServiceArea};
use serde::de::DeserializeOwned;
use url::Url;

use super::nominatim::{ReversePlace, SearchPlace};
use crate::client::{ProviderBuildError, build_client};
use crate::routing::DEFAULT_USER_AGENT;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimGeocoderConfig {
    /// Base URL for the Nominatim service.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests. Nominatim's usage policy requires one
    /// that identifies the application.
    pub user_agent: String,
    /// Results outside this area are discarded.
    pub service_area: ServiceArea,
    /// Appended to every free-text query, e.g. `"Chihuahua, México"`.
    pub region_suffix: String,
    /// Comma-separated ISO country codes passed as `countrycodes`.
    pub country_codes: String,
    /// Preferred label language.
    pub language: String,
    /// City used in reverse labels when the address has none.
    pub default_city: String,
}

impl Default for NominatimGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            service_area: ServiceArea::default(),
            region_suffix: "Chihuahua, Chihuahua, México".to_owned(),
            country_codes: "mx".to_owned(),
            language: "es".to_owned(),
            default_city: "Chihuahua".to_owned(),
        }
    }
}

impl NominatimGeocoderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
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

    /// Restrict results to `service_area`.
    #[must_use]
    pub fn with_service_area(mut self, service_area: ServiceArea) -> Self {
        self.service_area = service_area;
        self
    }

    /// Set the regional hint appended to queries.
    #[must_use]
    pub fn with_region_suffix(mut self, region_suffix: impl Into<String>) -> Self {
        self.region_suffix = region_suffix.into();
        self
    }
}

/// HTTP geocoder backed by Nominatim search and reverse.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: Client,
    config: NominatimGeocoderConfig,
}

impl NominatimGeocoder {
    /// Create a geocoder with default configuration against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: NominatimGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &NominatimGeocoderConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn build_search_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let bounds = self.config.service_area.bounds();
        let (min, max) = (bounds.min(), bounds.max());
        let viewbox = format!("{},{},{},{}", min.x, max.y, max.x, min.y);
        let text = if self.config.region_suffix.is_empty() {
            query.trim().to_owned()
        } else {
            format!("{}, {}", query.trim(), self.config.region_suffix)
        };
        Url::parse_with_params(
            &self.endpoint("search"),
            [
                ("q", text.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("viewbox", viewbox.as_str()),
                ("bounded", "1"),
                ("countrycodes", self.config.country_codes.as_str()),
                ("accept-language", self.config.language.as_str()),
            ],
        )
        .map_err(|err| invalid_url(&err))
    }

    fn build_reverse_url(&self, location: Coord) -> Result<Url, GeocodeError> {
        let (lat, lon) = (location.y.to_string(), location.x.to_string());
        Url::parse_with_params(
            &self.endpoint("reverse"),
            [
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("zoom", "18"),
                ("addressdetails", "1"),
                ("accept-language", self.config.language.as_str()),
            ],
        )
        .map_err(|err| invalid_url(&err))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GeocodeError> {
        log::debug!("geocoding request {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;
        response.json().await.map_err(|err| GeocodeError::Provider {
            message: format!("failed to parse geocoding response: {err}"),
        })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        GeocodeError::Provider {
            message: error.to_string(),
        }
    }

    /// First parseable result inside the service area.
    fn first_in_area(&self, query: &str, places: &[SearchPlace]) -> Result<Coord, GeocodeError> {
        places
            .iter()
            .filter_map(SearchPlace::position)
            .map(|(x, y)| Coord { x, y })
            .find(|coord| self.config.service_area.contains(*coord))
            .ok_or_else(|| GeocodeError::NotFound {
                query: query.to_owned(),
            })
    }
}

fn invalid_url(err: &url::ParseError) -> GeocodeError {
    GeocodeError::Provider {
        message: format!("invalid geocoder URL: {err}"),
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, query: &str) -> Result<Coord, GeocodeError> {
        if query.trim().is_empty() {
            return Err(GeocodeError::NotFound {
                query: query.to_owned(),
            });
        }
        let url = self.build_search_url(query)?;
        let places: Vec<SearchPlace> = self.get_json(url).await?;
        self.first_in_area(query, &places)
    }

    async fn reverse_resolve(&self, location: Coord) -> Result<String, GeocodeError> {
        let url = self.build_reverse_url(location)?;
        let place: ReversePlace = self.get_json(url).await?;
        place
            .label(&self.config.default_city)
            .ok_or_else(|| GeocodeError::NotFound {
                query: format!("{},{}", location.y, location.x),
            })
    }
}
