//! Nominatim API response types for the search and reverse endpoints.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Output/>

use serde::Deserialize;

/// One entry in a `/search` response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub struct SearchPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SearchPlace {
    /// Parsed `(lon, lat)`, or `None` when either field is not a number.
    pub fn position(&self) -> Option<(f64, f64)> {
        let lat = self.lat.trim().parse().ok()?;
        let lon = self.lon.trim().parse().ok()?;
        Some((lon, lat))
    }
}

/// A `/reverse` response. Failures come back as `{"error": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ReversePlace {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The structured address fields used for labels.
#[derive(Debug, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub neighbourhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
}

impl ReversePlace {
    /// Street-level label: road, suburb, neighbourhood and city joined with
    /// `", "`, skipping blanks.
    ///
    /// A missing city falls back to the town and then to `default_city`.
    /// Without an address the full display name is used.
    pub fn label(&self, default_city: &str) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        let Some(address) = &self.address else {
            return self
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned);
        };
        let city = address
            .city
            .as_deref()
            .or(address.town.as_deref())
            .unwrap_or(default_city);
        let parts: Vec<&str> = [
            address.road.as_deref(),
            address.suburb.as_deref(),
            address.neighbourhood.as_deref(),
            Some(city),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
        if parts.is_empty() {
            return self.display_name.clone();
        }
        Some(parts.join(", "))
    }
}
