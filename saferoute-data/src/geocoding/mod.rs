//! Nominatim-backed [`saferoute_core::Geocoder`].
//!
//! Free-text queries are suffixed with a regional hint, bounded to the
//! service-area viewbox and limited to one result. Reverse lookups compose a
//! short street-level label from the structured address.

mod nominatim;
mod provider;

pub use provider::{NominatimGeocoder, NominatimGeocoderConfig};
