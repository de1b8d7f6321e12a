//! Location Resolution Module
//!
//! Maps destination location codes to canonical city names through a fixed
//! registry, then geocodes the city for proximity search.

use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::error::Error;
use crate::google_maps::MapsApi;
use crate::models::Coordinates;

/// Registry of supported destination codes and their canonical city names
const LOCATION_REGISTRY: &[(&str, &str)] = &[
    ("TYO", "Tokyo"),
    ("PAR", "Paris"),
    ("NYC", "New York"),
    ("LON", "London"),
    ("ROM", "Rome"),
    ("BCN", "Barcelona"),
    ("BER", "Berlin"),
    ("SYD", "Sydney"),
];

/// Service resolving destination codes into coordinates
pub struct LocationResolver {
    maps: Arc<dyn MapsApi>,
}

impl LocationResolver {
    pub fn new(maps: Arc<dyn MapsApi>) -> Self {
        Self { maps }
    }

    /// Canonical city name for a destination code
    pub fn city_name(code: &str) -> Result<&'static str> {
        LOCATION_REGISTRY
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
            .ok_or_else(|| Error::UnknownLocation(code.to_string()))
    }

    /// Resolve a destination code to coordinates.
    ///
    /// Uses the first (best) geocoding result, matching how the upstream
    /// orders candidates.
    pub async fn resolve_coordinates(&self, code: &str) -> Result<Coordinates> {
        let city = Self::city_name(code)?;
        debug!("Resolving coordinates for {} ({})", code, city);

        let hits = self.maps.geocode(city).await?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| Error::GeocodingFailed(city.to_string()))?;

        debug!(
            "Resolved {} to ({}, {})",
            city, first.coordinates.lat, first.coordinates.lng
        );
        Ok(first.coordinates)
    }
}
