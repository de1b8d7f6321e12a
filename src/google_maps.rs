//! Geocoding and nearby-places provider client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::Result;
use crate::config::MapsConfig;
use crate::error::Error;
use crate::models::Coordinates;

/// One geocoding result (only the parts the pipeline consumes)
#[derive(Debug, Clone)]
pub struct GeocodeHit {
    pub coordinates: Coordinates,
    pub formatted_address: String,
}

/// One raw nearby-search result
#[derive(Debug, Clone)]
pub struct PlaceHit {
    pub name: String,
    pub vicinity: Option<String>,
    pub place_id: String,
    pub types: Vec<String>,
}

/// Abstraction over the maps provider (geocoding + nearby search)
#[async_trait]
pub trait MapsApi: Send + Sync {
    /// Address-to-coordinates lookup
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>>;

    /// Coordinate + radius + keyword nearby search
    async fn places_nearby(
        &self,
        location: Coordinates,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceHit>>;
}

/// Client for the Google-Maps-style web services
pub struct GoogleMapsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleMapsClient {
    pub fn new(config: &MapsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("Tripplanr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MapsApi for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>> {
        debug!("Geocoding address: {}", address);
        let url = format!(
            "{}/maps/api/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            self.api_key,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "geocoding request failed with status {}",
                response.status()
            )));
        }

        let body: wire::GeocodeResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .map(|r| GeocodeHit {
                coordinates: Coordinates::new(r.geometry.location.lat, r.geometry.location.lng),
                formatted_address: r.formatted_address,
            })
            .collect())
    }

    async fn places_nearby(
        &self,
        location: Coordinates,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceHit>> {
        debug!(
            "Nearby search at {} (radius {}m, keyword '{}')",
            location.to_query_param(),
            radius_m,
            keyword
        );
        let url = format!(
            "{}/maps/api/place/nearbysearch/json?location={}&radius={}&keyword={}&key={}",
            self.base_url,
            location.to_query_param(),
            radius_m,
            urlencoding::encode(keyword),
            self.api_key,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "nearby search failed with status {}",
                response.status()
            )));
        }

        let body: wire::NearbyResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .map(|r| PlaceHit {
                name: r.name,
                vicinity: r.vicinity,
                place_id: r.place_id,
                types: r.types,
            })
            .collect())
    }
}

/// Maps provider wire structures
mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResponse {
        #[serde(default)]
        pub results: Vec<GeocodeResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResult {
        pub geometry: Geometry,
        #[serde(default)]
        pub formatted_address: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub location: LatLng,
    }

    #[derive(Debug, Deserialize)]
    pub struct LatLng {
        pub lat: f64,
        pub lng: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct NearbyResponse {
        #[serde(default)]
        pub results: Vec<NearbyResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct NearbyResult {
        pub name: String,
        pub vicinity: Option<String>,
        pub place_id: String,
        #[serde(default)]
        pub types: Vec<String>,
    }
}
