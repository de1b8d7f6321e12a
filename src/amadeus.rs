//! Travel-search upstream client
//!
//! HTTP client for the flight/hotel search provider. Each method is a single
//! upstream call; retry and partial-failure salvage for hotel search live in
//! the gateway, not here.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::Result;
use crate::config::AmadeusConfig;
use crate::error::Error;
use crate::models::{FlightOffer, HotelCandidate, HotelRef};

/// Flight search query parameters
#[derive(Debug, Clone)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub max_results: u32,
}

/// Abstraction over the travel-search upstream.
///
/// One method per upstream call so the gateway's tiling algorithm can be
/// exercised against an in-process implementation in tests.
#[async_trait]
pub trait TravelApi: Send + Sync {
    /// Search flight offers for a round trip
    async fn flight_offers(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>>;

    /// Resolve all hotels in a city to (id, name) references
    async fn hotels_in_city(&self, city_code: &str) -> Result<Vec<HotelRef>>;

    /// Search offers for a batch of hotel ids over one date segment
    async fn hotel_offers(
        &self,
        hotel_ids: &[String],
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
    ) -> Result<Vec<HotelCandidate>>;

    /// Location autocomplete pass-through for the HTTP surface
    async fn autocomplete_locations(&self, keyword: &str, sub_type: Option<&str>) -> Result<Value>;
}

struct CachedToken {
    access_token: String,
    acquired: tokio::time::Instant,
    expires_in: u64,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        // refresh one minute early
        self.acquired.elapsed() >= Duration::from_secs(self.expires_in.saturating_sub(60))
    }
}

/// Client for the Amadeus-style travel-search API
pub struct AmadeusClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusClient {
    /// Create a new client from configuration
    pub fn new(config: &AmadeusConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("Tripplanr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            token: Mutex::new(None),
        })
    }

    /// Fetch or reuse the client-credentials access token
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting new travel-search access token");
        let response = self
            .client
            .post(format!("{}/v1/security/oauth2/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                status,
                format!("token request rejected: {body}"),
            ));
        }

        let token: wire::TokenResponse = response.json().await?;
        let access = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            acquired: tokio::time::Instant::now(),
            expires_in: token.expires_in,
        });
        Ok(access)
    }

    /// Turn a non-2xx response into an `Error::Upstream`, keeping any
    /// structured error descriptors the body carries.
    async fn upstream_error(response: Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let errors = serde_json::from_str::<wire::ErrorEnvelope>(&body)
            .map(|e| e.errors)
            .unwrap_or_default();
        let message = errors
            .iter()
            .filter_map(|e| e.title.clone())
            .collect::<Vec<_>>()
            .join("; ");
        Error::Upstream {
            status,
            message: if message.is_empty() { body } else { message },
            errors,
        }
    }

    async fn get_json(&self, url: String) -> Result<Value> {
        let token = self.access_token().await?;
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TravelApi for AmadeusClient {
    async fn flight_offers(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>> {
        info!(
            "Searching flights {} -> {} ({} to {})",
            query.origin, query.destination, query.departure_date, query.return_date
        );

        let url = format!(
            "{}/v2/shopping/flight-offers?originLocationCode={}&destinationLocationCode={}&departureDate={}&returnDate={}&adults={}&children={}&max={}",
            self.base_url,
            urlencoding::encode(&query.origin),
            urlencoding::encode(&query.destination),
            query.departure_date,
            query.return_date,
            query.adults,
            query.children,
            query.max_results,
        );

        let token = self.access_token().await?;
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let envelope: wire::FlightOffersResponse = response.json().await?;
        let offers: Vec<FlightOffer> = envelope
            .data
            .into_iter()
            .map(wire::FlightOfferData::into_model)
            .collect();
        info!("Found {} flight offers", offers.len());
        Ok(offers)
    }

    async fn hotels_in_city(&self, city_code: &str) -> Result<Vec<HotelRef>> {
        let url = format!(
            "{}/v1/reference-data/locations/hotels/by-city?cityCode={}",
            self.base_url,
            urlencoding::encode(city_code),
        );

        let token = self.access_token().await?;
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let envelope: wire::HotelListResponse = response.json().await?;
        Ok(envelope
            .data
            .into_iter()
            .map(|h| HotelRef {
                hotel_id: h.hotel_id,
                name: h.name,
            })
            .collect())
    }

    async fn hotel_offers(
        &self,
        hotel_ids: &[String],
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
    ) -> Result<Vec<HotelCandidate>> {
        debug!(
            "Searching hotel offers for {} ids, {} to {}",
            hotel_ids.len(),
            check_in,
            check_out
        );

        let url = format!(
            "{}/v3/shopping/hotel-offers?hotelIds={}&checkInDate={}&checkOutDate={}&adults={}",
            self.base_url,
            urlencoding::encode(&hotel_ids.join(",")),
            check_in,
            check_out,
            adults,
        );

        let token = self.access_token().await?;
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let envelope: wire::HotelOffersResponse = response.json().await?;
        Ok(envelope
            .data
            .into_iter()
            .map(wire::HotelOffersData::into_model)
            .collect())
    }

    async fn autocomplete_locations(&self, keyword: &str, sub_type: Option<&str>) -> Result<Value> {
        let mut url = format!(
            "{}/v1/reference-data/locations?keyword={}",
            self.base_url,
            urlencoding::encode(keyword),
        );
        if let Some(sub_type) = sub_type {
            url.push_str(&format!("&subType={}", urlencoding::encode(sub_type)));
        }
        self.get_json(url).await
    }
}

/// Upstream wire structures and conversion into domain models
mod wire {
    use serde::Deserialize;

    use crate::error::UpstreamErrorDetail;
    use crate::models::{
        FlightEndpoint, FlightItinerary, FlightOffer, FlightSegment, HotelCandidate, HotelOffer,
        Price, TravelerPricing,
    };

    #[derive(Debug, Deserialize)]
    pub struct TokenResponse {
        pub access_token: String,
        pub expires_in: u64,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct ErrorEnvelope {
        #[serde(default)]
        pub errors: Vec<UpstreamErrorDetail>,
    }

    #[derive(Debug, Deserialize)]
    pub struct FlightOffersResponse {
        #[serde(default)]
        pub data: Vec<FlightOfferData>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FlightOfferData {
        pub id: String,
        #[serde(default)]
        pub one_way: bool,
        #[serde(default)]
        pub itineraries: Vec<ItineraryData>,
        pub price: PriceData,
        #[serde(default)]
        pub traveler_pricings: Vec<TravelerPricingData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ItineraryData {
        #[serde(default)]
        pub duration: String,
        #[serde(default)]
        pub segments: Vec<SegmentData>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SegmentData {
        pub departure: EndpointData,
        pub arrival: EndpointData,
        pub carrier_code: String,
        pub number: String,
        #[serde(default)]
        pub duration: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EndpointData {
        pub iata_code: String,
        pub at: String,
    }

    /// Prices come over the wire as decimal strings
    #[derive(Debug, Deserialize)]
    pub struct PriceData {
        pub total: String,
        pub currency: String,
    }

    impl PriceData {
        pub fn into_model(self) -> Price {
            Price {
                total: self.total.parse().unwrap_or(0.0),
                currency: self.currency,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TravelerPricingData {
        pub traveler_type: String,
        pub price: PriceData,
    }

    impl FlightOfferData {
        pub fn into_model(self) -> FlightOffer {
            FlightOffer {
                id: self.id,
                one_way: self.one_way,
                itineraries: self
                    .itineraries
                    .into_iter()
                    .map(|i| FlightItinerary {
                        duration: i.duration,
                        segments: i
                            .segments
                            .into_iter()
                            .map(|s| FlightSegment {
                                departure: FlightEndpoint {
                                    iata_code: s.departure.iata_code,
                                    at: s.departure.at,
                                },
                                arrival: FlightEndpoint {
                                    iata_code: s.arrival.iata_code,
                                    at: s.arrival.at,
                                },
                                carrier_code: s.carrier_code,
                                number: s.number,
                                duration: s.duration,
                            })
                            .collect(),
                    })
                    .collect(),
                price: self.price.into_model(),
                traveler_pricings: self
                    .traveler_pricings
                    .into_iter()
                    .map(|t| {
                        let price = t.price.into_model();
                        TravelerPricing {
                            traveler_type: t.traveler_type,
                            fare_total: price.total,
                            currency: price.currency,
                        }
                    })
                    .collect(),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct HotelListResponse {
        #[serde(default)]
        pub data: Vec<HotelListEntry>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HotelListEntry {
        pub hotel_id: String,
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct HotelOffersResponse {
        #[serde(default)]
        pub data: Vec<HotelOffersData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct HotelOffersData {
        pub hotel: HotelData,
        #[serde(default = "default_true")]
        pub available: bool,
        #[serde(default)]
        pub offers: Vec<HotelOfferData>,
    }

    fn default_true() -> bool {
        true
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HotelData {
        pub hotel_id: String,
        pub name: String,
        #[serde(default)]
        pub city_code: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HotelOfferData {
        pub id: String,
        pub check_in_date: chrono::NaiveDate,
        pub check_out_date: chrono::NaiveDate,
        pub price: PriceData,
    }

    impl HotelOffersData {
        pub fn into_model(self) -> HotelCandidate {
            HotelCandidate {
                hotel_id: self.hotel.hotel_id,
                name: self.hotel.name,
                city_code: self.hotel.city_code,
                available: self.available,
                offers: self
                    .offers
                    .into_iter()
                    .map(|o| HotelOffer {
                        id: o.id,
                        check_in_date: o.check_in_date,
                        check_out_date: o.check_out_date,
                        price: o.price.into_model(),
                    })
                    .collect(),
                comparison_price: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamErrorDetail;

    #[test]
    fn test_flight_offer_wire_conversion() {
        let json = r#"{
            "data": [{
                "id": "1",
                "oneWay": false,
                "itineraries": [{
                    "duration": "PT12H30M",
                    "segments": [{
                        "departure": {"iataCode": "CDG", "at": "2024-07-11T09:25:00"},
                        "arrival": {"iataCode": "HND", "at": "2024-07-12T04:55:00"},
                        "carrierCode": "AF",
                        "number": "276",
                        "duration": "PT12H30M"
                    }]
                }],
                "price": {"total": "1180.42", "currency": "EUR"},
                "travelerPricings": [
                    {"travelerType": "ADULT", "price": {"total": "590.21", "currency": "EUR"}}
                ]
            }]
        }"#;
        let envelope: super::wire::FlightOffersResponse = serde_json::from_str(json).unwrap();
        let parsed: Vec<FlightOffer> = envelope
            .data
            .into_iter()
            .map(super::wire::FlightOfferData::into_model)
            .collect();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].price.total, 1180.42);
        assert_eq!(parsed[0].itineraries[0].segments[0].carrier_code, "AF");
        assert_eq!(parsed[0].traveler_pricings[0].fare_total, 590.21);
    }

    #[test]
    fn test_upstream_error_envelope_parses_invalid_ids() {
        let body = r#"{
            "errors": [{
                "code": 1257,
                "title": "INVALID PROPERTY CODE",
                "detail": "invalid property codes: HTTYO099",
                "source": {"parameter": "hotelIds"}
            }]
        }"#;
        let envelope: serde_json::Value = serde_json::from_str(body).unwrap();
        let errors: Vec<UpstreamErrorDetail> =
            serde_json::from_value(envelope["errors"].clone()).unwrap();
        let requested = vec!["HTTYO001".to_string(), "HTTYO099".to_string()];
        assert_eq!(errors[0].invalid_hotel_ids(&requested), vec!["HTTYO099"]);
    }
}
