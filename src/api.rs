//! HTTP surface
//!
//! Thin axum layer: the assistant endpoint drives the planner, the rest are
//! pass-throughs over individual provider operations.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

use crate::amadeus::{FlightQuery, TravelApi};
use crate::error::Error;
use crate::itinerary::ItineraryPlanner;
use crate::models::{Coordinates, SearchCriteria};
use crate::places::ActivityLocator;

/// Shared handler state
pub struct AppState {
    pub planner: Arc<ItineraryPlanner>,
    pub travel: Arc<dyn TravelApi>,
    pub locator: Arc<ActivityLocator>,
    pub max_flight_results: u32,
}

/// Error wrapper mapping pipeline failures onto HTTP statuses while keeping
/// the original message in the body.
struct ApiError(Error);

/// The assembly wrapper maps to the status of its root cause.
fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::InvalidCriteria(_) | Error::UnknownLocation(_) => StatusCode::BAD_REQUEST,
        Error::NoHotelsFound { .. } => StatusCode::NOT_FOUND,
        Error::Upstream { .. }
        | Error::GeocodingFailed(_)
        | Error::ActivitySearch(_)
        | Error::MalformedAiResponse(_)
        | Error::RankingUnavailable(_)
        | Error::Network(_) => StatusCode::BAD_GATEWAY,
        Error::ItineraryAssembly { source } => error_status(source),
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        error_status(&self.0)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("Request failed: {}", self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/assistant", post(ask_assistant))
        .route("/locations", get(autocomplete_locations))
        .route("/hotels", get(hotels_by_city))
        .route("/flight-offers", get(flight_offers))
        .route("/points-of-interest", get(points_of_interest))
        .with_state(state)
}

async fn ask_assistant(
    State(state): State<Arc<AppState>>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Response, ApiError> {
    let outcome = state.planner.plan(&criteria).await?;
    Ok(Json(outcome).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationsQuery {
    keyword: String,
    sub_type: Option<String>,
}

async fn autocomplete_locations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<Value>, ApiError> {
    let value = state
        .travel
        .autocomplete_locations(&query.keyword, query.sub_type.as_deref())
        .await?;
    Ok(Json(value))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelsQuery {
    city_code: String,
}

async fn hotels_by_city(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HotelsQuery>,
) -> Result<Response, ApiError> {
    let refs = state.travel.hotels_in_city(&query.city_code).await?;
    Ok(Json(refs).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlightOffersQuery {
    origin_location_code: String,
    destination_location_code: String,
    departure_date: chrono::NaiveDate,
    return_date: chrono::NaiveDate,
    adults: u32,
    #[serde(default)]
    children: u32,
}

async fn flight_offers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlightOffersQuery>,
) -> Result<Response, ApiError> {
    let offers = state
        .travel
        .flight_offers(&FlightQuery {
            origin: query.origin_location_code,
            destination: query.destination_location_code,
            departure_date: query.departure_date,
            return_date: query.return_date,
            adults: query.adults,
            children: query.children,
            max_results: state.max_flight_results,
        })
        .await?;
    Ok(Json(offers).into_response())
}

#[derive(Deserialize)]
struct PoiQuery {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    keyword: String,
}

async fn points_of_interest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoiQuery>,
) -> Result<Response, ApiError> {
    let activities = state
        .locator
        .find_nearby(Coordinates::new(query.latitude, query.longitude), &query.keyword)
        .await?;
    Ok(Json(activities).into_response())
}
