//! The assembled itinerary recommendation bundle

use serde::Serialize;

use super::activity::Activity;
use super::flight::FlightOffer;
use super::hotel::HotelCandidate;

/// Terminal output of one orchestration pass
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryResult {
    /// Destination label; set only in open-destination mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub flights: Vec<FlightOffer>,
    pub hotels: Vec<HotelCandidate>,
    pub activities: Vec<Activity>,
}

/// Response shape of the assistant endpoint: one bundle for a fixed
/// destination, one bundle per suggestion otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanOutcome {
    Single(ItineraryResult),
    PerDestination(Vec<ItineraryResult>),
}
