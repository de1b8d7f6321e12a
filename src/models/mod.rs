//! Data models for the `Tripplanr` backend
//!
//! Organized by concern:
//! - Criteria: traveler search criteria and the budget split
//! - Flight: flight offer candidates from the search upstream
//! - Hotel: hotel candidates, offers and city hotel references
//! - Activity: points-of-interest normalized into bookable activities
//! - Location: coordinates and destination suggestions
//! - Itinerary: the assembled recommendation bundle

pub mod activity;
pub mod criteria;
pub mod flight;
pub mod hotel;
pub mod itinerary;
pub mod location;

// Re-export all public types for convenient access
pub use activity::{Activity, ActivityCategory};
pub use criteria::{BudgetSplit, SearchCriteria};
pub use flight::{FlightEndpoint, FlightItinerary, FlightOffer, FlightSegment, Price, TravelerPricing};
pub use hotel::{HotelCandidate, HotelOffer, HotelRef};
pub use itinerary::{ItineraryResult, PlanOutcome};
pub use location::{Coordinates, DestinationSuggestion};
