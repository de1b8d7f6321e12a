//! `Tripplanr` - AI-assisted travel search and itinerary planning
//!
//! This library aggregates third-party travel APIs (flight/hotel search,
//! geocoding, points of interest, currency conversion) behind a REST
//! gateway and uses a conversational reasoning backend to rank candidates
//! into itinerary recommendations.

pub mod amadeus;
pub mod api;
pub mod assistant;
pub mod config;
pub mod currency;
pub mod error;
pub mod gateway;
pub mod google_maps;
pub mod itinerary;
pub mod location_resolver;
pub mod models;
pub mod places;
pub mod web;

// Re-export core types for public API
pub use amadeus::{AmadeusClient, FlightQuery, TravelApi};
pub use assistant::{
    OpenAiAssistantClient, PacingGate, Ranked, RankingConfig, RankingEngine, ReasoningBackend,
    RunOutcome,
};
pub use config::TripplanrConfig;
pub use currency::{CurrencyApi, CurrencyConverter};
pub use error::Error;
pub use gateway::SearchGateway;
pub use google_maps::{GeocodeHit, GoogleMapsClient, MapsApi, PlaceHit};
pub use itinerary::ItineraryPlanner;
pub use location_resolver::LocationResolver;
pub use models::{
    Activity, ActivityCategory, BudgetSplit, Coordinates, DestinationSuggestion, FlightOffer,
    HotelCandidate, ItineraryResult, PlanOutcome, SearchCriteria,
};
pub use places::ActivityLocator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
