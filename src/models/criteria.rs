//! Traveler search criteria and budget allocation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Criteria describing one itinerary request.
///
/// Built once from the request body and flows unchanged through the whole
/// pipeline; the only mutation is the destination code substitution when the
/// planner iterates over suggested destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Total trip budget
    pub max_price: f64,
    /// Whether the budget may be stretched for a clearly better option
    #[serde(default)]
    pub flexible_max_price: bool,
    /// Origin location code (IATA-style)
    pub origin_location_code: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    /// True when the caller fixed a destination up front
    pub destination_location: bool,
    /// Fixed destination code; required when `destination_location` is set
    #[serde(default)]
    pub destination_location_code: Option<String>,
    /// Continent hint for destination suggestion in open mode
    #[serde(default)]
    pub continent: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Travel style tags, passed verbatim to the ranking prompts
    #[serde(default)]
    pub travel_type: String,
    #[serde(default)]
    pub travel_genre: String,
    #[serde(default)]
    pub activity_pace: String,
    /// Free-text keywords for the points-of-interest lookup
    #[serde(default)]
    pub keywords: String,
}

impl SearchCriteria {
    /// Total traveler count across age groups
    #[must_use]
    pub fn travelers(&self) -> u32 {
        self.adults + self.children
    }

    /// Number of nights covered by the stay
    #[must_use]
    pub fn stay_nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Validate the criteria before any upstream call is made
    pub fn validate(&self) -> Result<(), Error> {
        if self.start_date >= self.end_date {
            return Err(Error::InvalidCriteria(format!(
                "start date {} must be before end date {}",
                self.start_date, self.end_date
            )));
        }
        if self.adults == 0 {
            return Err(Error::InvalidCriteria(
                "at least one adult traveler is required".to_string(),
            ));
        }
        if self.max_price <= 0.0 {
            return Err(Error::InvalidCriteria(
                "budget must be positive".to_string(),
            ));
        }
        if self.destination_location && self.destination_location_code.is_none() {
            return Err(Error::InvalidCriteria(
                "destinationLocationCode is required for a fixed destination".to_string(),
            ));
        }
        if !self.destination_location && self.continent.is_none() {
            return Err(Error::InvalidCriteria(
                "continent hint is required when no destination is fixed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fixed 60/40 allocation of the total budget between flights and hotels.
///
/// The hotel share is derived by subtraction so the two always sum back to
/// the total exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetSplit {
    pub flight: f64,
    pub hotel: f64,
}

impl BudgetSplit {
    pub const FLIGHT_SHARE: f64 = 0.6;

    #[must_use]
    pub fn allocate(total: f64) -> Self {
        let flight = total * Self::FLIGHT_SHARE;
        Self {
            flight,
            hotel: total - flight,
        }
    }
}
