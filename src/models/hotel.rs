//! Hotel candidates and offers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::flight::Price;

/// Hotel reference from the city resolution call (id + name only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRef {
    pub hotel_id: String,
    pub name: String,
}

/// One bookable room offer inside a hotel candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOffer {
    pub id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    /// Price in the offer's native currency
    pub price: Price,
}

/// One hotel candidate, prior to AI ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelCandidate {
    pub hotel_id: String,
    pub name: String,
    pub city_code: String,
    #[serde(default = "default_available")]
    pub available: bool,
    pub offers: Vec<HotelOffer>,
    /// Cheapest offer normalized to the comparison currency; annotated by
    /// the ranking engine before shortlisting, never by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_price: Option<f64>,
}

fn default_available() -> bool {
    true
}

impl HotelCandidate {
    /// Cheapest native offer amount, ignoring currency differences
    #[must_use]
    pub fn min_native_price(&self) -> Option<f64> {
        self.offers
            .iter()
            .map(|o| o.price.total)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}
