//! Flight offer candidates returned by the search upstream

use serde::{Deserialize, Serialize};

/// Monetary amount in its native currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub total: f64,
    pub currency: String,
}

/// One flight offer candidate, prior to AI ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: String,
    #[serde(default)]
    pub one_way: bool,
    /// Ordered legs of the journey (outbound first, return second)
    pub itineraries: Vec<FlightItinerary>,
    pub price: Price,
    /// Per-traveler fare breakdown
    #[serde(default)]
    pub traveler_pricings: Vec<TravelerPricing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightItinerary {
    /// ISO-8601 duration as reported upstream, e.g. "PT12H30M"
    pub duration: String,
    pub segments: Vec<FlightSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub carrier_code: String,
    pub number: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: String,
    /// Local timestamp as reported upstream, e.g. "2024-07-11T09:25:00"
    pub at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerPricing {
    pub traveler_type: String,
    pub fare_total: f64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_offer_round_trips_through_json() {
        let offer = FlightOffer {
            id: "F1".to_string(),
            one_way: false,
            itineraries: vec![FlightItinerary {
                duration: "PT12H30M".to_string(),
                segments: vec![FlightSegment {
                    departure: FlightEndpoint {
                        iata_code: "CDG".to_string(),
                        at: "2024-07-11T09:25:00".to_string(),
                    },
                    arrival: FlightEndpoint {
                        iata_code: "HND".to_string(),
                        at: "2024-07-12T04:55:00".to_string(),
                    },
                    carrier_code: "AF".to_string(),
                    number: "276".to_string(),
                    duration: "PT12H30M".to_string(),
                }],
            }],
            price: Price {
                total: 1180.42,
                currency: "EUR".to_string(),
            },
            traveler_pricings: vec![],
        };

        let json = serde_json::to_string(&offer).unwrap();
        assert!(json.contains("\"carrierCode\":\"AF\""));
        let back: FlightOffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "F1");
        assert_eq!(back.price.total, 1180.42);
    }
}
