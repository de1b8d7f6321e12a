//! Coordinates and destination suggestions

use serde::{Deserialize, Serialize};

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Format as the `lat,lng` pair the nearby-search upstream expects
    #[must_use]
    pub fn to_query_param(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// Destination proposed by the reasoning backend in open-destination mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationSuggestion {
    pub name: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_query_param() {
        let c = Coordinates::new(35.6764, 139.65);
        assert_eq!(c.to_query_param(), "35.6764,139.65");
    }
}
