//! Error types for the `Tripplanr` backend

use thiserror::Error;

/// Structured error descriptor returned by the travel-search upstream.
///
/// Partial-failure responses enumerate offending request parameters here;
/// the gateway reads `source.parameter` and `detail` to recover invalid
/// hotel ids.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpstreamErrorDetail {
    pub code: Option<i64>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub source: Option<UpstreamErrorSource>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpstreamErrorSource {
    pub parameter: Option<String>,
    pub pointer: Option<String>,
}

impl UpstreamErrorDetail {
    /// Whether this descriptor points at the `hotelIds` request parameter.
    pub fn concerns_hotel_ids(&self) -> bool {
        self.source
            .as_ref()
            .and_then(|s| s.parameter.as_deref().or(s.pointer.as_deref()))
            .is_some_and(|p| p.contains("hotelIds"))
    }

    /// Extract the hotel ids this descriptor flags as invalid.
    ///
    /// The upstream lists offending ids inside the free-text `detail` field,
    /// so tokens are matched against the ids that were actually sent.
    pub fn invalid_hotel_ids(&self, requested: &[String]) -> Vec<String> {
        if !self.concerns_hotel_ids() {
            return Vec::new();
        }
        let detail = self.detail.as_deref().unwrap_or_default();
        requested
            .iter()
            .filter(|id| detail.contains(id.as_str()))
            .cloned()
            .collect()
    }
}

/// Main error type for the `Tripplanr` backend
#[derive(Error, Debug)]
pub enum Error {
    /// Travel-search provider returned a non-2xx response
    #[error("upstream search error ({status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        errors: Vec<UpstreamErrorDetail>,
    },

    /// City resolution produced no hotels at all
    #[error("no hotels found for city {city_code}")]
    NoHotelsFound { city_code: String },

    /// Destination code is not in the location registry
    #[error("unknown location code: {0}")]
    UnknownLocation(String),

    /// Geocoding lookup returned zero results
    #[error("geocoding failed for {0}")]
    GeocodingFailed(String),

    /// Points-of-interest lookup failed
    #[error("activity search failed: {0}")]
    ActivitySearch(String),

    /// Reasoning backend returned content that could not be parsed
    #[error("malformed AI response: {0}")]
    MalformedAiResponse(String),

    /// Reasoning backend transport failure
    #[error("ranking unavailable: {0}")]
    RankingUnavailable(String),

    /// Orchestrator-level wrapper: a sub-stage failed, no partial itinerary
    #[error("itinerary assembly failed: {source}")]
    ItineraryAssembly {
        #[source]
        source: Box<Error>,
    },

    /// Request criteria rejected before any upstream call
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to an upstream
    #[error("network error: {0}")]
    Network(String),
}

impl Error {
    /// Wrap any sub-stage failure into the orchestrator-level error.
    ///
    /// Already-wrapped errors pass through unchanged so the root cause stays
    /// one level deep.
    #[must_use]
    pub fn into_assembly(self) -> Self {
        match self {
            wrapped @ Error::ItineraryAssembly { .. } => wrapped,
            other => Error::ItineraryAssembly {
                source: Box::new(other),
            },
        }
    }

    /// Create an upstream error without structured detail
    pub fn upstream<S: Into<String>>(status: u16, message: S) -> Self {
        Error::Upstream {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(parameter: &str, text: &str) -> UpstreamErrorDetail {
        UpstreamErrorDetail {
            code: Some(1257),
            title: Some("INVALID PROPERTY CODE".to_string()),
            detail: Some(text.to_string()),
            source: Some(UpstreamErrorSource {
                parameter: Some(parameter.to_string()),
                pointer: None,
            }),
        }
    }

    #[test]
    fn test_invalid_hotel_ids_matches_requested() {
        let requested = vec!["HTPAR001".to_string(), "HTPAR002".to_string()];
        let d = detail("hotelIds", "invalid property codes: HTPAR002, HTXXX999");
        assert_eq!(d.invalid_hotel_ids(&requested), vec!["HTPAR002".to_string()]);
    }

    #[test]
    fn test_invalid_hotel_ids_ignores_other_parameters() {
        let requested = vec!["HTPAR001".to_string()];
        let d = detail("checkInDate", "HTPAR001 whatever");
        assert!(d.invalid_hotel_ids(&requested).is_empty());
    }

    #[test]
    fn test_into_assembly_preserves_cause() {
        let err = Error::GeocodingFailed("Tokyo".to_string()).into_assembly();
        match &err {
            Error::ItineraryAssembly { source } => {
                assert!(matches!(**source, Error::GeocodingFailed(_)));
            }
            other => panic!("expected assembly wrapper, got {other:?}"),
        }
        assert!(err.to_string().contains("geocoding failed for Tokyo"));
    }

    #[test]
    fn test_into_assembly_does_not_double_wrap() {
        let err = Error::upstream(502, "boom").into_assembly().into_assembly();
        match err {
            Error::ItineraryAssembly { source } => {
                assert!(matches!(*source, Error::Upstream { .. }));
            }
            other => panic!("expected single wrapper, got {other:?}"),
        }
    }
}
