//! Points-of-interest locator
//!
//! Queries the nearby-places upstream around resolved coordinates and
//! normalizes raw results into the common `Activity` shape.

use rand::{RngExt, distr::Alphanumeric};
use std::sync::Arc;
use tracing::info;

use crate::Result;
use crate::error::Error;
use crate::google_maps::{MapsApi, PlaceHit};
use crate::models::{Activity, ActivityCategory, Coordinates};

/// Category inference: first matching token wins, checked in this order
const CATEGORY_TOKENS: &[(&[&str], ActivityCategory)] = &[
    (&["culture"], ActivityCategory::Cultural),
    (&["outdoor"], ActivityCategory::Outdoor),
    (&["food", "gastronomy"], ActivityCategory::Culinary),
    (&["shopping"], ActivityCategory::Shopping),
];

/// Infer the activity category from upstream type tags by substring match;
/// defaults to cultural when nothing matches.
pub fn categorize(types: &[String]) -> ActivityCategory {
    let joined = types.join(",").to_lowercase();
    for (tokens, category) in CATEGORY_TOKENS {
        if tokens.iter().any(|t| joined.contains(t)) {
            return *category;
        }
    }
    ActivityCategory::Cultural
}

/// Generate a 9-character alphanumeric activity id
fn generate_activity_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(9)
        .map(char::from)
        .collect()
}

/// Service locating activities near a destination
pub struct ActivityLocator {
    maps: Arc<dyn MapsApi>,
    radius_m: u32,
}

impl ActivityLocator {
    pub fn new(maps: Arc<dyn MapsApi>, radius_m: u32) -> Self {
        Self { maps, radius_m }
    }

    /// Find nearby points of interest and normalize them into activities.
    ///
    /// Single upstream call, no retry; any failure surfaces as
    /// `ActivitySearch`.
    pub async fn find_nearby(
        &self,
        coordinates: Coordinates,
        keywords: &str,
    ) -> Result<Vec<Activity>> {
        let hits = self
            .maps
            .places_nearby(coordinates, self.radius_m, keywords)
            .await
            .map_err(|e| Error::ActivitySearch(e.to_string()))?;

        let activities: Vec<Activity> = hits.into_iter().map(Self::to_activity).collect();
        info!("Found {} activities near {}", activities.len(), coordinates.to_query_param());
        Ok(activities)
    }

    fn to_activity(hit: PlaceHit) -> Activity {
        let category = categorize(&hit.types);
        Activity {
            id: generate_activity_id(),
            name: hit.name.clone(),
            location: hit.vicinity.unwrap_or_default(),
            description: hit.name,
            link: hit.place_id,
            category,
            price: 0.0,
            currency: "USD".to_string(),
            duration: "1 hour".to_string(),
        }
    }
}
