//! Itinerary orchestrator
//!
//! Top-level pipeline turning traveler criteria into an itinerary bundle.
//! Two modes: a fixed destination runs flight and hotel search concurrently
//! then ranks, locates and ranks activities; open-destination mode asks the
//! ranking engine for destinations first and repeats the fixed pipeline
//! sequentially per suggestion (the sequential loop keeps the shared
//! reasoning quota within bounds across destinations).

use std::sync::Arc;
use tracing::{info, warn};

use crate::Result;
use crate::assistant::{Ranked, RankingEngine};
use crate::error::Error;
use crate::gateway::SearchGateway;
use crate::location_resolver::LocationResolver;
use crate::models::{BudgetSplit, ItineraryResult, PlanOutcome, SearchCriteria};
use crate::places::ActivityLocator;

/// Orchestrates search, ranking and activity lookup into itineraries
pub struct ItineraryPlanner {
    gateway: Arc<SearchGateway>,
    resolver: Arc<LocationResolver>,
    locator: Arc<ActivityLocator>,
    engine: Arc<RankingEngine>,
}

impl ItineraryPlanner {
    pub fn new(
        gateway: Arc<SearchGateway>,
        resolver: Arc<LocationResolver>,
        locator: Arc<ActivityLocator>,
        engine: Arc<RankingEngine>,
    ) -> Self {
        Self {
            gateway,
            resolver,
            locator,
            engine,
        }
    }

    /// Plan one request end to end.
    ///
    /// Any unrecovered sub-stage failure aborts the whole request as an
    /// assembly error wrapping the cause; no partial itinerary is returned.
    pub async fn plan(&self, criteria: &SearchCriteria) -> Result<PlanOutcome> {
        criteria.validate()?;
        let budget = BudgetSplit::allocate(criteria.max_price);
        info!(
            "Planning itinerary: flight budget {:.2}, hotel budget {:.2}",
            budget.flight, budget.hotel
        );

        if criteria.destination_location {
            let result = self
                .plan_destination(criteria, &budget, None)
                .await
                .map_err(Error::into_assembly)?;
            return Ok(PlanOutcome::Single(result));
        }

        let suggestions = self
            .engine
            .suggest_destinations(criteria)
            .await
            .map_err(Error::into_assembly)?;
        info!("Planning for {} suggested destinations", suggestions.len());

        let mut results = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            let mut scoped = criteria.clone();
            scoped.destination_location_code = Some(suggestion.code.clone());
            let result = self
                .plan_destination(&scoped, &budget, Some(suggestion.name))
                .await
                .map_err(Error::into_assembly)?;
            results.push(result);
        }
        Ok(PlanOutcome::PerDestination(results))
    }

    /// The fixed-destination pipeline for one destination code.
    async fn plan_destination(
        &self,
        criteria: &SearchCriteria,
        budget: &BudgetSplit,
        destination: Option<String>,
    ) -> Result<ItineraryResult> {
        // flight and hotel search are independent upstreams
        let (flights, hotels) = tokio::try_join!(
            self.gateway.search_flights(criteria),
            self.gateway.search_hotels(criteria),
        )?;

        // ranking calls run sequentially; the engine's pacing gate spaces
        // them out on the shared quota
        let flights = apply_ranked(
            self.engine.rank_flights(&flights, criteria, budget.flight).await?,
            flights,
            "flights",
        );
        let hotels = apply_ranked(
            self.engine
                .rank_hotels(hotels.clone(), criteria, budget.hotel)
                .await?,
            hotels,
            "hotels",
        );

        let code = criteria
            .destination_location_code
            .as_deref()
            .ok_or_else(|| Error::InvalidCriteria("missing destination code".to_string()))?;
        let coordinates = self.resolver.resolve_coordinates(code).await?;
        let activities = self
            .locator
            .find_nearby(coordinates, &criteria.keywords)
            .await?;
        let activities = apply_ranked(
            self.engine.rank_activities(&activities, criteria).await?,
            activities,
            "activities",
        );

        Ok(ItineraryResult {
            destination,
            flights,
            hotels,
            activities,
        })
    }
}

/// Degrade gracefully when a ranking run did not complete: keep the
/// unranked candidates instead of surfacing a status token or aborting.
fn apply_ranked<T>(ranked: Ranked<T>, unranked: Vec<T>, stage: &str) -> Vec<T> {
    match ranked {
        Ranked::Ranked(items) => items,
        Ranked::Unavailable(status) => {
            warn!(
                "Ranking unavailable for {} (run status '{}'), keeping unranked candidates",
                stage, status
            );
            unranked
        }
    }
}
