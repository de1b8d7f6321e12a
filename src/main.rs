use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use tripplanr::api::AppState;
use tripplanr::assistant::{OpenAiAssistantClient, RankingConfig, RankingEngine};
use tripplanr::config::TripplanrConfig;
use tripplanr::currency::CurrencyConverter;
use tripplanr::gateway::SearchGateway;
use tripplanr::google_maps::GoogleMapsClient;
use tripplanr::itinerary::ItineraryPlanner;
use tripplanr::location_resolver::LocationResolver;
use tripplanr::places::ActivityLocator;
use tripplanr::{AmadeusClient, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripplanrConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    let travel = Arc::new(AmadeusClient::new(&config.amadeus)?);
    let maps = Arc::new(GoogleMapsClient::new(&config.maps)?);
    let currency = Arc::new(CurrencyConverter::new(&config.currency)?);
    let backend = Arc::new(OpenAiAssistantClient::new(&config.assistant)?);

    let gateway = Arc::new(SearchGateway::new(
        travel.clone(),
        config.amadeus.hotel_chunk_size,
        config.amadeus.max_segment_nights,
        config.amadeus.max_flight_results,
    ));
    let resolver = Arc::new(LocationResolver::new(maps.clone()));
    let locator = Arc::new(ActivityLocator::new(maps, config.maps.nearby_radius_m));
    let engine = Arc::new(RankingEngine::new(
        backend,
        currency,
        RankingConfig {
            pause: Duration::from_millis(config.assistant.pause_ms),
            stage_pause: Duration::from_millis(config.assistant.stage_pause_ms),
            target_currency: config.currency.target.clone(),
            ..RankingConfig::default()
        },
    ));
    let planner = Arc::new(ItineraryPlanner::new(
        gateway,
        resolver,
        locator.clone(),
        engine,
    ));

    let state = Arc::new(AppState {
        planner,
        travel,
        locator,
        max_flight_results: config.amadeus.max_flight_results,
    });

    web::run(config.server.port, state).await
}
