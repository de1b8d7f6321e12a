//! Candidate ranking against traveler criteria
//!
//! Every ranking call follows the same sub-protocol: open a thread, post one
//! structured prompt, drive a run bound to a purpose-specific instruction
//! set, then read the last assistant message. Selected candidates come back
//! as a fenced JSON id list which is matched against what was sent, so the
//! backend can never inject candidates the upstream search did not produce.

use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::Result;
use crate::currency::CurrencyApi;
use crate::error::Error;
use crate::models::{Activity, DestinationSuggestion, FlightOffer, HotelCandidate, SearchCriteria};

use super::backend::ReasoningBackend;
use super::pacing::PacingGate;

/// Tuning knobs for the ranking engine
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Flights per reasoning request
    pub flight_batch_size: usize,
    /// Winners kept per batch
    pub winners_per_batch: usize,
    /// Activities per reasoning request
    pub activity_batch_size: usize,
    /// Cheapest hotels forwarded to the shortlist call
    pub hotel_shortlist_size: usize,
    /// Hotels kept after the detail call
    pub final_hotel_count: usize,
    /// Minimum spacing between reasoning calls
    pub pause: Duration,
    /// Longer spacing before the hotel detail stage (tighter quota)
    pub stage_pause: Duration,
    /// Currency hotel offers are normalized to before comparison
    pub target_currency: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            flight_batch_size: 10,
            winners_per_batch: 3,
            activity_batch_size: 50,
            hotel_shortlist_size: 8,
            final_hotel_count: 3,
            pause: Duration::from_secs(2),
            stage_pause: Duration::from_secs(10),
            target_currency: "USD".to_string(),
        }
    }
}

/// Outcome of one ranking call.
///
/// A run that terminates without completing is an ordinary
/// `Unavailable(status)` outcome, not an error: callers decide whether to
/// degrade or abort, and can never mistake the status token for ranked data.
#[derive(Debug, Clone)]
pub enum Ranked<T> {
    Ranked(Vec<T>),
    Unavailable(String),
}

enum Reply {
    Completed(String),
    Incomplete(String),
}

/// Ranking/filtering engine over the reasoning backend
pub struct RankingEngine {
    backend: Arc<dyn ReasoningBackend>,
    currency: Arc<dyn CurrencyApi>,
    gate: PacingGate,
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(
        backend: Arc<dyn ReasoningBackend>,
        currency: Arc<dyn CurrencyApi>,
        config: RankingConfig,
    ) -> Self {
        Self {
            backend,
            currency,
            gate: PacingGate::new(config.pause),
            config,
        }
    }

    /// One full reasoning exchange: thread, prompt, run, reply.
    async fn consult(&self, instructions: &str, prompt: &str) -> Result<Reply> {
        let thread_id = self.backend.create_thread().await?;
        self.backend.post_message(&thread_id, prompt).await?;
        let outcome = self.backend.run_to_completion(&thread_id, instructions).await?;
        if !outcome.is_completed() {
            debug!("Assistant run ended in status {}", outcome.status);
            return Ok(Reply::Incomplete(outcome.status));
        }
        let text = self.backend.last_message_text(&thread_id).await?;
        Ok(Reply::Completed(text))
    }

    /// Select the best flight offers in batches.
    pub async fn rank_flights(
        &self,
        flights: &[FlightOffer],
        criteria: &SearchCriteria,
        budget: f64,
    ) -> Result<Ranked<FlightOffer>> {
        let mut winners = Vec::new();
        for batch in flights.chunks(self.config.flight_batch_size) {
            self.gate.wait().await;
            let prompt = prompts::flight_prompt(batch, criteria, budget, self.config.winners_per_batch);
            match self.consult(prompts::FLIGHT_INSTRUCTIONS, &prompt).await? {
                Reply::Completed(text) => {
                    let ids: Vec<String> = parse_json_block(&text)?;
                    winners.extend(
                        batch
                            .iter()
                            .filter(|f| ids.contains(&f.id))
                            .take(self.config.winners_per_batch)
                            .cloned(),
                    );
                }
                Reply::Incomplete(status) => return Ok(Ranked::Unavailable(status)),
            }
        }
        info!("Flight ranking kept {} of {}", winners.len(), flights.len());
        Ok(Ranked::Ranked(winners))
    }

    /// Two-stage hotel ranking.
    ///
    /// Offers are normalized to the comparison currency (conversions fully
    /// awaited before any sorting), the cheapest candidates are shortlisted,
    /// and two reasoning calls follow: an id-only selection kept small to
    /// stay inside the prompt token budget, then a detail pass over the full
    /// payloads of the chosen few.
    pub async fn rank_hotels(
        &self,
        hotels: Vec<HotelCandidate>,
        criteria: &SearchCriteria,
        budget: f64,
    ) -> Result<Ranked<HotelCandidate>> {
        let mut priced: Vec<HotelCandidate> = Vec::new();
        for mut hotel in hotels {
            if hotel.offers.is_empty() {
                warn!("Dropping hotel {} with no offers", hotel.hotel_id);
                continue;
            }
            let converted = futures::future::try_join_all(hotel.offers.iter().map(|offer| {
                self.currency.convert(
                    &offer.price.currency,
                    &self.config.target_currency,
                    offer.price.total,
                )
            }))
            .await?;
            hotel.comparison_price = converted
                .into_iter()
                .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            priced.push(hotel);
        }

        if priced.is_empty() {
            return Ok(Ranked::Ranked(priced));
        }

        priced.sort_by(|a, b| {
            a.comparison_price
                .partial_cmp(&b.comparison_price)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        priced.truncate(self.config.hotel_shortlist_size);

        self.gate.wait().await;
        let prompt = prompts::hotel_shortlist_prompt(&priced, criteria, budget, self.config.final_hotel_count);
        let chosen = match self.consult(prompts::HOTEL_SHORTLIST_INSTRUCTIONS, &prompt).await? {
            Reply::Completed(text) => {
                let ids: Vec<String> = parse_json_block(&text)?;
                // the backend may only pick from what it was sent
                let known: HashSet<&str> = priced.iter().map(|h| h.hotel_id.as_str()).collect();
                let subset: Vec<String> =
                    ids.into_iter().filter(|id| known.contains(id.as_str())).collect();
                priced
                    .iter()
                    .filter(|h| subset.contains(&h.hotel_id))
                    .cloned()
                    .collect::<Vec<_>>()
            }
            Reply::Incomplete(status) => return Ok(Ranked::Unavailable(status)),
        };

        if chosen.is_empty() {
            return Ok(Ranked::Ranked(chosen));
        }

        // the detail stage shares a tighter downstream quota
        self.gate.wait_for(self.config.stage_pause).await;
        let prompt = prompts::hotel_detail_prompt(&chosen, criteria, self.config.final_hotel_count);
        match self.consult(prompts::HOTEL_DETAIL_INSTRUCTIONS, &prompt).await? {
            Reply::Completed(text) => {
                let ids: Vec<String> = parse_json_block(&text)?;
                let finalists: Vec<HotelCandidate> = chosen
                    .into_iter()
                    .filter(|h| ids.contains(&h.hotel_id))
                    .take(self.config.final_hotel_count)
                    .collect();
                info!("Hotel ranking kept {} candidates", finalists.len());
                Ok(Ranked::Ranked(finalists))
            }
            Reply::Incomplete(status) => Ok(Ranked::Unavailable(status)),
        }
    }

    /// Filter activities against criteria in batches.
    pub async fn rank_activities(
        &self,
        activities: &[Activity],
        criteria: &SearchCriteria,
    ) -> Result<Ranked<Activity>> {
        let mut kept = Vec::new();
        for batch in activities.chunks(self.config.activity_batch_size) {
            self.gate.wait().await;
            let prompt = prompts::activity_prompt(batch, criteria);
            match self.consult(prompts::ACTIVITY_INSTRUCTIONS, &prompt).await? {
                Reply::Completed(text) => {
                    let ids: Vec<String> = parse_json_block(&text)?;
                    kept.extend(batch.iter().filter(|a| ids.contains(&a.id)).cloned());
                }
                Reply::Incomplete(status) => return Ok(Ranked::Unavailable(status)),
            }
        }
        info!("Activity ranking kept {} of {}", kept.len(), activities.len());
        Ok(Ranked::Ranked(kept))
    }

    /// Suggest destinations on the requested continent.
    ///
    /// Soft-degradation path: a run that does not complete yields an empty
    /// list rather than an error, so open-destination planning simply
    /// produces no itineraries.
    pub async fn suggest_destinations(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<DestinationSuggestion>> {
        let continent = criteria.continent.as_deref().unwrap_or("any continent");
        self.gate.wait().await;
        let prompt = prompts::destination_prompt(continent, criteria);
        match self.consult(prompts::DESTINATION_INSTRUCTIONS, &prompt).await? {
            Reply::Completed(text) => parse_json_block(&text),
            Reply::Incomplete(status) => {
                info!("Destination suggestion run ended in status {}, skipping", status);
                Ok(Vec::new())
            }
        }
    }
}

/// Extract the first fenced code block, or the whole reply when it already
/// is bare JSON.
fn extract_json_block(text: &str) -> Option<String> {
    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        let end = after.find("```")?;
        return Some(after[..end].trim().to_string());
    }
    let trimmed = text.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some(trimmed.to_string());
    }
    None
}

/// Parse the structured block out of a free-form assistant reply.
fn parse_json_block<T: DeserializeOwned>(text: &str) -> Result<T> {
    let block = extract_json_block(text).ok_or_else(|| {
        Error::MalformedAiResponse("no structured block in assistant reply".to_string())
    })?;
    serde_json::from_str(&block)
        .map_err(|e| Error::MalformedAiResponse(format!("structured block did not parse: {e}")))
}

/// Instruction sets and prompt builders, one pair per ranking purpose
mod prompts {
    use crate::models::{Activity, FlightOffer, HotelCandidate, SearchCriteria};

    pub const FLIGHT_INSTRUCTIONS: &str = "You are a flight booking assistant. \
        Select the best flight offers for the traveler and reply with only a \
        fenced JSON array of the selected offer ids.";

    pub const HOTEL_SHORTLIST_INSTRUCTIONS: &str = "You are a hotel booking assistant. \
        Pick the best hotels for the traveler and reply with only a fenced JSON \
        array of the selected hotel ids.";

    pub const HOTEL_DETAIL_INSTRUCTIONS: &str = "You are a hotel booking assistant. \
        Review the full offer details and confirm the final selection as a fenced \
        JSON array of hotel ids, best first.";

    pub const ACTIVITY_INSTRUCTIONS: &str = "You are an activity booking assistant. \
        Keep only the activities matching the traveler's criteria and reply with \
        only a fenced JSON array of the kept activity ids.";

    pub const DESTINATION_INSTRUCTIONS: &str = "You are a travel assistant. Suggest \
        two destinations matching the criteria and reply with only a fenced JSON \
        array of objects with \"name\" and \"code\" fields.";

    pub fn flight_prompt(
        batch: &[FlightOffer],
        criteria: &SearchCriteria,
        budget: f64,
        winners: usize,
    ) -> String {
        format!(
            "Select up to {winners} flight offers with the best balance of price and \
             total duration. The flight budget is {budget:.2}.\nCriteria: {}\nFlights: {}",
            serde_json::to_string(criteria).unwrap_or_default(),
            serde_json::to_string(batch).unwrap_or_default(),
        )
    }

    /// Compact id/name/price summary: full hotel payloads would blow the
    /// prompt token budget at this stage.
    pub fn hotel_shortlist_prompt(
        hotels: &[HotelCandidate],
        criteria: &SearchCriteria,
        budget: f64,
        count: usize,
    ) -> String {
        let summary: Vec<serde_json::Value> = hotels
            .iter()
            .map(|h| {
                serde_json::json!({
                    "hotelId": h.hotel_id,
                    "name": h.name,
                    "comparisonPrice": h.comparison_price,
                })
            })
            .collect();
        format!(
            "Pick the best {count} hotels for the stay. The hotel budget is {budget:.2}.\n\
             Criteria: {}\nHotels: {}",
            serde_json::to_string(criteria).unwrap_or_default(),
            serde_json::to_string(&summary).unwrap_or_default(),
        )
    }

    pub fn hotel_detail_prompt(
        hotels: &[HotelCandidate],
        criteria: &SearchCriteria,
        count: usize,
    ) -> String {
        format!(
            "Here are the full offer details of the shortlisted hotels. Confirm the \
             final {count} selection.\nCriteria: {}\nHotels: {}",
            serde_json::to_string(criteria).unwrap_or_default(),
            serde_json::to_string(hotels).unwrap_or_default(),
        )
    }

    pub fn activity_prompt(batch: &[Activity], criteria: &SearchCriteria) -> String {
        format!(
            "Keep the activities matching the traveler's style, pace and keywords.\n\
             Criteria: {}\nActivities: {}",
            serde_json::to_string(criteria).unwrap_or_default(),
            serde_json::to_string(batch).unwrap_or_default(),
        )
    }

    pub fn destination_prompt(continent: &str, criteria: &SearchCriteria) -> String {
        format!(
            "Suggest two destinations in {continent} for this trip.\nCriteria: {}",
            serde_json::to_string(criteria).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::backend::RunOutcome;
    use crate::models::{HotelOffer, Price};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend returning a scripted (status, reply) per run, recording every
    /// prompt it receives.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<(String, String)>>,
        prompts: Mutex<Vec<String>>,
        pending_text: Mutex<Option<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: &[(&str, &str)]) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .iter()
                        .map(|(s, t)| ((*s).to_string(), (*t).to_string()))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
                pending_text: Mutex::new(None),
            }
        }

        fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }

        fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        async fn create_thread(&self) -> Result<String> {
            Ok("thread-1".to_string())
        }

        async fn post_message(&self, _thread_id: &str, content: &str) -> Result<()> {
            self.prompts.lock().unwrap().push(content.to_string());
            Ok(())
        }

        async fn run_to_completion(
            &self,
            thread_id: &str,
            _instructions: &str,
        ) -> Result<RunOutcome> {
            let (status, text) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("backend consulted more often than scripted");
            *self.pending_text.lock().unwrap() = Some(text);
            Ok(RunOutcome {
                thread_id: thread_id.to_string(),
                status,
            })
        }

        async fn last_message_text(&self, _thread_id: &str) -> Result<String> {
            Ok(self
                .pending_text
                .lock()
                .unwrap()
                .take()
                .expect("no pending reply"))
        }
    }

    /// Converter applying a fixed JPY->USD rate
    struct FixedRate;

    #[async_trait]
    impl CurrencyApi for FixedRate {
        async fn convert(&self, from: &str, _to: &str, amount: f64) -> Result<f64> {
            match from {
                "JPY" => Ok(amount * 0.01),
                _ => Ok(amount),
            }
        }
    }

    fn test_config() -> RankingConfig {
        RankingConfig {
            pause: Duration::ZERO,
            stage_pause: Duration::ZERO,
            ..RankingConfig::default()
        }
    }

    fn engine(replies: &[(&str, &str)]) -> (RankingEngine, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new(replies));
        let engine = RankingEngine::new(backend.clone(), Arc::new(FixedRate), test_config());
        (engine, backend)
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            max_price: 2000.0,
            flexible_max_price: false,
            origin_location_code: "CDG".to_string(),
            adults: 2,
            children: 0,
            destination_location: true,
            destination_location_code: Some("TYO".to_string()),
            continent: Some("Asia".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 7, 11).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 28).unwrap(),
            travel_type: "leisure".to_string(),
            travel_genre: "culture".to_string(),
            activity_pace: "relaxed".to_string(),
            keywords: "temples".to_string(),
        }
    }

    fn flight(id: &str, total: f64) -> FlightOffer {
        FlightOffer {
            id: id.to_string(),
            one_way: false,
            itineraries: vec![],
            price: Price {
                total,
                currency: "EUR".to_string(),
            },
            traveler_pricings: vec![],
        }
    }

    fn hotel(id: &str, jpy_prices: &[f64]) -> HotelCandidate {
        HotelCandidate {
            hotel_id: id.to_string(),
            name: format!("Hotel {id}"),
            city_code: "TYO".to_string(),
            available: true,
            offers: jpy_prices
                .iter()
                .enumerate()
                .map(|(i, p)| HotelOffer {
                    id: format!("{id}-{i}"),
                    check_in_date: NaiveDate::from_ymd_opt(2024, 7, 11).unwrap(),
                    check_out_date: NaiveDate::from_ymd_opt(2024, 7, 28).unwrap(),
                    price: Price {
                        total: *p,
                        currency: "JPY".to_string(),
                    },
                })
                .collect(),
            comparison_price: None,
        }
    }

    #[test]
    fn test_extract_json_block_variants() {
        assert_eq!(
            extract_json_block("Here you go:\n```json\n[\"A\"]\n```\nEnjoy!"),
            Some("[\"A\"]".to_string())
        );
        assert_eq!(
            extract_json_block("```\n[\"A\", \"B\"]\n```"),
            Some("[\"A\", \"B\"]".to_string())
        );
        assert_eq!(extract_json_block("  [\"bare\"]  "), Some("[\"bare\"]".to_string()));
        assert_eq!(extract_json_block("I could not decide, sorry."), None);
        assert_eq!(extract_json_block("```json\n[\"unterminated\""), None);
    }

    #[test]
    fn test_parse_json_block_rejects_non_list() {
        let err = parse_json_block::<Vec<String>>("```json\n\"not a list\"\n```").unwrap_err();
        assert!(matches!(err, Error::MalformedAiResponse(_)));
        let err = parse_json_block::<Vec<String>>("no block at all").unwrap_err();
        assert!(matches!(err, Error::MalformedAiResponse(_)));
    }

    #[tokio::test]
    async fn test_rank_flights_batches_and_concatenates() {
        let flights: Vec<FlightOffer> =
            (0..25).map(|i| flight(&format!("F{i:02}"), 800.0)).collect();
        // one reply per batch of 10
        let (engine, backend) = engine(&[
            ("completed", "```json\n[\"F00\", \"F03\"]\n```"),
            ("completed", "```json\n[\"F11\"]\n```"),
            ("completed", "```json\n[\"F24\"]\n```"),
        ]);

        let ranked = engine.rank_flights(&flights, &criteria(), 1200.0).await.unwrap();
        let winners = match ranked {
            Ranked::Ranked(w) => w,
            Ranked::Unavailable(s) => panic!("unexpected unavailable: {s}"),
        };

        assert_eq!(backend.prompt_count(), 3);
        let ids: Vec<&str> = winners.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["F00", "F03", "F11", "F24"]);
        assert!(backend.prompt(0).contains("1200.00"));
    }

    #[tokio::test]
    async fn test_rank_flights_non_completed_run_is_unavailable() {
        let flights: Vec<FlightOffer> =
            (0..15).map(|i| flight(&format!("F{i:02}"), 800.0)).collect();
        let (engine, _) = engine(&[
            ("completed", "```json\n[\"F00\"]\n```"),
            ("expired", ""),
        ]);

        let ranked = engine.rank_flights(&flights, &criteria(), 1200.0).await.unwrap();
        assert!(matches!(ranked, Ranked::Unavailable(ref s) if s == "expired"));
    }

    #[tokio::test]
    async fn test_rank_hotels_normalizes_shortlists_and_stays_subset() {
        // ten hotels, JPY prices; HT09 is cheapest, HT00 most expensive
        let hotels: Vec<HotelCandidate> = (0..10)
            .map(|i| hotel(&format!("HT{i:02}"), &[(20000 - i * 1000) as f64]))
            .collect();
        let (engine, backend) = engine(&[
            // stage 1 picks two real ids and hallucinates one
            ("completed", "```json\n[\"HT09\", \"HT08\", \"HTXX\"]\n```"),
            ("completed", "```json\n[\"HT09\", \"HT08\"]\n```"),
        ]);

        let ranked = engine
            .rank_hotels(hotels, &criteria(), 800.0)
            .await
            .unwrap();
        let finalists = match ranked {
            Ranked::Ranked(h) => h,
            Ranked::Unavailable(s) => panic!("unexpected unavailable: {s}"),
        };

        // subset invariant: the hallucinated id never surfaces; cheapest first
        let ids: Vec<&str> = finalists.iter().map(|h| h.hotel_id.as_str()).collect();
        assert_eq!(ids, vec!["HT09", "HT08"]);
        // comparison price converted from JPY before sorting
        assert_eq!(finalists[0].comparison_price, Some(110.0));
        assert_eq!(finalists[1].comparison_price, Some(120.0));

        // the shortlist prompt only carries the 8 cheapest
        let shortlist_prompt = backend.prompt(0);
        assert!(shortlist_prompt.contains("HT09"));
        assert!(!shortlist_prompt.contains("HT00"));
        assert!(!shortlist_prompt.contains("HT01"));
    }

    #[tokio::test]
    async fn test_rank_hotels_malformed_shortlist_reply_fails_fast() {
        let hotels = vec![hotel("HT01", &[12000.0])];
        let (engine, _) = engine(&[("completed", "The best hotel is HT01, great pick!")]);

        let err = engine
            .rank_hotels(hotels, &criteria(), 800.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedAiResponse(_)));
    }

    #[tokio::test]
    async fn test_rank_hotels_incomplete_run_is_unavailable() {
        let hotels = vec![hotel("HT01", &[12000.0])];
        let (engine, _) = engine(&[("failed", "")]);

        let ranked = engine.rank_hotels(hotels, &criteria(), 800.0).await.unwrap();
        assert!(matches!(ranked, Ranked::Unavailable(ref s) if s == "failed"));
    }

    #[tokio::test]
    async fn test_rank_activities_filters_by_returned_ids() {
        let activities: Vec<Activity> = (0..3)
            .map(|i| Activity {
                id: format!("ACT{i}"),
                name: format!("Activity {i}"),
                location: String::new(),
                description: String::new(),
                link: String::new(),
                category: crate::models::ActivityCategory::Cultural,
                price: 0.0,
                currency: "USD".to_string(),
                duration: "1 hour".to_string(),
            })
            .collect();
        let (engine, backend) = engine(&[("completed", "```json\n[\"ACT0\", \"ACT2\"]\n```")]);

        let ranked = engine.rank_activities(&activities, &criteria()).await.unwrap();
        let kept = match ranked {
            Ranked::Ranked(a) => a,
            Ranked::Unavailable(s) => panic!("unexpected unavailable: {s}"),
        };
        assert_eq!(kept.len(), 2);
        assert_eq!(backend.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_suggest_destinations_parses_fenced_list() {
        let (engine, backend) = engine(&[(
            "completed",
            "```json\n[{\"name\": \"Tokyo\", \"code\": \"TYO\"}, {\"name\": \"Sydney\", \"code\": \"SYD\"}]\n```",
        )]);

        let suggestions = engine.suggest_destinations(&criteria()).await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].code, "TYO");
        assert!(backend.prompt(0).contains("Asia"));
    }

    #[tokio::test]
    async fn test_suggest_destinations_soft_degrades_on_incomplete_run() {
        let (engine, _) = engine(&[("expired", "")]);
        let suggestions = engine.suggest_destinations(&criteria()).await.unwrap();
        assert!(suggestions.is_empty());
    }
}
