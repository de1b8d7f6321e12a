//! External search gateway
//!
//! Uniform wrapper over the flight-search and hotel-search upstream calls.
//! Flight search is a single bounded call. Hotel search tiles the requested
//! stay into (date segment x hotel-id chunk) upstream calls because the
//! provider caps both ids-per-call and stay length, and salvages partial
//! failures by excluding invalid hotel ids and retrying once per chunk.

use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Result;
use crate::amadeus::{FlightQuery, TravelApi};
use crate::error::Error;
use crate::models::{FlightOffer, HotelCandidate, SearchCriteria};

/// Split hotel ids into upstream-sized batches, preserving insertion order
pub fn chunk_ids(ids: &[String], chunk_size: usize) -> Vec<Vec<String>> {
    ids.chunks(chunk_size.max(1)).map(<[String]>::to_vec).collect()
}

/// Tile a stay into segments of at most `max_nights`, clipping the final
/// segment to the original end date. Consecutive segments share a boundary
/// date (check-out of one is check-in of the next) so the full range is
/// covered without gaps.
pub fn date_segments(
    start: NaiveDate,
    end: NaiveDate,
    max_nights: i64,
) -> Vec<(NaiveDate, NaiveDate)> {
    let mut segments = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let candidate = cursor
            .checked_add_days(Days::new(max_nights.max(1) as u64))
            .unwrap_or(end);
        let segment_end = candidate.min(end);
        segments.push((cursor, segment_end));
        cursor = segment_end;
    }
    segments
}

/// Gateway over the travel-search upstream
pub struct SearchGateway {
    api: Arc<dyn TravelApi>,
    chunk_size: usize,
    max_segment_nights: i64,
    max_flight_results: u32,
}

impl SearchGateway {
    pub fn new(
        api: Arc<dyn TravelApi>,
        chunk_size: usize,
        max_segment_nights: i64,
        max_flight_results: u32,
    ) -> Self {
        Self {
            api,
            chunk_size,
            max_segment_nights,
            max_flight_results,
        }
    }

    /// Search flight offers: one upstream call, no retry.
    pub async fn search_flights(&self, criteria: &SearchCriteria) -> Result<Vec<FlightOffer>> {
        let destination = criteria
            .destination_location_code
            .clone()
            .ok_or_else(|| Error::InvalidCriteria("missing destination code".to_string()))?;

        let query = FlightQuery {
            origin: criteria.origin_location_code.clone(),
            destination,
            departure_date: criteria.start_date,
            return_date: criteria.end_date,
            adults: criteria.adults,
            children: criteria.children,
            max_results: self.max_flight_results,
        };
        self.api.flight_offers(&query).await
    }

    /// Search hotel offers across the whole stay.
    ///
    /// Resolves the city's hotel ids, then issues one upstream call per
    /// (date segment x id chunk). A call that fails with structured
    /// invalid-hotel-id detail is retried once with those ids excluded; the
    /// exclusion set carries over to every later call of this invocation.
    /// A chunk whose retry also fails is skipped, never aborting the search.
    pub async fn search_hotels(&self, criteria: &SearchCriteria) -> Result<Vec<HotelCandidate>> {
        let city_code = criteria
            .destination_location_code
            .clone()
            .ok_or_else(|| Error::InvalidCriteria("missing destination code".to_string()))?;

        let refs = self.api.hotels_in_city(&city_code).await?;
        if refs.is_empty() {
            return Err(Error::NoHotelsFound { city_code });
        }
        let ids: Vec<String> = refs.into_iter().map(|r| r.hotel_id).collect();

        let segments = date_segments(criteria.start_date, criteria.end_date, self.max_segment_nights);
        let chunks = chunk_ids(&ids, self.chunk_size);
        info!(
            "Hotel search for {}: {} ids, {} segments x {} chunks",
            city_code,
            ids.len(),
            segments.len(),
            chunks.len()
        );

        let mut excluded: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for (segment_start, segment_end) in &segments {
            for chunk in &chunks {
                let valid: Vec<String> = chunk
                    .iter()
                    .filter(|id| !excluded.contains(id.as_str()))
                    .cloned()
                    .collect();
                if valid.is_empty() {
                    continue;
                }

                match self
                    .api
                    .hotel_offers(&valid, *segment_start, *segment_end, criteria.adults)
                    .await
                {
                    Ok(found) => candidates.extend(found),
                    Err(Error::Upstream { errors, status, message }) => {
                        let invalid: Vec<String> = errors
                            .iter()
                            .flat_map(|e| e.invalid_hotel_ids(&valid))
                            .collect();
                        if invalid.is_empty() {
                            // not an invalid-id failure; nothing to salvage
                            return Err(Error::Upstream { errors, status, message });
                        }

                        debug!(
                            "Excluding {} invalid hotel ids reported by upstream",
                            invalid.len()
                        );
                        excluded.extend(invalid.iter().cloned());

                        let filtered: Vec<String> = valid
                            .iter()
                            .filter(|id| !excluded.contains(id.as_str()))
                            .cloned()
                            .collect();
                        if filtered.is_empty() {
                            continue;
                        }

                        match self
                            .api
                            .hotel_offers(&filtered, *segment_start, *segment_end, criteria.adults)
                            .await
                        {
                            Ok(found) => candidates.extend(found),
                            Err(err) => {
                                warn!(
                                    "Hotel chunk retry failed for segment {} - {}: {}",
                                    segment_start, segment_end, err
                                );
                            }
                        }
                    }
                    Err(other) => return Err(other),
                }
            }
        }

        // ranking requires at least one offer per candidate
        candidates.retain(|c| !c.offers.is_empty());
        info!("Hotel search yielded {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{UpstreamErrorDetail, UpstreamErrorSource};
    use crate::models::{HotelOffer, HotelRef, Price};
    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2024, 7, 11), date(2024, 8, 25), 2)] // 45 nights -> 30 + 15
    #[case(date(2024, 7, 1), date(2024, 7, 31), 1)] // exactly 30 nights
    #[case(date(2024, 7, 1), date(2024, 8, 1), 2)] // 31 nights
    #[case(date(2024, 7, 1), date(2024, 7, 2), 1)] // single night
    fn test_date_segment_count(
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
        #[case] expected: usize,
    ) {
        let segments = date_segments(start, end, 30);
        assert_eq!(segments.len(), expected);
        let nights = (end - start).num_days();
        assert_eq!(expected as i64, (nights + 29) / 30);
    }

    #[test]
    fn test_date_segments_tile_range_exactly() {
        let start = date(2024, 7, 11);
        let end = date(2024, 10, 2); // 83 nights -> 30 + 30 + 23
        let segments = date_segments(start, end, 30);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].0, start);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "segments must be contiguous");
        }
        assert_eq!(segments.last().unwrap().1, end);
        assert_eq!((segments[2].1 - segments[2].0).num_days(), 23);
    }

    #[test]
    fn test_chunk_ids_disjoint_and_complete() {
        let ids: Vec<String> = (0..45).map(|i| format!("HT{i:03}")).collect();
        let chunks = chunk_ids(&ids, 20);
        assert_eq!(chunks.len(), 3); // ceil(45 / 20)
        assert_eq!(chunks[0].len(), 20);
        assert_eq!(chunks[2].len(), 5);

        let mut seen = HashSet::new();
        for chunk in &chunks {
            for id in chunk {
                assert!(seen.insert(id.clone()), "chunks must be disjoint");
            }
        }
        assert_eq!(seen.len(), ids.len());
    }

    /// Scripted upstream: records every hotel_offers call and pops a
    /// pre-programmed outcome per call.
    struct ScriptedApi {
        hotel_ids: Vec<String>,
        calls: Mutex<Vec<Vec<String>>>,
        failures: Mutex<Vec<Option<Error>>>,
    }

    impl ScriptedApi {
        fn new(hotel_count: usize) -> Self {
            Self {
                hotel_ids: (0..hotel_count).map(|i| format!("HT{i:03}")).collect(),
                calls: Mutex::new(Vec::new()),
                failures: Mutex::new(Vec::new()),
            }
        }

        fn fail_call(mut self, call_index: usize, error: Error) -> Self {
            let failures = self.failures.get_mut().unwrap();
            while failures.len() <= call_index {
                failures.push(None);
            }
            failures[call_index] = Some(error);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call(&self, index: usize) -> Vec<String> {
            self.calls.lock().unwrap()[index].clone()
        }
    }

    fn invalid_id_error(ids: &[&str]) -> Error {
        Error::Upstream {
            status: 400,
            message: "INVALID PROPERTY CODE".to_string(),
            errors: vec![UpstreamErrorDetail {
                code: Some(1257),
                title: Some("INVALID PROPERTY CODE".to_string()),
                detail: Some(format!("invalid property codes: {}", ids.join(", "))),
                source: Some(UpstreamErrorSource {
                    parameter: Some("hotelIds".to_string()),
                    pointer: None,
                }),
            }],
        }
    }

    fn candidate_for(id: &str) -> HotelCandidate {
        HotelCandidate {
            hotel_id: id.to_string(),
            name: format!("Hotel {id}"),
            city_code: "TYO".to_string(),
            available: true,
            offers: vec![HotelOffer {
                id: format!("OF-{id}"),
                check_in_date: date(2024, 7, 11),
                check_out_date: date(2024, 7, 28),
                price: Price {
                    total: 150.0,
                    currency: "USD".to_string(),
                },
            }],
            comparison_price: None,
        }
    }

    #[async_trait]
    impl TravelApi for ScriptedApi {
        async fn flight_offers(&self, _query: &FlightQuery) -> Result<Vec<FlightOffer>> {
            Ok(Vec::new())
        }

        async fn hotels_in_city(&self, _city_code: &str) -> Result<Vec<HotelRef>> {
            Ok(self
                .hotel_ids
                .iter()
                .map(|id| HotelRef {
                    hotel_id: id.clone(),
                    name: format!("Hotel {id}"),
                })
                .collect())
        }

        async fn hotel_offers(
            &self,
            hotel_ids: &[String],
            _check_in: NaiveDate,
            _check_out: NaiveDate,
            _adults: u32,
        ) -> Result<Vec<HotelCandidate>> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(hotel_ids.to_vec());
                calls.len() - 1
            };
            if let Some(slot) = self.failures.lock().unwrap().get_mut(index) {
                if let Some(err) = slot.take() {
                    return Err(err);
                }
            }
            Ok(hotel_ids.iter().map(|id| candidate_for(id)).collect())
        }

        async fn autocomplete_locations(
            &self,
            _keyword: &str,
            _sub_type: Option<&str>,
        ) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn tokyo_criteria(start: NaiveDate, end: NaiveDate) -> SearchCriteria {
        SearchCriteria {
            max_price: 2000.0,
            flexible_max_price: false,
            origin_location_code: "CDG".to_string(),
            adults: 3,
            children: 0,
            destination_location: true,
            destination_location_code: Some("TYO".to_string()),
            continent: None,
            start_date: start,
            end_date: end,
            travel_type: String::new(),
            travel_genre: String::new(),
            activity_pace: String::new(),
            keywords: String::new(),
        }
    }

    #[tokio::test]
    async fn test_45_day_stay_with_25_ids_issues_four_calls() {
        let api = Arc::new(ScriptedApi::new(25));
        let gateway = SearchGateway::new(api.clone(), 20, 30, 50);
        let criteria = tokyo_criteria(date(2024, 7, 11), date(2024, 8, 25));

        let candidates = gateway.search_hotels(&criteria).await.unwrap();

        // 2 date segments (30 + 15 nights) x 2 id chunks (20 + 5)
        assert_eq!(api.call_count(), 4);
        assert_eq!(api.call(0).len(), 20);
        assert_eq!(api.call(1).len(), 5);
        assert_eq!(api.call(2).len(), 20);
        assert_eq!(api.call(3).len(), 5);
        // every (segment, chunk) pair contributed its candidates
        assert_eq!(candidates.len(), 50);
    }

    #[tokio::test]
    async fn test_invalid_ids_are_retried_without_them_and_merged() {
        let api = Arc::new(
            ScriptedApi::new(25).fail_call(0, invalid_id_error(&["HT003", "HT007"])),
        );
        let gateway = SearchGateway::new(api.clone(), 20, 30, 50);
        let criteria = tokyo_criteria(date(2024, 7, 11), date(2024, 7, 28));

        let candidates = gateway.search_hotels(&criteria).await.unwrap();

        // original call + retry + second chunk
        assert_eq!(api.call_count(), 3);
        let retry = api.call(1);
        assert_eq!(retry.len(), 18);
        assert!(!retry.contains(&"HT003".to_string()));
        assert!(!retry.contains(&"HT007".to_string()));
        // retry results merged with the untouched second chunk
        assert_eq!(candidates.len(), 23);
    }

    #[tokio::test]
    async fn test_exclusion_set_carries_into_later_segments() {
        let api = Arc::new(
            ScriptedApi::new(10).fail_call(0, invalid_id_error(&["HT001"])),
        );
        let gateway = SearchGateway::new(api.clone(), 20, 30, 50);
        // 45 nights -> two segments, one chunk each
        let criteria = tokyo_criteria(date(2024, 7, 11), date(2024, 8, 25));

        gateway.search_hotels(&criteria).await.unwrap();

        // calls: segment 1 (fails), segment 1 retry, segment 2
        assert_eq!(api.call_count(), 3);
        let second_segment = api.call(2);
        assert_eq!(second_segment.len(), 9);
        assert!(!second_segment.contains(&"HT001".to_string()));
    }

    #[tokio::test]
    async fn test_failed_retry_skips_chunk_but_keeps_other_results() {
        let api = Arc::new(
            ScriptedApi::new(25)
                .fail_call(0, invalid_id_error(&["HT000"]))
                .fail_call(1, Error::upstream(500, "still broken")),
        );
        let gateway = SearchGateway::new(api.clone(), 20, 30, 50);
        let criteria = tokyo_criteria(date(2024, 7, 11), date(2024, 7, 28));

        let candidates = gateway.search_hotels(&criteria).await.unwrap();

        // first chunk lost entirely, second chunk intact
        assert_eq!(api.call_count(), 3);
        assert_eq!(candidates.len(), 5);
    }

    #[tokio::test]
    async fn test_non_invalid_id_upstream_error_propagates() {
        let api = Arc::new(ScriptedApi::new(5).fail_call(0, Error::upstream(503, "down")));
        let gateway = SearchGateway::new(api, 20, 30, 50);
        let criteria = tokyo_criteria(date(2024, 7, 11), date(2024, 7, 28));

        let result = gateway.search_hotels(&criteria).await;
        assert!(matches!(result, Err(Error::Upstream { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_empty_city_resolution_is_no_hotels_found() {
        let api = Arc::new(ScriptedApi::new(0));
        let gateway = SearchGateway::new(api, 20, 30, 50);
        let criteria = tokyo_criteria(date(2024, 7, 11), date(2024, 7, 28));

        let result = gateway.search_hotels(&criteria).await;
        assert!(matches!(result, Err(Error::NoHotelsFound { .. })));
    }
}
