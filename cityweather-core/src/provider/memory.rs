//! In-memory places provider.
//!
//! Serves canned nearby-search and detail results with optional artificial
//! latency and failures. Delays go through `tokio::time`, so they follow a
//! paused test clock.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;

use crate::error::PlacesError;

use super::{NearbyRequest, PlaceDetails, PlaceSummary, PlacesProvider};

#[derive(Debug, Default)]
pub struct InMemoryPlacesProvider {
    load_delay: Duration,
    load_failure: Option<String>,
    nearby: HashMap<String, Vec<PlaceSummary>>,
    nearby_delays: HashMap<String, Duration>,
    failing_types: Vec<String>,
    details: HashMap<String, PlaceDetails>,
    details_delays: HashMap<String, Duration>,
    loaded: AtomicBool,
    load_calls: AtomicUsize,
    nearby_calls: AtomicUsize,
    details_calls: AtomicUsize,
}

impl InMemoryPlacesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn with_load_failure(mut self, message: impl Into<String>) -> Self {
        self.load_failure = Some(message.into());
        self
    }

    /// Results returned for nearby-searches with the given type tag.
    pub fn with_nearby(mut self, place_type: &str, results: Vec<PlaceSummary>) -> Self {
        self.nearby.insert(place_type.to_string(), results);
        self
    }

    pub fn with_nearby_delay(mut self, place_type: &str, delay: Duration) -> Self {
        self.nearby_delays.insert(place_type.to_string(), delay);
        self
    }

    pub fn with_failing_type(mut self, place_type: &str) -> Self {
        self.failing_types.push(place_type.to_string());
        self
    }

    /// Place ids without details fail their lookup with `NOT_FOUND`.
    pub fn with_details(mut self, details: PlaceDetails) -> Self {
        self.details.insert(details.place_id.clone(), details);
        self
    }

    pub fn with_details_delay(mut self, place_id: &str, delay: Duration) -> Self {
        self.details_delays.insert(place_id.to_string(), delay);
        self
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn nearby_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst)
    }

    pub fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesProvider for InMemoryPlacesProvider {
    async fn load_sdk(&self) -> Result<(), PlacesError> {
        if self.loaded.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        if let Some(message) = &self.load_failure {
            return Err(PlacesError::SdkLoadError(message.clone()));
        }

        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.nearby_delays.get(&request.place_type) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing_types.contains(&request.place_type) {
            return Err(PlacesError::Status("UNKNOWN_ERROR".into()));
        }

        Ok(self.nearby.get(&request.place_type).cloned().unwrap_or_default())
    }

    async fn get_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.details_delays.get(place_id) {
            tokio::time::sleep(*delay).await;
        }

        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| PlacesError::Status("NOT_FOUND".into()))
    }
}
