use crate::{
    Config,
    error::{LookupError, PlacesError},
    model::{Coordinates, ForecastPoint, WeatherSnapshot},
    provider::{google_places::GooglePlacesProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod google_places;
pub mod memory;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    GooglePlaces,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::GooglePlaces => "googleplaces",
        }
    }

    /// Environment variable that overrides the configured API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::GooglePlaces => "GOOGLE_PLACES_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::GooglePlaces]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "googleplaces" | "google" => Ok(ProviderId::GooglePlaces),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, googleplaces."
            )),
        }
    }
}

/// Source of current conditions and forecasts, queried by city name in metric units.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, LookupError>;

    /// Full forecast series in provider order.
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastPoint>, LookupError>;
}

/// Parameters of a single nearby-search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub location: Coordinates,
    pub radius_m: u32,
    /// Provider place-type tag, e.g. `restaurant` or `lodging`.
    pub place_type: String,
}

/// Candidate returned by a nearby-search.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: String,
    pub types: Vec<String>,
}

/// Full attributes of one place.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub address: Option<String>,
    pub location: Coordinates,
    pub types: Vec<String>,
    pub photo: Option<String>,
}

/// Places capability: readiness, nearby-search and detail lookup.
///
/// `load_sdk` must be idempotent: once it has succeeded, later calls resolve
/// immediately without doing the work again.
#[async_trait]
pub trait PlacesProvider: Send + Sync + Debug {
    async fn load_sdk(&self) -> Result<(), PlacesError>;

    /// An empty result (`ZERO_RESULTS`) is `Ok(vec![])`, not an error.
    async fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> Result<Vec<PlaceSummary>, PlacesError>;

    async fn get_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;
}

fn api_key_for(id: ProviderId, config: &Config) -> anyhow::Result<String> {
    config.provider_api_key(id).map(str::to_owned).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `cityweather configure {id}` or set {}.",
            id.env_var()
        )
    })
}

/// Construct the weather provider from config.
pub fn weather_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = ProviderId::OpenWeather;
    let api_key = api_key_for(id, config)?;

    let provider = match config.provider_base_url(id) {
        Some(base) => OpenWeatherProvider::with_base_url(api_key, base.to_owned()),
        None => OpenWeatherProvider::new(api_key),
    };

    Ok(Arc::new(provider))
}

/// Construct the places provider from config.
pub fn places_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn PlacesProvider>> {
    let id = ProviderId::GooglePlaces;
    let api_key = api_key_for(id, config)?;

    let provider = match config.provider_base_url(id) {
        Some(base) => GooglePlacesProvider::with_base_url(api_key, base.to_owned()),
        None => GooglePlacesProvider::new(api_key),
    };

    Ok(Arc::new(provider))
}
