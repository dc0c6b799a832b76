//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather and places provider abstractions with their HTTP implementations
//! - The weather lookup and places browser controllers
//! - Shared domain models and navigation payloads
//!
//! It is used by `cityweather-cli`, but can also back other front ends.

pub mod config;
pub mod error;
pub mod model;
pub mod navigation;
pub mod places;
pub mod provider;
pub mod weather;

pub use config::{Config, PlacesSettings, ProviderConfig};
pub use error::{LookupError, PlacesError};
pub use model::{
    CityWeather, ConditionIcon, Coordinates, ForecastPoint, Place, Rating, WeatherSnapshot,
};
pub use navigation::{Navigation, Route};
pub use places::{PlaceCategory, PlacesBrowser, PlacesView};
pub use provider::{PlacesProvider, ProviderId, WeatherProvider};
pub use weather::{LookupStatus, LookupView, WeatherLookup};
