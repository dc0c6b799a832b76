use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{
    Config, Coordinates, LookupStatus, PlaceCategory, PlacesBrowser, PlacesProvider, ProviderId,
    WeatherLookup,
    provider::{
        google_places::GooglePlacesProvider, places_provider_from_config,
        weather_provider_from_config,
    },
};
use inquire::{InquireError, Password, Select, Text};
use tracing::warn;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather and nearby places")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider.
    Configure {
        /// Provider short name: "openweather" or "googleplaces".
        provider: String,
    },

    /// Show current weather and the 24-hour forecast for a city.
    Show {
        /// City name.
        city: String,
    },

    /// List places near a city.
    Places {
        /// City name.
        city: String,

        /// Latitude of the search center; looked up from the weather provider if absent.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the search center.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Category filter: all, restaurant, cafe, hotel, attraction, shop, other.
        #[arg(long, default_value = "all")]
        category: PlaceCategory,
    },

    /// Search cities and browse their places interactively.
    Browse,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { city } => show(&city).await,
            Command::Places {
                city,
                lat,
                lon,
                category,
            } => {
                let coords = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                places(&city, coords, category).await
            }
            Command::Browse => browse().await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let mut cfg = Config::load_file()?;
    cfg.upsert_provider_api_key(id, api_key.trim().to_string());
    cfg.save()?;

    println!("Saved API key for {id} to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let lookup = WeatherLookup::new(weather_provider_from_config(&cfg)?);

    lookup.search(city).await;
    let view = lookup.view();

    match (view.weather, view.error) {
        (Some(weather), _) => {
            println!("{}", render::weather(&weather));
            Ok(())
        }
        (None, Some(error)) => bail!(error),
        (None, None) => bail!("Please enter a city name"),
    }
}

async fn places(
    city: &str,
    coords: Option<Coordinates>,
    category: PlaceCategory,
) -> anyhow::Result<()> {
    let cfg = Config::load()?;

    let coords = match coords {
        Some(coords) => Some(coords),
        None => resolve_coordinates(&cfg, city).await,
    };

    let browser = PlacesBrowser::new(places_provider(&cfg), cfg.places.clone());
    browser.initialize(city, coords).await;
    browser.set_category(category);

    println!("{}", render::places(&browser.view()));
    Ok(())
}

/// Coordinates of `city` according to the weather provider, as the lookup
/// view would hand them over.
async fn resolve_coordinates(cfg: &Config, city: &str) -> Option<Coordinates> {
    let provider = match weather_provider_from_config(cfg) {
        Ok(provider) => provider,
        Err(err) => {
            warn!("cannot resolve coordinates: {err:#}");
            return None;
        }
    };

    let lookup = WeatherLookup::new(provider);
    lookup.search(city).await;
    lookup.view_places().and_then(|nav| nav.coords)
}

/// Without a key the provider fails to load, which the browser turns into placeholders.
fn places_provider(cfg: &Config) -> Arc<dyn PlacesProvider> {
    places_provider_from_config(cfg).unwrap_or_else(|err| {
        warn!("{err:#}");
        Arc::new(GooglePlacesProvider::new(String::new()))
    })
}

async fn browse() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let lookup = WeatherLookup::new(weather_provider_from_config(&cfg)?);
    let places_provider = places_provider(&cfg);

    loop {
        let Some(city) = prompt(Text::new("City:").prompt())? else {
            break;
        };
        lookup.edit_input(&city);

        if lookup.search(&city).await != LookupStatus::Loaded {
            if let Some(error) = lookup.view().error {
                eprintln!("{error}");
            }
            continue;
        }

        if let Some(weather) = lookup.view().weather {
            println!("{}", render::weather(&weather));
        }

        let options = vec!["View places", "Search another city", "Quit"];
        match prompt(Select::new("Next:", options).prompt())? {
            Some("View places") => {}
            Some("Search another city") => continue,
            _ => break,
        }

        let Some(nav) = lookup.view_places() else {
            continue;
        };
        let city_name = nav.city_name().unwrap_or(&city).to_string();
        println!("{}", render::route(&nav));

        let browser = PlacesBrowser::new(places_provider.clone(), cfg.places.clone());
        browser.initialize(&city_name, nav.coords).await;
        println!("{}", render::places(&browser.view()));

        loop {
            let mut choices: Vec<String> = PlaceCategory::ALL
                .iter()
                .map(|c| c.display_name().to_string())
                .collect();
            choices.push("Back".to_string());

            let Some(choice) = prompt(Select::new("Category:", choices).prompt())? else {
                break;
            };
            let Some(category) = PlaceCategory::ALL
                .into_iter()
                .find(|c| c.display_name() == choice)
            else {
                break;
            };

            browser.set_category(category);
            println!("{}", render::places(&browser.view()));
        }

        browser.teardown();
    }

    Ok(())
}

/// Cancelled prompts (Esc / Ctrl-C) end the interactive session quietly.
fn prompt<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
