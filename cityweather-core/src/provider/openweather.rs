use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    error::LookupError,
    model::{Coordinates, ForecastPoint, WeatherSnapshot},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// GET `{base}/{endpoint}?q={city}&units=metric&APPID={key}` and return the
    /// status together with the decoded JSON body.
    async fn fetch(&self, endpoint: &str, city: &str) -> Result<(StatusCode, Value), LookupError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("units", "metric"),
                ("APPID", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(json) => Ok((status, json)),
            Err(_) if status == StatusCode::NOT_FOUND => Ok((status, Value::Null)),
            Err(e) if status.is_success() => Err(LookupError::Parse(e.to_string())),
            Err(_) => Err(LookupError::Network(format!(
                "OpenWeather {endpoint} request failed with status {status}: {}",
                truncate_body(&body)
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize, Default)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

impl From<OwCurrentResponse> for WeatherSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        let description = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        WeatherSnapshot {
            city_name: parsed.name,
            country_code: parsed.sys.country,
            coords: Coordinates::new(parsed.coord.lat, parsed.coord.lon),
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            description,
        }
    }
}

impl From<OwForecastEntry> for ForecastPoint {
    fn from(entry: OwForecastEntry) -> Self {
        let condition = entry
            .weather
            .first()
            .map(|w| w.main.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        ForecastPoint {
            timestamp: entry.dt,
            temperature_c: entry.main.temp,
            condition,
            // A rain block without a 3h volume still means "some rain".
            precipitation_mm: entry.rain.map(|r| r.three_hours.unwrap_or(0.0)),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
        let (status, body) = self.fetch("weather", city).await?;

        if status == StatusCode::NOT_FOUND || is_not_found(&body) {
            debug!("OpenWeather reported city not found");
            return Err(LookupError::CityNotFound);
        }

        if !status.is_success() {
            return Err(LookupError::Network(format!(
                "OpenWeather current request failed with status {status}: {}",
                truncate_body(&body.to_string()),
            )));
        }

        let parsed: OwCurrentResponse = serde_json::from_value(body)
            .map_err(|e| LookupError::Parse(format!("OpenWeather current JSON: {e}")))?;

        Ok(parsed.into())
    }

    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastPoint>, LookupError> {
        let (status, body) = self.fetch("forecast", city).await?;

        if !status.is_success() {
            return Err(LookupError::Network(format!(
                "OpenWeather forecast request failed with status {status}: {}",
                truncate_body(&body.to_string()),
            )));
        }

        let parsed: OwForecastResponse = serde_json::from_value(body)
            .map_err(|e| LookupError::Parse(format!("OpenWeather forecast JSON: {e}")))?;

        debug!(entries = parsed.list.len(), "OpenWeather forecast received");
        Ok(parsed.list.into_iter().map(ForecastPoint::from).collect())
    }
}

/// `cod` arrives as the string "404" on unknown cities, but as a number elsewhere.
fn is_not_found(body: &Value) -> bool {
    match body.get("cod") {
        Some(Value::String(code)) => code == "404",
        Some(Value::Number(code)) => code.as_u64() == Some(404),
        _ => false,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
