use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::places::PlaceCategory;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `(0, 0)` stands for "no coordinates provided", not a real location.
    pub fn is_sentinel(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }

    /// Treat absent and sentinel coordinates the same way.
    pub fn usable(coords: Option<Self>) -> Option<Self> {
        coords.filter(|c| !c.is_sentinel())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}°N, {:.2}°E", self.lat, self.lon)
    }
}

/// Current conditions for one city, as returned by a single provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub country_code: String,
    pub coords: Coordinates,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub description: String,
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Epoch seconds.
    pub timestamp: i64,
    pub temperature_c: f64,
    /// Short condition keyword such as "Rain" or "Clouds".
    pub condition: String,
    pub precipitation_mm: Option<f64>,
}

impl ForecastPoint {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Local wall-clock time as `HH:MM`.
    pub fn local_time_label(&self) -> String {
        self.time()
            .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }

    pub fn precipitation_label(&self) -> String {
        match self.precipitation_mm {
            Some(mm) => format!("{mm:.1} mm"),
            None => "No rain".to_string(),
        }
    }

    pub fn icon(&self) -> ConditionIcon {
        ConditionIcon::for_condition(&self.condition)
    }
}

/// Icon shown next to a forecast slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionIcon {
    Droplets,
    Cloud,
    Wind,
    Sun,
}

impl ConditionIcon {
    pub fn for_condition(condition: &str) -> Self {
        let condition = condition.to_lowercase();
        if condition.contains("rain") || condition.contains("drizzle") {
            Self::Droplets
        } else if condition.contains("cloud") {
            Self::Cloud
        } else if condition.contains("wind") {
            Self::Wind
        } else {
            Self::Sun
        }
    }
}

/// Result of a successful lookup: the snapshot plus the near-term forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeather {
    pub snapshot: WeatherSnapshot,
    pub forecast: Vec<ForecastPoint>,
}

/// Rating with one fraction digit, or absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating(Option<f64>);

impl Rating {
    pub fn new(value: Option<f64>) -> Self {
        Self(value.map(round_one_decimal))
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.1}"),
            None => f.write_str("N/A"),
        }
    }
}

/// A point of interest near the queried city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Provider place id, or `mock-N` for generated entries.
    pub id: String,
    pub name: String,
    pub category: PlaceCategory,
    pub rating: Rating,
    pub address: String,
    /// Kilometers from the query coordinates, one fraction digit.
    pub distance_km: f64,
    pub image: String,
}

impl Place {
    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with("mock-")
    }
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_coordinates_are_not_usable() {
        assert!(Coordinates::new(0.0, 0.0).is_sentinel());
        assert_eq!(Coordinates::usable(Some(Coordinates::new(0.0, 0.0))), None);
        assert_eq!(Coordinates::usable(None), None);

        let london = Coordinates::new(51.51, -0.13);
        assert_eq!(Coordinates::usable(Some(london)), Some(london));
    }

    #[test]
    fn coordinates_render_with_two_decimals() {
        assert_eq!(Coordinates::new(51.5074, -0.1278).to_string(), "51.51°N, -0.13°E");
    }

    #[test]
    fn condition_icon_follows_keyword_priority() {
        assert_eq!(ConditionIcon::for_condition("Rain"), ConditionIcon::Droplets);
        assert_eq!(ConditionIcon::for_condition("Drizzle"), ConditionIcon::Droplets);
        assert_eq!(ConditionIcon::for_condition("Clouds"), ConditionIcon::Cloud);
        assert_eq!(ConditionIcon::for_condition("windy"), ConditionIcon::Wind);
        assert_eq!(ConditionIcon::for_condition("Clear"), ConditionIcon::Sun);
    }

    #[test]
    fn precipitation_label() {
        let mut point = ForecastPoint {
            timestamp: 1_700_000_000,
            temperature_c: 11.2,
            condition: "Rain".into(),
            precipitation_mm: Some(0.42),
        };
        assert_eq!(point.precipitation_label(), "0.4 mm");

        point.precipitation_mm = None;
        assert_eq!(point.precipitation_label(), "No rain");
    }

    #[test]
    fn rating_rounds_and_renders_missing() {
        assert_eq!(Rating::new(Some(4.46)).value(), Some(4.5));
        assert_eq!(Rating::new(Some(4.46)).to_string(), "4.5");
        assert_eq!(Rating::new(None).to_string(), "N/A");
    }
}
