//! Weather lookup controller: current conditions plus a 24-hour forecast.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::LookupError,
    model::CityWeather,
    navigation::Navigation,
    provider::WeatherProvider,
};

/// Forecast slots shown: 24 hours at 3-hour spacing.
pub const FORECAST_POINTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// What the lookup view renders. While a search is loading, the previous
/// result (or error) stays in place until the new one resolves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LookupView {
    pub status: LookupStatus,
    pub input: String,
    pub weather: Option<CityWeather>,
    pub error: Option<String>,
}

pub struct WeatherLookup {
    provider: Arc<dyn WeatherProvider>,
    state: watch::Sender<LookupView>,
    generation: AtomicU64,
    active: CancellationToken,
}

impl std::fmt::Debug for WeatherLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherLookup")
            .field("provider", &self.provider)
            .field("status", &self.state.borrow().status)
            .finish_non_exhaustive()
    }
}

impl WeatherLookup {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let (state, _) = watch::channel(LookupView::default());
        Self {
            provider,
            state,
            generation: AtomicU64::new(0),
            active: CancellationToken::new(),
        }
    }

    pub fn view(&self) -> LookupView {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupView> {
        self.state.subscribe()
    }

    pub fn teardown(&self) {
        self.active.cancel();
    }

    /// The user edited the search box. A settled result goes back to Idle but stays visible.
    pub fn edit_input(&self, text: &str) {
        self.update(|view| {
            view.input = text.to_string();
            if matches!(view.status, LookupStatus::Loaded | LookupStatus::Errored) {
                view.status = LookupStatus::Idle;
            }
        });
    }

    /// Look up `city`. Blank input is ignored. Returns the resulting status.
    ///
    /// The forecast is only requested once current conditions succeeded; a
    /// failure of either request discards the whole attempt.
    pub async fn search(&self, city: &str) -> LookupStatus {
        let city = city.trim();
        if city.is_empty() {
            return self.state.borrow().status;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(|view| {
            view.input = city.to_string();
            view.status = LookupStatus::Loading;
        });

        let result = tokio::select! {
            biased;

            () = self.active.cancelled() => {
                debug!(city, "lookup abandoned after teardown");
                return LookupStatus::Loading;
            }
            result = self.fetch(city) => result,
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(city, "a newer search superseded this one");
            return self.state.borrow().status;
        }

        match result {
            Ok(weather) => {
                info!(city, forecast = weather.forecast.len(), "weather loaded");
                self.update(|view| {
                    view.status = LookupStatus::Loaded;
                    view.weather = Some(weather);
                    view.error = None;
                });
            }
            Err(err) => {
                warn!(city, %err, "weather lookup failed");
                self.update(|view| {
                    view.status = LookupStatus::Errored;
                    view.weather = None;
                    view.error = Some(err.user_message());
                });
            }
        }

        self.state.borrow().status
    }

    async fn fetch(&self, city: &str) -> Result<CityWeather, LookupError> {
        let snapshot = self.provider.current(city).await?;

        let mut forecast = self.provider.forecast(city).await?;
        forecast.truncate(FORECAST_POINTS);

        Ok(CityWeather { snapshot, forecast })
    }

    /// Navigation to the places view for the loaded city, if any lookup succeeded.
    pub fn view_places(&self) -> Option<Navigation> {
        let view = self.state.borrow();
        let snapshot = &view.weather.as_ref()?.snapshot;
        Some(Navigation::places(snapshot.city_name.clone(), Some(snapshot.coords)))
    }

    fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut LookupView),
    {
        if self.active.is_cancelled() {
            return;
        }
        self.state.send_modify(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, ForecastPoint, WeatherSnapshot};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::{collections::HashMap, sync::atomic::AtomicUsize, time::Duration};

    #[derive(Debug, Default)]
    struct FakeWeather {
        missing: Vec<String>,
        forecast_len: usize,
        forecast_fails: bool,
        delays: Mutex<HashMap<String, Duration>>,
        current_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
    }

    impl FakeWeather {
        fn with_forecast(len: usize) -> Self {
            Self {
                forecast_len: len,
                ..Default::default()
            }
        }

        fn delay(&self, city: &str, delay: Duration) {
            self.delays.lock().insert(city.to_string(), delay);
        }
    }

    fn snapshot(city: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            city_name: city.to_string(),
            country_code: "GB".into(),
            coords: Coordinates::new(51.51, -0.13),
            temperature_c: 12.3,
            feels_like_c: 10.9,
            humidity_pct: 81,
            wind_speed_mps: 4.1,
            description: "overcast clouds".into(),
        }
    }

    fn point(i: usize) -> ForecastPoint {
        ForecastPoint {
            timestamp: 1_700_000_000 + (i as i64) * 10_800,
            temperature_c: 10.0 + i as f64,
            condition: "Clouds".into(),
            precipitation_mm: None,
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn current(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delays.lock().get(city).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if self.missing.iter().any(|m| m == city) {
                return Err(LookupError::CityNotFound);
            }
            Ok(snapshot(city))
        }

        async fn forecast(&self, _city: &str) -> Result<Vec<ForecastPoint>, LookupError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            if self.forecast_fails {
                return Err(LookupError::Network("connection reset".into()));
            }
            Ok((0..self.forecast_len).map(point).collect())
        }
    }

    fn lookup(fake: FakeWeather) -> (Arc<FakeWeather>, WeatherLookup) {
        let fake = Arc::new(fake);
        (fake.clone(), WeatherLookup::new(fake))
    }

    #[tokio::test]
    async fn london_forecast_is_cut_to_eight_points() {
        let (_, lookup) = lookup(FakeWeather::with_forecast(10));

        let status = lookup.search("London").await;

        assert_eq!(status, LookupStatus::Loaded);
        let weather = lookup.view().weather.expect("loaded weather");
        assert_eq!(weather.snapshot.city_name, "London");
        assert_eq!(weather.forecast, (0..8).map(point).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn short_forecast_is_kept_as_is() {
        let (_, lookup) = lookup(FakeWeather::with_forecast(0));

        assert_eq!(lookup.search("London").await, LookupStatus::Loaded);
        assert!(lookup.view().weather.expect("loaded").forecast.is_empty());
    }

    #[tokio::test]
    async fn city_not_found_skips_forecast() {
        let (fake, lookup) = lookup(FakeWeather {
            missing: vec!["Atlantis".into()],
            ..FakeWeather::with_forecast(8)
        });

        let status = lookup.search("Atlantis").await;

        let view = lookup.view();
        assert_eq!(status, LookupStatus::Errored);
        assert_eq!(view.error.as_deref(), Some("City not found"));
        assert_eq!(view.weather, None);
        assert_eq!(fake.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn forecast_failure_discards_current_conditions() {
        let (_, lookup) = lookup(FakeWeather {
            forecast_fails: true,
            ..FakeWeather::with_forecast(8)
        });

        assert_eq!(lookup.search("London").await, LookupStatus::Errored);

        let view = lookup.view();
        assert_eq!(view.weather, None);
        assert_eq!(
            view.error.as_deref(),
            Some("Failed to fetch weather data. Please try again.")
        );
        assert!(lookup.view_places().is_none());
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let (fake, lookup) = lookup(FakeWeather::with_forecast(8));

        assert_eq!(lookup.search("   ").await, LookupStatus::Idle);
        assert_eq!(fake.current_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn view_places_carries_city_and_coordinates() {
        let (_, lookup) = lookup(FakeWeather::with_forecast(8));
        assert!(lookup.view_places().is_none());

        lookup.search("London").await;

        let nav = lookup.view_places().expect("navigation after success");
        assert_eq!(nav.city_name(), Some("London"));
        assert_eq!(nav.coords, Some(Coordinates::new(51.51, -0.13)));
    }

    #[tokio::test]
    async fn editing_input_returns_to_idle() {
        let (_, lookup) = lookup(FakeWeather::with_forecast(8));
        lookup.search("London").await;

        lookup.edit_input("Par");

        let view = lookup.view();
        assert_eq!(view.status, LookupStatus::Idle);
        assert_eq!(view.input, "Par");
        assert!(view.weather.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_result_stays_visible_while_loading() {
        let (fake, lookup) = lookup(FakeWeather::with_forecast(8));
        lookup.search("London").await;

        fake.delay("Paris", Duration::from_secs(5));
        let lookup = Arc::new(lookup);
        let task = tokio::spawn({
            let lookup = lookup.clone();
            async move { lookup.search("Paris").await }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        let view = lookup.view();
        assert_eq!(view.status, LookupStatus::Loading);
        assert_eq!(view.weather.expect("stale result").snapshot.city_name, "London");

        assert_eq!(task.await.expect("search task"), LookupStatus::Loaded);
        assert_eq!(
            lookup.view().weather.expect("new result").snapshot.city_name,
            "Paris"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_state_updates() {
        let fake = FakeWeather::with_forecast(8);
        fake.delay("London", Duration::from_secs(5));
        let (_, lookup) = lookup(fake);
        let lookup = Arc::new(lookup);

        let task = tokio::spawn({
            let lookup = lookup.clone();
            async move { lookup.search("London").await }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        lookup.teardown();
        task.await.expect("search task");

        let view = lookup.view();
        assert_eq!(view.status, LookupStatus::Loading);
        assert!(view.weather.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn latest_search_wins_over_slower_earlier_one() {
        let fake = FakeWeather::with_forecast(8);
        fake.delay("London", Duration::from_secs(5));
        fake.delay("Paris", Duration::from_secs(1));
        let (_, lookup) = lookup(fake);
        let lookup = Arc::new(lookup);

        let slow = tokio::spawn({
            let lookup = lookup.clone();
            async move { lookup.search("London").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(lookup.search("Paris").await, LookupStatus::Loaded);
        slow.await.expect("london search");

        let view = lookup.view();
        assert_eq!(view.status, LookupStatus::Loaded);
        assert_eq!(view.input, "Paris");
        assert_eq!(view.weather.expect("result").snapshot.city_name, "Paris");
    }
}
