use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OnceCell, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::PlacesSettings,
    error::PlacesError,
    model::{Coordinates, Place},
    places::{
        PlaceCategory, filter_by_category,
        placeholder::{RandomSource, ThreadRandom, generate_placeholders},
        search::{SearchFailure, find_places},
    },
    provider::PlacesProvider,
};

/// Everything the places view renders. `error`, `notice` and `places` are
/// independent: fallback places are shown together with the error that caused them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacesView {
    pub city_name: String,
    pub loading: bool,
    pub error: Option<String>,
    /// Set whenever placeholder places are being shown.
    pub notice: Option<String>,
    pub places: Vec<Place>,
    pub category: PlaceCategory,
}

impl Default for PlacesView {
    fn default() -> Self {
        Self {
            city_name: String::new(),
            loading: false,
            error: None,
            notice: None,
            places: Vec::new(),
            category: PlaceCategory::All,
        }
    }
}

impl PlacesView {
    /// Places matching the selected category.
    pub fn visible_places(&self) -> Vec<Place> {
        filter_by_category(&self.places, self.category)
    }

    pub fn is_fallback(&self) -> bool {
        self.notice.is_some()
    }
}

/// What a finished pipeline run wants to show.
#[derive(Debug)]
struct Outcome {
    places: Vec<Place>,
    error: Option<String>,
    notice: Option<String>,
}

/// Controller behind the places view of one city.
pub struct PlacesBrowser {
    provider: Arc<dyn PlacesProvider>,
    settings: PlacesSettings,
    random: Mutex<Box<dyn RandomSource>>,
    sdk: OnceCell<()>,
    state: watch::Sender<PlacesView>,
    active: CancellationToken,
}

impl std::fmt::Debug for PlacesBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesBrowser")
            .field("provider", &self.provider)
            .field("settings", &self.settings)
            .field("sdk_loaded", &self.sdk.initialized())
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl PlacesBrowser {
    pub fn new(provider: Arc<dyn PlacesProvider>, settings: PlacesSettings) -> Self {
        let (state, _) = watch::channel(PlacesView::default());
        Self {
            provider,
            settings,
            random: Mutex::new(Box::new(ThreadRandom)),
            sdk: OnceCell::new(),
            state,
            active: CancellationToken::new(),
        }
    }

    /// Replace the randomness used for placeholder places.
    pub fn with_random(self, random: Box<dyn RandomSource>) -> Self {
        Self {
            random: Mutex::new(random),
            ..self
        }
    }

    pub fn view(&self) -> PlacesView {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlacesView> {
        self.state.subscribe()
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_cancelled()
    }

    /// Leave the view. Nothing still in flight is applied afterwards.
    pub fn teardown(&self) {
        debug!("places view torn down");
        self.active.cancel();
    }

    /// Select the category filter. Never refetches.
    pub fn set_category(&self, category: PlaceCategory) {
        self.update(|view| view.category = category);
    }

    /// Load places around `coords`, within the global fallback budget.
    ///
    /// When the budget elapses first, placeholders are shown and any later
    /// result of this run is discarded.
    pub async fn initialize(&self, city_name: &str, coords: Option<Coordinates>) {
        self.update(|view| {
            view.city_name = city_name.to_string();
            view.loading = true;
            view.error = None;
            view.notice = None;
        });

        let budget = self.settings.fallback_timeout();

        tokio::select! {
            biased;

            () = self.active.cancelled() => {
                debug!(city = city_name, "places pipeline abandoned after teardown");
            }
            () = tokio::time::sleep(budget) => {
                warn!(
                    city = city_name,
                    ?budget,
                    "places pipeline over budget, showing placeholders"
                );
                let outcome = Outcome {
                    places: self.placeholders(city_name),
                    error: None,
                    notice: Some(format!(
                        "Loading places in {city_name} took too long. Showing sample places instead."
                    )),
                };
                self.apply(outcome);
            }
            outcome = self.run(city_name, coords) => self.apply(outcome),
        }
    }

    async fn run(&self, city_name: &str, coords: Option<Coordinates>) -> Outcome {
        if let Err(err) = self.load_sdk().await {
            warn!(%err, "places service unavailable, showing placeholders");
            return Outcome {
                places: self.placeholders(city_name),
                error: Some(format!("Could not load the places service: {err}")),
                notice: Some("Showing sample places while live data is unavailable.".to_string()),
            };
        }

        let Some(origin) = Coordinates::usable(coords) else {
            info!(city = city_name, "no coordinates, skipping nearby-search");
            return Outcome {
                places: self.placeholders(city_name),
                error: None,
                notice: Some(format!(
                    "No coordinates were provided for {city_name}. Showing sample places instead."
                )),
            };
        };

        match find_places(self.provider.as_ref(), origin, &self.settings).await {
            Ok(places) => {
                info!(city = city_name, count = places.len(), "nearby places loaded");
                Outcome {
                    places,
                    error: None,
                    notice: None,
                }
            }
            Err(failure) => Outcome {
                places: self.placeholders(city_name),
                error: None,
                notice: Some(fallback_notice(failure, city_name)),
            },
        }
    }

    /// At most one load per view; later calls resolve immediately once it succeeded.
    async fn load_sdk(&self) -> Result<(), PlacesError> {
        let budget = self.settings.sdk_load_timeout();

        self.sdk
            .get_or_try_init(|| async {
                match tokio::time::timeout(budget, self.provider.load_sdk()).await {
                    Ok(loaded) => loaded,
                    Err(_) => Err(PlacesError::SdkLoadTimeout(budget)),
                }
            })
            .await
            .map(|_| ())
    }

    fn placeholders(&self, city_name: &str) -> Vec<Place> {
        let mut random = self.random.lock();
        generate_placeholders(city_name, self.settings.placeholder_count, &mut **random)
    }

    fn apply(&self, outcome: Outcome) {
        self.update(|view| {
            view.places = outcome.places;
            view.error = outcome.error;
            view.notice = outcome.notice;
            view.loading = false;
        });
    }

    /// Every state change goes through here and is dropped once the view is gone.
    fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut PlacesView),
    {
        if !self.is_active() {
            return;
        }
        self.state.send_modify(change);
    }
}

fn fallback_notice(failure: SearchFailure, city_name: &str) -> String {
    match failure {
        SearchFailure::NoResults => {
            format!("No places were found near {city_name}. Showing sample places instead.")
        }
        SearchFailure::NoDetails => format!(
            "Details for places near {city_name} could not be loaded. Showing sample places instead."
        ),
    }
}
