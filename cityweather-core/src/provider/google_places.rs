use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::{error::PlacesError, model::Coordinates};

use super::{NearbyRequest, PlaceDetails, PlaceSummary, PlacesProvider};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DETAIL_FIELDS: &str = "place_id,name,rating,formatted_address,geometry,types,photos";
const USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));

/// Places web service client. The HTTP client is created lazily by
/// [`PlacesProvider::load_sdk`] and reused for every later request.
#[derive(Debug)]
pub struct GooglePlacesProvider {
    api_key: String,
    base_url: String,
    http: OnceCell<Client>,
}

impl GooglePlacesProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client, PlacesError> {
        self.http
            .get()
            .ok_or_else(|| PlacesError::SdkLoadError("places service used before loading".into()))
    }
}

/// Status codes shared by every places endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ServiceStatus {
    Ok,
    ZeroResults,
    Other(String),
}

impl ServiceStatus {
    fn parse(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GpLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GpGeometry {
    location: GpLatLng,
}

#[derive(Debug, Deserialize)]
struct GpPhoto {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct GpNearbyResult {
    place_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GpNearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<GpNearbyResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GpDetailsResult {
    place_id: String,
    #[serde(default)]
    name: String,
    rating: Option<f64>,
    formatted_address: Option<String>,
    vicinity: Option<String>,
    geometry: GpGeometry,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<GpPhoto>,
}

#[derive(Debug, Deserialize)]
struct GpDetailsResponse {
    status: String,
    result: Option<GpDetailsResult>,
    error_message: Option<String>,
}

impl From<GpDetailsResult> for PlaceDetails {
    fn from(r: GpDetailsResult) -> Self {
        PlaceDetails {
            place_id: r.place_id,
            name: r.name,
            rating: r.rating,
            address: r.formatted_address.or(r.vicinity),
            location: Coordinates::new(r.geometry.location.lat, r.geometry.location.lng),
            types: r.types,
            photo: r.photos.into_iter().next().map(|p| p.photo_reference),
        }
    }
}

fn status_error(status: String, message: Option<String>) -> PlacesError {
    match message {
        Some(msg) => PlacesError::Status(format!("{status} ({msg})")),
        None => PlacesError::Status(status),
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesProvider {
    async fn load_sdk(&self) -> Result<(), PlacesError> {
        self.http
            .get_or_try_init(|| async {
                if self.api_key.trim().is_empty() {
                    return Err(PlacesError::SdkLoadError(
                        "places API is unavailable: no API key configured".into(),
                    ));
                }

                debug!(base_url = %self.base_url, "initialising places client");
                Client::builder()
                    .user_agent(USER_AGENT)
                    .build()
                    .map_err(|e| PlacesError::SdkLoadError(e.to_string()))
            })
            .await
            .map(|_| ())
    }

    #[instrument(skip(self), fields(place_type = %request.place_type))]
    async fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        let url = format!("{}/nearbysearch/json", self.base_url);
        let location = format!("{},{}", request.location.lat, request.location.lon);
        let radius = request.radius_m.to_string();

        let parsed: GpNearbyResponse = self
            .client()?
            .get(&url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", request.place_type.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match ServiceStatus::parse(&parsed.status) {
            ServiceStatus::Ok => {
                debug!(count = parsed.results.len(), "nearby-search returned results");
                Ok(parsed
                    .results
                    .into_iter()
                    .map(|r| PlaceSummary {
                        place_id: r.place_id,
                        name: r.name,
                        types: r.types,
                    })
                    .collect())
            }
            ServiceStatus::ZeroResults => Ok(Vec::new()),
            ServiceStatus::Other(status) => {
                warn!(%status, "nearby-search failed");
                Err(status_error(status, parsed.error_message))
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = format!("{}/details/json", self.base_url);

        let parsed: GpDetailsResponse = self
            .client()?
            .get(&url)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (ServiceStatus::parse(&parsed.status), parsed.result) {
            (ServiceStatus::Ok, Some(result)) => Ok(result.into()),
            (ServiceStatus::Ok, None) => {
                Err(PlacesError::Parse("details response without a result".into()))
            }
            (ServiceStatus::ZeroResults, _) => Err(PlacesError::Status("ZERO_RESULTS".into())),
            (ServiceStatus::Other(status), _) => Err(status_error(status, parsed.error_message)),
        }
    }
}
