//! Remote half of the places pipeline: fan-out nearby-search, merge, enrich.

use std::{collections::HashSet, future::Future, time::Duration};

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::PlacesSettings,
    error::PlacesError,
    model::{Coordinates, Place, Rating},
    places::{PlaceCategory, distance_km, placeholder::PLACEHOLDER_IMAGE},
    provider::{NearbyRequest, PlaceDetails, PlaceSummary, PlacesProvider},
};

/// The remote search produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchFailure {
    #[error("no places were found nearby")]
    NoResults,

    #[error("details could not be loaded for any nearby place")]
    NoDetails,
}

/// Race `fut` against `budget`; expiry becomes [`PlacesError::Timeout`].
pub async fn within<T, F>(budget: Duration, fut: F) -> Result<T, PlacesError>
where
    F: Future<Output = Result<T, PlacesError>>,
{
    tokio::time::timeout(budget, fut)
        .await
        .unwrap_or(Err(PlacesError::Timeout(budget)))
}

/// Merge per-type result batches, keeping the first entry seen for each place id.
pub fn merge_unique<I>(batches: I) -> Vec<PlaceSummary>
where
    I: IntoIterator<Item = Vec<PlaceSummary>>,
{
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|summary| seen.insert(summary.place_id.clone()))
        .collect()
}

/// One nearby-search per unique type tag, issued concurrently. A failed or
/// timed-out search contributes no results instead of failing the batch.
pub async fn search_nearby(
    provider: &dyn PlacesProvider,
    origin: Coordinates,
    settings: &PlacesSettings,
) -> Vec<PlaceSummary> {
    let budget = settings.nearby_search_timeout();
    let requests: Vec<NearbyRequest> = PlaceCategory::search_tags()
        .into_iter()
        .map(|tag| NearbyRequest {
            location: origin,
            radius_m: settings.search_radius_m,
            place_type: tag.to_string(),
        })
        .collect();

    let batches = join_all(requests.iter().map(|request| async move {
        match within(budget, provider.nearby_search(request)).await {
            Ok(results) => results,
            Err(err) => {
                debug!(place_type = %request.place_type, %err, "nearby-search dropped");
                Vec::new()
            }
        }
    }))
    .await;

    merge_unique(batches)
}

/// Detail lookups for every candidate, concurrently. Places whose lookup fails
/// or times out are left out.
pub async fn enrich(
    provider: &dyn PlacesProvider,
    origin: Coordinates,
    candidates: &[PlaceSummary],
    settings: &PlacesSettings,
) -> Vec<Place> {
    let budget = settings.details_timeout();

    let lookups = join_all(candidates.iter().map(|candidate| async move {
        within(budget, provider.get_details(&candidate.place_id))
            .await
            .map_err(|err| (candidate.place_id.as_str(), err))
    }))
    .await;

    lookups
        .into_iter()
        .filter_map(|lookup| match lookup {
            Ok(details) => Some(place_from_details(details, origin)),
            Err((place_id, err)) => {
                debug!(%place_id, %err, "detail lookup dropped");
                None
            }
        })
        .collect()
}

/// Full remote search around `origin`.
pub async fn find_places(
    provider: &dyn PlacesProvider,
    origin: Coordinates,
    settings: &PlacesSettings,
) -> Result<Vec<Place>, SearchFailure> {
    let mut candidates = search_nearby(provider, origin, settings).await;
    if candidates.is_empty() {
        warn!("nearby-search returned no candidates");
        return Err(SearchFailure::NoResults);
    }

    candidates.truncate(settings.max_results);
    info!(candidates = candidates.len(), "enriching nearby places");

    let places = enrich(provider, origin, &candidates, settings).await;
    if places.is_empty() {
        warn!("every detail lookup failed");
        return Err(SearchFailure::NoDetails);
    }

    Ok(places)
}

fn place_from_details(details: PlaceDetails, origin: Coordinates) -> Place {
    Place {
        category: PlaceCategory::classify(details.types.as_slice()),
        distance_km: distance_km(origin, details.location),
        rating: Rating::new(details.rating),
        address: details
            .address
            .unwrap_or_else(|| "Address not available".to_string()),
        image: details
            .photo
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        id: details.place_id,
        name: details.name,
    }
}
