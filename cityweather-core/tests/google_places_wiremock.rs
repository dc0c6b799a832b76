//! Places web service provider and the places browser against a mock HTTP server.

use std::sync::Arc;

use cityweather_core::{
    Coordinates, PlaceCategory, PlacesBrowser, PlacesError, PlacesProvider, PlacesSettings,
    places::SeededRandom,
    provider::{NearbyRequest, google_places::GooglePlacesProvider},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const LONDON: Coordinates = Coordinates::new(51.5074, -0.1278);

fn nearby_body() -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": [
            { "place_id": "p1", "name": "Dishoom", "types": ["restaurant", "food"] },
            { "place_id": "p2", "name": "Monmouth Coffee", "types": ["cafe"] }
        ]
    })
}

fn details_body(id: &str, name: &str, types: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "result": {
            "place_id": id,
            "name": name,
            "rating": 4.66,
            "formatted_address": "12 Upper St Martin's Ln, London WC2H 9FB",
            "geometry": { "location": { "lat": 51.5124, "lng": -0.1269 } },
            "types": types,
            "photos": [{ "photo_reference": "photo-ref" }]
        }
    })
}

async fn loaded_provider(server: &MockServer) -> GooglePlacesProvider {
    let provider = GooglePlacesProvider::with_base_url("test-key".into(), server.uri());
    provider.load_sdk().await.expect("load");
    provider
}

fn restaurant_request() -> NearbyRequest {
    NearbyRequest {
        location: LONDON,
        radius_m: 5000,
        place_type: "restaurant".into(),
    }
}

#[tokio::test]
async fn nearby_search_sends_location_radius_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("location", "51.5074,-0.1278"))
        .and(query_param("radius", "5000"))
        .and(query_param("type", "restaurant"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nearby_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = loaded_provider(&server).await;
    let results = provider.nearby_search(&restaurant_request()).await.expect("results");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].place_id, "p1");
    assert_eq!(results[1].types, vec!["cafe".to_string()]);
}

#[tokio::test]
async fn zero_results_is_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let provider = loaded_provider(&server).await;
    let results = provider.nearby_search(&restaurant_request()).await.expect("empty");
    assert!(results.is_empty());
}

#[tokio::test]
async fn other_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .mount(&server)
        .await;

    let provider = loaded_provider(&server).await;
    let err = provider.nearby_search(&restaurant_request()).await.unwrap_err();

    match err {
        PlacesError::Status(status) => assert!(status.starts_with("REQUEST_DENIED")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn details_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "p1"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_body(
            "p1",
            "Dishoom",
            &["restaurant"],
        )))
        .mount(&server)
        .await;

    let provider = loaded_provider(&server).await;
    let details = provider.get_details("p1").await.expect("details");

    assert_eq!(details.name, "Dishoom");
    assert_eq!(details.rating, Some(4.66));
    assert_eq!(details.location, Coordinates::new(51.5124, -0.1269));
    assert_eq!(details.photo.as_deref(), Some("photo-ref"));
}

#[tokio::test]
async fn browser_merges_duplicates_and_drops_failed_details() {
    let server = MockServer::start().await;
    // Every type search returns the same two places.
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nearby_body()))
        .expect(PlaceCategory::search_tags().len() as u64)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_body(
            "p1",
            "Dishoom",
            &["restaurant"],
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "p2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "NOT_FOUND" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(GooglePlacesProvider::with_base_url("test-key".into(), server.uri()));
    let browser = PlacesBrowser::new(provider, PlacesSettings::default())
        .with_random(Box::new(SeededRandom::new(11)));

    browser.initialize("London", Some(LONDON)).await;

    let view = browser.view();
    assert!(!view.loading);
    assert_eq!(view.error, None);
    assert_eq!(view.notice, None);
    assert_eq!(view.places.len(), 1);

    let place = &view.places[0];
    assert_eq!(place.id, "p1");
    assert_eq!(place.category, PlaceCategory::Restaurant);
    assert_eq!(place.rating.value(), Some(4.7));
    assert_eq!(place.distance_km, 0.6);
}

#[tokio::test]
async fn browser_with_missing_key_shows_placeholders_and_error() {
    let provider = Arc::new(GooglePlacesProvider::new(String::new()));
    let browser = PlacesBrowser::new(provider, PlacesSettings::default());

    browser.initialize("London", Some(LONDON)).await;

    let view = browser.view();
    assert!(view.error.is_some());
    assert_eq!(view.places.len(), 10);
    assert!(view.is_fallback());
}
