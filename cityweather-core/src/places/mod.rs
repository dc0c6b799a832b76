//! Places browser: nearby points of interest for a city, with placeholder
//! fallback whenever live data cannot be obtained in time.

pub mod browser;
pub mod category;
pub mod distance;
pub mod placeholder;
pub mod search;

pub use browser::{PlacesBrowser, PlacesView};
pub use category::{PlaceCategory, filter_by_category};
pub use distance::distance_km;
pub use placeholder::{RandomSource, SeededRandom, ThreadRandom, generate_placeholders};
