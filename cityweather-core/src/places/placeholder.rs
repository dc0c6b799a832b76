use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    model::{Place, Rating, round_one_decimal},
    places::PlaceCategory,
};

pub const PLACEHOLDER_IMAGE: &str = "/api/placeholder/400/320";

/// Randomness used to generate placeholder places.
pub trait RandomSource: Send {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Unseeded source backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible source for deterministic output.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Synthetic places for `city`, used whenever real results are unavailable.
pub fn generate_placeholders(city: &str, count: usize, rng: &mut dyn RandomSource) -> Vec<Place> {
    (1..=count)
        .map(|i| {
            let pick = (rng.next_unit() * PlaceCategory::CONCRETE.len() as f64) as usize;
            let category = PlaceCategory::CONCRETE[pick.min(PlaceCategory::CONCRETE.len() - 1)];
            let street_no = (rng.next_unit() * 100.0) as u32 + 1;

            Place {
                id: format!("mock-{i}"),
                name: format!("{city} {} {i}", capitalize(category.id())),
                category,
                rating: Rating::new(Some(3.0 + rng.next_unit() * 2.0)),
                address: format!("{street_no} {city} Street"),
                distance_km: round_one_decimal(rng.next_unit() * 5.0),
                image: PLACEHOLDER_IMAGE.to_string(),
            }
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_count_with_mock_ids() {
        let places = generate_placeholders("Oslo", 10, &mut ThreadRandom);

        assert_eq!(places.len(), 10);
        for (i, place) in places.iter().enumerate() {
            assert_eq!(place.id, format!("mock-{}", i + 1));
            assert!(place.is_placeholder());
        }
    }

    #[test]
    fn values_stay_in_range() {
        let places = generate_placeholders("Oslo", 200, &mut SeededRandom::new(42));

        for place in &places {
            let rating = place.rating.value().expect("placeholders always carry a rating");
            assert!((3.0..=5.0).contains(&rating), "rating {rating}");
            assert!((0.0..=5.0).contains(&place.distance_km), "distance {}", place.distance_km);
            assert!(PlaceCategory::CONCRETE.contains(&place.category));
            assert!(place.name.starts_with("Oslo "));
            assert!(place.address.ends_with("Oslo Street"));
            assert_eq!(place.image, PLACEHOLDER_IMAGE);
        }
    }

    #[test]
    fn seeded_source_is_deterministic() {
        let first = generate_placeholders("Lima", 10, &mut SeededRandom::new(7));
        let second = generate_placeholders("Lima", 10, &mut SeededRandom::new(7));
        assert_eq!(first, second);
    }

    #[test]
    fn name_combines_city_and_category() {
        let places = generate_placeholders("Rome", 1, &mut SeededRandom::new(1));
        let place = &places[0];
        let expected = format!("Rome {} 1", capitalize(place.category.id()));
        assert_eq!(place.name, expected);
    }
}
