use haversine::{Location, Units, distance};

use crate::model::{Coordinates, round_one_decimal};

/// Great-circle distance in kilometers (earth radius 6371 km), rounded to one decimal.
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    let km = distance(
        Location {
            latitude: from.lat,
            longitude: from.lon,
        },
        Location {
            latitude: to.lat,
            longitude: to.lon,
        },
        Units::Kilometers,
    );

    round_one_decimal(km)
}
