//! Plain-text rendering of the lookup and places views.

use std::fmt::Write;

use cityweather_core::{CityWeather, ConditionIcon, Navigation, PlacesView};

fn icon_glyph(icon: ConditionIcon) -> &'static str {
    match icon {
        ConditionIcon::Droplets => "💧",
        ConditionIcon::Cloud => "☁",
        ConditionIcon::Wind => "🌬",
        ConditionIcon::Sun => "☀",
    }
}

/// Halves round up: 12.5 shows as 13, -2.5 as -2.
fn whole_degrees(celsius: f64) -> i64 {
    (celsius + 0.5).floor() as i64
}

pub fn weather(weather: &CityWeather) -> String {
    let s = &weather.snapshot;
    let mut out = String::new();

    let _ = writeln!(out, "{}, {}", s.city_name, s.country_code);
    let _ = writeln!(out, "{}", s.coords);
    let _ = writeln!(out, "{}°C  {}", whole_degrees(s.temperature_c), s.description);
    let _ = writeln!(out, "Humidity:   {}%", s.humidity_pct);
    let _ = writeln!(out, "Wind:       {:.1} m/s", s.wind_speed_mps);
    let _ = writeln!(out, "Feels like: {}°C", whole_degrees(s.feels_like_c));

    if !weather.forecast.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "24 Hour Forecast");
        for point in &weather.forecast {
            let _ = writeln!(
                out,
                "  {}  {}  {:>4}°C  {}",
                point.local_time_label(),
                icon_glyph(point.icon()),
                whole_degrees(point.temperature_c),
                point.precipitation_label()
            );
        }
    }

    out.trim_end().to_string()
}

/// One-line breadcrumb for a navigation, e.g. `→ /places/S%C3%A3o%20Paulo`.
pub fn route(nav: &Navigation) -> String {
    match nav.coords {
        Some(coords) => format!("→ {} ({coords})", nav.route.path()),
        None => format!("→ {}", nav.route.path()),
    }
}

pub fn places(view: &PlacesView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Places in {}", view.city_name);
    let _ = writeln!(out, "Category: {}", view.category.display_name());

    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "Note: {notice}");
    }
    let _ = writeln!(out);

    let visible = view.visible_places();
    if visible.is_empty() {
        let _ = writeln!(out, "No Places Found");
        let _ = writeln!(
            out,
            "Try selecting a different category or searching for another city."
        );
    }

    for place in &visible {
        let _ = writeln!(
            out,
            "{} {}  ★ {}  [{}]",
            place.category.icon(),
            place.name,
            place.rating,
            place.category.display_name()
        );
        let _ = writeln!(out, "    {} · {:.1} km away", place.address, place.distance_km);
    }

    out.trim_end().to_string()
}
