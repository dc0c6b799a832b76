//! Routes between the two views and the one-shot payload carried across.

use crate::model::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Lookup,
    /// `/places/:cityName`
    Places { city_name: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Lookup => "/".to_string(),
            Route::Places { city_name } => format!("/places/{}", urlencoding::encode(city_name)),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Route::Lookup);
        }

        let encoded = trimmed.strip_prefix("/places/")?;
        if encoded.is_empty() || encoded.contains('/') {
            return None;
        }

        let city_name = urlencoding::decode(encoded).ok()?.into_owned();
        Some(Route::Places { city_name })
    }
}

/// A navigation request. Coordinates travel beside the route, never in the URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub route: Route,
    pub coords: Option<Coordinates>,
}

impl Navigation {
    pub fn places(city_name: impl Into<String>, coords: Option<Coordinates>) -> Self {
        Self {
            route: Route::Places {
                city_name: city_name.into(),
            },
            coords,
        }
    }

    pub fn city_name(&self) -> Option<&str> {
        match &self.route {
            Route::Places { city_name } => Some(city_name),
            Route::Lookup => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_route() {
        assert_eq!(Route::Lookup.path(), "/");
        assert_eq!(Route::parse("/"), Some(Route::Lookup));
        assert_eq!(Route::parse(""), Some(Route::Lookup));
    }

    #[test]
    fn places_route_encodes_city() {
        let route = Route::Places {
            city_name: "São Paulo".into(),
        };

        let path = route.path();
        assert_eq!(path, "/places/S%C3%A3o%20Paulo");
        assert_eq!(Route::parse(&path), Some(route));
    }

    #[test]
    fn unknown_paths_are_rejected() {
        assert_eq!(Route::parse("/weather"), None);
        assert_eq!(Route::parse("/places/"), None);
        assert_eq!(Route::parse("/places/a/b"), None);
    }

    #[test]
    fn navigation_carries_coordinates_beside_route() {
        let nav = Navigation::places("London", Some(Coordinates::new(51.51, -0.13)));

        assert_eq!(nav.city_name(), Some("London"));
        assert_eq!(nav.route.path(), "/places/London");
        assert_eq!(nav.coords, Some(Coordinates::new(51.51, -0.13)));
    }
}
