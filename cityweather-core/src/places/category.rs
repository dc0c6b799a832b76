use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::Place;

/// Fixed set of place categories shown as filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    /// Pseudo-category matching every place.
    All,
    Restaurant,
    Cafe,
    Hotel,
    Attraction,
    Shop,
    Other,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 7] = [
        PlaceCategory::All,
        PlaceCategory::Restaurant,
        PlaceCategory::Cafe,
        PlaceCategory::Hotel,
        PlaceCategory::Attraction,
        PlaceCategory::Shop,
        PlaceCategory::Other,
    ];

    /// Categories a real or generated place can belong to, in classification priority.
    pub const CONCRETE: [PlaceCategory; 5] = [
        PlaceCategory::Restaurant,
        PlaceCategory::Cafe,
        PlaceCategory::Hotel,
        PlaceCategory::Attraction,
        PlaceCategory::Shop,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Hotel => "hotel",
            Self::Attraction => "attraction",
            Self::Shop => "shop",
            Self::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::All => "All Places",
            Self::Restaurant => "Restaurants",
            Self::Cafe => "Cafes",
            Self::Hotel => "Hotels",
            Self::Attraction => "Attractions",
            Self::Shop => "Shops",
            Self::Other => "Other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::All | Self::Other => "map-pin",
            Self::Restaurant => "utensils",
            Self::Cafe => "coffee",
            Self::Hotel => "hotel",
            Self::Attraction => "camera",
            Self::Shop => "store",
        }
    }

    /// Provider place-type tags that map onto this category.
    pub fn provider_tags(&self) -> &'static [&'static str] {
        match self {
            Self::All | Self::Other => &[],
            Self::Restaurant => &["restaurant"],
            Self::Cafe => &["cafe"],
            Self::Hotel => &["lodging"],
            Self::Attraction => &["tourist_attraction", "museum", "amusement_park"],
            Self::Shop => &["store", "shopping_mall"],
        }
    }

    /// Unique provider tags across every category, one nearby-search each.
    pub fn search_tags() -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = Vec::new();
        for tag in Self::ALL
            .iter()
            .filter(|c| **c != Self::All)
            .flat_map(|c| c.provider_tags())
        {
            if !tags.contains(tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// First-match classification of a place's provider type tags.
    pub fn classify<S: AsRef<str>>(types: &[S]) -> Self {
        Self::CONCRETE
            .into_iter()
            .find(|category| {
                types.iter().any(|t| {
                    category
                        .provider_tags()
                        .iter()
                        .any(|tag| *tag == t.as_ref())
                })
            })
            .unwrap_or(Self::Other)
    }

    pub fn matches(&self, category: PlaceCategory) -> bool {
        *self == Self::All || *self == category
    }
}

impl std::fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PlaceCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.id() == lower)
            .ok_or_else(|| {
                let supported: Vec<_> = Self::ALL.iter().map(PlaceCategory::id).collect();
                anyhow::anyhow!(
                    "Unknown category '{s}'. Supported categories: {}.",
                    supported.join(", ")
                )
            })
    }
}

/// Places of `places` that belong to `category`, in their original order.
pub fn filter_by_category(places: &[Place], category: PlaceCategory) -> Vec<Place> {
    places
        .iter()
        .filter(|p| category.matches(p.category))
        .cloned()
        .collect()
}
