use std::time::Duration;

use thiserror::Error;

/// Failures of a weather lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The provider does not know the city. Shown to the user verbatim.
    #[error("City not found")]
    CityNotFound,

    #[error("Weather request failed: {0}")]
    Network(String),

    #[error("Failed to parse weather response: {0}")]
    Parse(String),
}

impl LookupError {
    /// Message shown in the lookup view.
    pub fn user_message(&self) -> String {
        match self {
            Self::CityNotFound => self.to_string(),
            Self::Network(_) | Self::Parse(_) => {
                "Failed to fetch weather data. Please try again.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Failures talking to the places provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacesError {
    #[error("Places service did not become ready within {0:?}")]
    SdkLoadTimeout(Duration),

    #[error("Places service failed to load: {0}")]
    SdkLoadError(String),

    /// Non-OK status code reported by the provider.
    #[error("Places provider returned status {0}")]
    Status(String),

    #[error("Places request failed: {0}")]
    Network(String),

    #[error("Failed to parse places response: {0}")]
    Parse(String),

    #[error("Places request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for PlacesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
