//! Error taxonomy for provider, geolocation and settings failures.
//!
//! Provider errors carry technical detail for logs; what the user sees is
//! decided by the call site through [`FetchSite::user_message`].

use thiserror::Error;

/// Errors returned by a [`crate::WeatherProvider`].
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("city not found: {city} (status {status})")]
    NotFound { city: String, status: u16 },

    #[error("weather data unavailable for {lat}, {lon} (status {status})")]
    Unavailable { lat: f64, lon: f64, status: u16 },

    #[error("forecast unavailable (status {0})")]
    ForecastUnavailable(u16),

    #[error("suggestion lookup failed (status {0})")]
    SuggestionFetchFailed(u16),

    #[error("request to weather service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to parse {what} response: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl WeatherError {
    pub(crate) fn parse(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| WeatherError::Parse { what, source }
    }
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    Denied,

    #[error("geolocation is not supported")]
    Unsupported,

    #[error("location request timed out")]
    Timeout,

    #[error("location error: {0}")]
    Other(String),
}

impl GeolocationError {
    /// Message for an explicit "use my location" request. Startup never shows these.
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::Unsupported => "Geolocation is not supported on this device.",
            _ => "Unable to access your location. Please enable location services.",
        }
    }
}

/// Failures of the persistent settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where a user-visible fetch failed; each site has one fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSite {
    City,
    Coordinates,
}

impl FetchSite {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchSite::City => "City not found. Please check the spelling and try again.",
            FetchSite::Coordinates => "Unable to fetch weather data for your location.",
        }
    }
}
