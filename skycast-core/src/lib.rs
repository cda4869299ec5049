//! Core library for the `skycast` weather client.
//!
//! This crate defines:
//! - Configuration handling and persisted user settings
//! - Abstraction over weather providers (OpenWeather, synthetic demo data)
//! - Suggestion debouncing, display mapping and the application controller
//!
//! It is used by `skycast-cli`, but the controller only talks to a [`View`],
//! so other front-ends can reuse it.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod render;
pub mod store;

pub use config::{Config, Endpoints};
pub use controller::{AppState, Controller, Key, View};
pub use debounce::{NavKey, Navigation, SuggestionDebouncer, SuggestionDisplay};
pub use error::{FetchSite, GeolocationError, StoreError, WeatherError};
pub use geolocation::{CachedGeolocator, FixedGeolocator, Geolocator, UnsupportedGeolocator};
pub use model::{
    Coordinates, CurrentConditions, ForecastEntry, ForecastSet, LocationSuggestion, Theme,
    UiState, UnitSystem, UserPreferences, WeatherCategory,
};
pub use provider::{ProviderKind, WeatherProvider};
pub use store::{FileStore, KeyValueStore, MemoryStore, Settings};
