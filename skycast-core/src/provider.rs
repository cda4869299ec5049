use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, CurrentConditions, ForecastSet, LocationSuggestion, UnitSystem},
    provider::{openweather::RemoteProvider, synthetic::SyntheticProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod synthetic;

/// Upper bound on suggestions shown for one query.
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenWeather,
    Synthetic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenWeather => "openweather",
            ProviderKind::Synthetic => "synthetic",
        }
    }

    pub const fn all() -> &'static [ProviderKind] {
        &[ProviderKind::OpenWeather, ProviderKind::Synthetic]
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderKind::OpenWeather),
            "synthetic" | "demo" => Ok(ProviderKind::Synthetic),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, synthetic."
            )),
        }
    }
}

/// Source of current conditions, forecasts and place-name suggestions.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_by_city(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<ForecastSet, WeatherError>;

    /// Raw geocoding lookup; may fail.
    async fn geocode(&self, query: &str) -> Result<Vec<LocationSuggestion>, WeatherError>;

    /// Suggestions for `query`, never failing: lookup errors fall back to the
    /// built-in city table.
    async fn fetch_suggestions(&self, query: &str) -> Vec<LocationSuggestion> {
        match self.geocode(query).await {
            Ok(mut found) => {
                found.truncate(MAX_SUGGESTIONS);
                found
            }
            Err(e) => {
                tracing::warn!("suggestion fetch failed for {query:?}, using built-in list: {e}");
                fallback_suggestions(query)
            }
        }
    }
}

const FALLBACK_CITIES: &[(&str, &str, Option<&str>, f64, f64)] = &[
    ("New York", "US", Some("NY"), 40.7128, -74.0060),
    ("London", "GB", None, 51.5074, -0.1278),
    ("Paris", "FR", None, 48.8566, 2.3522),
    ("Tokyo", "JP", None, 35.6762, 139.6503),
    ("Sydney", "AU", None, -33.8688, 151.2093),
];

/// Well-known cities whose name contains `query`, case-insensitively.
pub fn fallback_suggestions(query: &str) -> Vec<LocationSuggestion> {
    let needle = query.trim().to_lowercase();

    FALLBACK_CITIES
        .iter()
        .filter(|(name, ..)| name.to_lowercase().contains(&needle))
        .map(|&(name, country, state, lat, lon)| LocationSuggestion {
            name: name.to_string(),
            country: country.to_string(),
            state: state.map(str::to_string),
            lat,
            lon,
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Construct a provider from config and explicit ProviderKind.
pub fn provider_from_config(
    kind: ProviderKind,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let boxed: Box<dyn WeatherProvider> = match kind {
        ProviderKind::OpenWeather => {
            let api_key = config.api_key().ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{kind}'.\n\
                     Hint: run `skycast configure` and enter your OpenWeather API key."
                )
            })?;
            Box::new(RemoteProvider::with_endpoints(api_key.to_owned(), &config.endpoints)?)
        }
        ProviderKind::Synthetic => {
            tracing::info!("demo mode: serving synthetic weather data");
            Box::new(match config.seed {
                Some(seed) => SyntheticProvider::seeded(seed),
                None => SyntheticProvider::new(),
            })
        }
    };

    Ok(boxed)
}

/// Construct the provider selected by config.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let kind = config.provider_kind()?;
    provider_from_config(kind, config)
}
