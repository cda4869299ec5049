use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit system used for API requests and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Some(UnitSystem::Metric),
            "imperial" => Some(UnitSystem::Imperial),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level weather group as reported by the provider (`weather[0].main`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherCategory {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Smoke,
    Haze,
    Dust,
    Fog,
    Sand,
    Ash,
    Squall,
    Tornado,
    Unknown,
}

impl WeatherCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Clear => "Clear",
            WeatherCategory::Clouds => "Clouds",
            WeatherCategory::Rain => "Rain",
            WeatherCategory::Drizzle => "Drizzle",
            WeatherCategory::Thunderstorm => "Thunderstorm",
            WeatherCategory::Snow => "Snow",
            WeatherCategory::Mist => "Mist",
            WeatherCategory::Smoke => "Smoke",
            WeatherCategory::Haze => "Haze",
            WeatherCategory::Dust => "Dust",
            WeatherCategory::Fog => "Fog",
            WeatherCategory::Sand => "Sand",
            WeatherCategory::Ash => "Ash",
            WeatherCategory::Squall => "Squall",
            WeatherCategory::Tornado => "Tornado",
            WeatherCategory::Unknown => "Unknown",
        }
    }
}

impl From<&str> for WeatherCategory {
    fn from(value: &str) -> Self {
        match value {
            "Clear" => WeatherCategory::Clear,
            "Clouds" => WeatherCategory::Clouds,
            "Rain" => WeatherCategory::Rain,
            "Drizzle" => WeatherCategory::Drizzle,
            "Thunderstorm" => WeatherCategory::Thunderstorm,
            "Snow" => WeatherCategory::Snow,
            "Mist" => WeatherCategory::Mist,
            "Smoke" => WeatherCategory::Smoke,
            "Haze" => WeatherCategory::Haze,
            "Dust" => WeatherCategory::Dust,
            "Fog" => WeatherCategory::Fog,
            "Sand" => WeatherCategory::Sand,
            "Ash" => WeatherCategory::Ash,
            "Squall" => WeatherCategory::Squall,
            "Tornado" => WeatherCategory::Tornado,
            _ => WeatherCategory::Unknown,
        }
    }
}

impl From<String> for WeatherCategory {
    fn from(value: String) -> Self {
        WeatherCategory::from(value.as_str())
    }
}

impl From<WeatherCategory> for String {
    fn from(value: WeatherCategory) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Current conditions for one location, expressed in `units`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed: f64,
    pub cloud_cover_pct: u8,
    pub visibility_m: u32,
    pub category: WeatherCategory,
    pub condition_code: u32,
    pub description: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub coordinates: Coordinates,
    pub units: UnitSystem,
}

impl CurrentConditions {
    /// "City, CC" label used for display and favorites.
    pub fn label(&self) -> String {
        format!("{}, {}", self.location_name, self.country)
    }

    /// Re-express temperatures and wind speed in another unit system.
    pub fn in_units(&self, units: UnitSystem) -> Self {
        let mut converted = self.clone();
        converted.temperature = convert_temperature(self.temperature, self.units, units);
        converted.feels_like = convert_temperature(self.feels_like, self.units, units);
        converted.wind_speed = convert_speed(self.wind_speed, self.units, units);
        converted.units = units;
        converted
    }
}

/// One 3-hour step of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub category: WeatherCategory,
    pub condition_code: u32,
    /// Probability of precipitation, 0..=1.
    pub pop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet {
    pub entries: Vec<ForecastEntry>,
    pub units: UnitSystem,
}

impl ForecastSet {
    pub fn in_units(&self, units: UnitSystem) -> Self {
        let from = self.units;
        let entries = self
            .entries
            .iter()
            .map(|e| ForecastEntry {
                temperature: convert_temperature(e.temperature, from, units),
                temp_min: convert_temperature(e.temp_min, from, units),
                temp_max: convert_temperature(e.temp_max, from, units),
                ..e.clone()
            })
            .collect();

        Self { entries, units }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl LocationSuggestion {
    pub fn display_name(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    pub units: UnitSystem,
    pub theme: Theme,
    pub favorites: Vec<String>,
}

impl UserPreferences {
    pub fn is_favorite(&self, label: &str) -> bool {
        self.favorites.iter().any(|f| f == label)
    }
}

/// Which display region is visible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Loading,
    Error(String),
    Content,
}

pub fn convert_temperature(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => value * 9.0 / 5.0 + 32.0,
        (UnitSystem::Imperial, UnitSystem::Metric) => (value - 32.0) * 5.0 / 9.0,
        _ => value,
    }
}

const MPS_PER_MPH: f64 = 0.44704;

pub fn convert_speed(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => value / MPS_PER_MPH,
        (UnitSystem::Imperial, UnitSystem::Metric) => value * MPS_PER_MPH,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_maps_to_unknown() {
        assert_eq!(WeatherCategory::from("Volcano"), WeatherCategory::Unknown);
        assert_eq!(WeatherCategory::from("Clouds"), WeatherCategory::Clouds);
    }

    #[test]
    fn category_deserializes_from_provider_string() {
        let c: WeatherCategory = serde_json::from_str("\"Thunderstorm\"").unwrap();
        assert_eq!(c, WeatherCategory::Thunderstorm);
    }

    #[test]
    fn suggestion_display_name_includes_state_when_present() {
        let mut s = LocationSuggestion {
            name: "New York".into(),
            country: "US".into(),
            state: Some("NY".into()),
            lat: 40.7,
            lon: -74.0,
        };
        assert_eq!(s.display_name(), "New York, NY, US");

        s.state = None;
        assert_eq!(s.display_name(), "New York, US");
    }

    #[test]
    fn temperature_conversion_is_reversible() {
        let f = convert_temperature(100.0, UnitSystem::Metric, UnitSystem::Imperial);
        assert!((f - 212.0).abs() < 1e-9);

        let c = convert_temperature(f, UnitSystem::Imperial, UnitSystem::Metric);
        assert!((c - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unit_and_theme_parse_case_insensitive() {
        assert_eq!(UnitSystem::parse("Imperial"), Some(UnitSystem::Imperial));
        assert_eq!(Theme::parse(" LIGHT "), Some(Theme::Light));
        assert_eq!(Theme::parse("solarized"), None);
    }
}
