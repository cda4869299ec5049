use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::Endpoints,
    error::WeatherError,
    model::{
        Coordinates, CurrentConditions, ForecastEntry, ForecastSet, LocationSuggestion,
        UnitSystem, WeatherCategory,
    },
};

use super::{MAX_SUGGESTIONS, WeatherProvider};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeatherMap-compatible HTTP client.
#[derive(Clone)]
pub struct RemoteProvider {
    api_key: String,
    weather_base_url: String,
    geo_base_url: String,
    http: Client,
}

impl std::fmt::Debug for RemoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteProvider")
            .field("weather_base_url", &self.weather_base_url)
            .field("geo_base_url", &self.geo_base_url)
            .finish_non_exhaustive()
    }
}

impl RemoteProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_endpoints(api_key, &Endpoints::default())
    }

    pub fn with_endpoints(api_key: String, endpoints: &Endpoints) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            api_key,
            weather_base_url: endpoints.weather_base_url.trim_end_matches('/').to_string(),
            geo_base_url: endpoints.geo_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<(StatusCode, String), WeatherError> {
        tracing::debug!("GET {url}");

        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!("{url} failed with status {status}: {}", truncate_body(&body));
        }

        Ok((status, body))
    }

    async fn current(
        &self,
        query: &[(&str, &str)],
        units: UnitSystem,
    ) -> Result<Result<CurrentConditions, StatusCode>, WeatherError> {
        let url = format!("{}/weather", self.weather_base_url);
        let mut params = query.to_vec();
        params.push(("units", units.as_str()));

        let (status, body) = self.get(&url, &params).await?;
        if !status.is_success() {
            return Ok(Err(status));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(WeatherError::parse("current weather"))?;

        Ok(Ok(parsed.into_conditions(units)))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    id: u32,
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    dt: Option<i64>,
    coord: OwCoord,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    #[serde(default)]
    visibility: u32,
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_conditions(self, units: UnitSystem) -> CurrentConditions {
        let observed_at = self.dt.and_then(unix_to_utc).unwrap_or_else(Utc::now);
        let (category, condition_code, description) = primary_weather(&self.weather);

        CurrentConditions {
            location_name: self.name,
            country: self.sys.country,
            observed_at,
            temperature: self.main.temp,
            feels_like: self.main.feels_like.unwrap_or(self.main.temp),
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed: self.wind.speed,
            cloud_cover_pct: self.clouds.all,
            visibility_m: self.visibility,
            category,
            condition_code,
            description,
            sunrise: self.sys.sunrise.and_then(unix_to_utc),
            sunset: self.sys.sunset.and_then(unix_to_utc),
            coordinates: Coordinates::new(self.coord.lat, self.coord.lon),
            units,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherProvider for RemoteProvider {
    async fn fetch_by_city(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        self.current(&[("q", city)], units)
            .await?
            .map_err(|status| WeatherError::NotFound {
                city: city.to_string(),
                status: status.as_u16(),
            })
    }

    async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        self.current(&[("lat", lat.as_str()), ("lon", lon.as_str())], units)
            .await?
            .map_err(|status| WeatherError::Unavailable {
                lat: coords.lat,
                lon: coords.lon,
                status: status.as_u16(),
            })
    }

    async fn fetch_forecast(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<ForecastSet, WeatherError> {
        let url = format!("{}/forecast", self.weather_base_url);
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        let (status, body) = self
            .get(&url, &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", units.as_str())])
            .await?;

        if !status.is_success() {
            return Err(WeatherError::ForecastUnavailable(status.as_u16()));
        }

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).map_err(WeatherError::parse("forecast"))?;

        let entries = parsed
            .list
            .into_iter()
            .filter_map(|e| {
                let time = unix_to_utc(e.dt)?;
                let (category, condition_code, _) = primary_weather(&e.weather);
                Some(ForecastEntry {
                    time,
                    temperature: e.main.temp,
                    temp_min: e.main.temp_min.unwrap_or(e.main.temp),
                    temp_max: e.main.temp_max.unwrap_or(e.main.temp),
                    category,
                    condition_code,
                    pop: e.pop.clamp(0.0, 1.0),
                })
            })
            .collect();

        Ok(ForecastSet { entries, units })
    }

    async fn geocode(&self, query: &str) -> Result<Vec<LocationSuggestion>, WeatherError> {
        let url = format!("{}/geo/1.0/direct", self.geo_base_url);
        let limit = MAX_SUGGESTIONS.to_string();

        let (status, body) = self.get(&url, &[("q", query), ("limit", limit.as_str())]).await?;

        if !status.is_success() {
            return Err(WeatherError::SuggestionFetchFailed(status.as_u16()));
        }

        let parsed: Vec<OwGeoEntry> =
            serde_json::from_str(&body).map_err(WeatherError::parse("geocoding"))?;

        Ok(parsed
            .into_iter()
            .map(|g| LocationSuggestion {
                name: g.name,
                country: g.country,
                state: g.state,
                lat: g.lat,
                lon: g.lon,
            })
            .collect())
    }
}

fn primary_weather(weather: &[OwWeather]) -> (WeatherCategory, u32, String) {
    weather
        .first()
        .map(|w| (WeatherCategory::from(w.main.as_str()), w.id, w.description.clone()))
        .unwrap_or((WeatherCategory::Unknown, 0, "Unknown".to_string()))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
