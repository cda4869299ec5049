use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Local, NaiveDate, Utc};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    error::WeatherError,
    model::{
        Coordinates, CurrentConditions, ForecastEntry, ForecastSet, LocationSuggestion,
        UnitSystem, WeatherCategory,
    },
};

use super::{WeatherProvider, fallback_suggestions};

const DEMO_CATEGORIES: [WeatherCategory; 4] = [
    WeatherCategory::Clear,
    WeatherCategory::Clouds,
    WeatherCategory::Rain,
    WeatherCategory::Snow,
];

const DEMO_COORDINATES: Coordinates = Coordinates { lat: 40.7128, lon: -74.0060 };
const COORDINATE_LOCATION_NAME: &str = "Your Location";
const FORECAST_STEPS: usize = 40;

/// Offline provider producing randomized but plausible weather.
///
/// Values are generated in metric units and converted on request.
#[derive(Debug)]
pub struct SyntheticProvider {
    rng: Mutex<StdRng>,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Reproducible output for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    fn conditions(&self, name: &str, units: UnitSystem) -> CurrentConditions {
        let mut rng = self.rng.lock();
        let today = Local::now().date_naive();

        let sunrise = local_time(today, rng.gen_range(6..8), rng.gen_range(0..60));
        let sunset = local_time(today, rng.gen_range(18..21), rng.gen_range(0..60));

        let metric = CurrentConditions {
            location_name: name.to_string(),
            country: "US".to_string(),
            observed_at: Utc::now(),
            temperature: rng.gen_range(10.0..40.0_f64).round(),
            feels_like: rng.gen_range(10.0..40.0_f64).round(),
            humidity_pct: rng.gen_range(40..=100),
            pressure_hpa: rng.gen_range(1000..=1050),
            wind_speed: rng.gen_range(5.0..25.0_f64).round(),
            cloud_cover_pct: rng.gen_range(0..=100),
            visibility_m: rng.gen_range(5_000..=15_000),
            category: DEMO_CATEGORIES[rng.gen_range(0..DEMO_CATEGORIES.len())],
            condition_code: 801,
            description: "partly cloudy".to_string(),
            sunrise,
            sunset,
            coordinates: DEMO_COORDINATES,
            units: UnitSystem::Metric,
        };

        metric.in_units(units)
    }

    fn forecast(&self, units: UnitSystem) -> ForecastSet {
        let mut rng = self.rng.lock();
        let start = Utc::now()
            .duration_trunc(Duration::hours(1))
            .unwrap_or_else(|_| Utc::now());

        let entries = (0..FORECAST_STEPS)
            .map(|step| {
                let temperature = rng.gen_range(15.0..30.0_f64).round();
                ForecastEntry {
                    time: start + Duration::hours(3 * step as i64),
                    temperature,
                    temp_min: temperature - rng.gen_range(0.0..5.0_f64).round(),
                    temp_max: temperature + rng.gen_range(0.0..5.0_f64).round(),
                    category: DEMO_CATEGORIES[rng.gen_range(0..DEMO_CATEGORIES.len())],
                    condition_code: 801,
                    pop: (rng.gen_range(0..=80) as f64) / 100.0,
                }
            })
            .collect();

        ForecastSet { entries, units: UnitSystem::Metric }.in_units(units)
    }
}

fn local_time(day: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    day.and_hms_opt(hour, minute, 0)?
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl WeatherProvider for SyntheticProvider {
    async fn fetch_by_city(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        Ok(self.conditions(city, units))
    }

    async fn fetch_by_coordinates(
        &self,
        _coords: Coordinates,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        Ok(self.conditions(COORDINATE_LOCATION_NAME, units))
    }

    async fn fetch_forecast(
        &self,
        _coords: Coordinates,
        units: UnitSystem,
    ) -> Result<ForecastSet, WeatherError> {
        Ok(self.forecast(units))
    }

    async fn geocode(&self, query: &str) -> Result<Vec<LocationSuggestion>, WeatherError> {
        Ok(fallback_suggestions(query))
    }
}
