//! Pure mappings from weather records to display fields.

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::Serialize;
use std::fmt::Display;

use crate::model::{CurrentConditions, ForecastSet, UnitSystem, WeatherCategory};

/// Entries between two daily samples (8 × 3 h).
pub const DAILY_STRIDE: usize = 8;
pub const DAILY_COUNT: usize = 5;
pub const HOURLY_COUNT: usize = 8;

const SUNRISE_PLACEHOLDER: &str = "06:30 AM";
const SUNSET_PLACEHOLDER: &str = "07:45 PM";

/// Icon glyph name and style class for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherIcon {
    pub icon: &'static str,
    pub class: &'static str,
}

pub const UNKNOWN_ICON: WeatherIcon = WeatherIcon { icon: "fa-question", class: "unknown" };

pub fn weather_icon(category: WeatherCategory, code: u32) -> WeatherIcon {
    let (icon, class) = match category {
        WeatherCategory::Clear => ("fa-sun", "sunny"),
        WeatherCategory::Clouds if code == 801 => ("fa-cloud-sun", "cloudy"),
        WeatherCategory::Clouds => ("fa-cloud", "cloudy"),
        WeatherCategory::Rain => ("fa-cloud-rain", "rainy"),
        WeatherCategory::Drizzle => ("fa-cloud-drizzle", "rainy"),
        WeatherCategory::Thunderstorm => ("fa-bolt", "stormy"),
        WeatherCategory::Snow => ("fa-snowflake", "snowy"),
        WeatherCategory::Mist
        | WeatherCategory::Smoke
        | WeatherCategory::Haze
        | WeatherCategory::Dust
        | WeatherCategory::Fog
        | WeatherCategory::Sand
        | WeatherCategory::Ash => ("fa-smog", "cloudy"),
        WeatherCategory::Squall => ("fa-wind", "stormy"),
        WeatherCategory::Tornado => ("fa-tornado", "stormy"),
        WeatherCategory::Unknown => return UNKNOWN_ICON,
    };
    WeatherIcon { icon, class }
}

/// Round half up, so -2.5 becomes -2 and 2.5 becomes 3.
pub fn round_temperature(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// "21°C" / "70°F".
pub fn format_temperature(value: f64, units: UnitSystem) -> String {
    format!("{}{}", round_temperature(value), units.temperature_suffix())
}

/// Position of the sun along today's arc, in percent.
pub fn sun_position(sunrise: DateTime<Utc>, sunset: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if now <= sunrise {
        return 0.0;
    }
    if now >= sunset {
        return 100.0;
    }
    let day = (sunset - sunrise).num_milliseconds() as f64;
    let elapsed = (now - sunrise).num_milliseconds() as f64;
    (elapsed / day * 100.0).clamp(0.0, 100.0)
}

/// "Monday, January 1, 2024".
pub fn format_long_date<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%A, %B %-d, %Y").to_string()
}

/// "06:30 AM".
pub fn format_clock<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%I:%M %p").to_string()
}

/// "3 PM".
pub fn format_hour<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%-I %p").to_string()
}

/// Upper-case the first letter of every word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiBand {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiBand {
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiBand::Good,
            51..=100 => AqiBand::Moderate,
            101..=150 => AqiBand::UnhealthyForSensitive,
            151..=200 => AqiBand::Unhealthy,
            201..=300 => AqiBand::VeryUnhealthy,
            _ => AqiBand::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiBand::Good => "Good",
            AqiBand::Moderate => "Moderate",
            AqiBand::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            AqiBand::Unhealthy => "Unhealthy",
            AqiBand::VeryUnhealthy => "Very Unhealthy",
            AqiBand::Hazardous => "Hazardous",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            AqiBand::Good => "good",
            AqiBand::Moderate => "moderate",
            AqiBand::UnhealthyForSensitive => "unhealthy-sensitive",
            AqiBand::Unhealthy => "unhealthy",
            AqiBand::VeryUnhealthy => "very-unhealthy",
            AqiBand::Hazardous => "hazardous",
        }
    }
}

/// Air-quality block. Placeholder values until a real data source is wired in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AirQuality {
    pub aqi: u32,
    pub band: AqiBand,
    /// Pollutant concentrations in μg/m³.
    pub pm25: u32,
    pub so2: u32,
    pub no2: u32,
    pub o3: u32,
}

impl AirQuality {
    pub fn synthesize<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let aqi = rng.gen_range(10..160);
        Self {
            aqi,
            band: AqiBand::from_aqi(aqi),
            pm25: rng.gen_range(5..40),
            so2: rng.gen_range(2..22),
            no2: rng.gen_range(10..50),
            o3: rng.gen_range(20..100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastItem {
    pub label: String,
    pub icon: WeatherIcon,
    pub high: i64,
    pub low: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecastItem {
    pub label: String,
    pub icon: WeatherIcon,
    pub temperature: i64,
    pub precipitation_pct: u8,
}

/// One entry per day: indices 0, 8, 16, 24, 32.
pub fn daily_forecast<Tz>(set: &ForecastSet, tz: &Tz) -> Vec<DailyForecastItem>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    set.entries
        .iter()
        .step_by(DAILY_STRIDE)
        .take(DAILY_COUNT)
        .enumerate()
        .map(|(index, entry)| DailyForecastItem {
            label: match index {
                0 => "Today".to_string(),
                1 => "Tomorrow".to_string(),
                _ => entry.time.with_timezone(tz).format("%A").to_string(),
            },
            icon: weather_icon(entry.category, entry.condition_code),
            high: round_temperature(entry.temp_max),
            low: round_temperature(entry.temp_min),
        })
        .collect()
}

/// The next 24 hours: the first eight 3-hour entries.
pub fn hourly_forecast<Tz>(set: &ForecastSet, tz: &Tz) -> Vec<HourlyForecastItem>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    set.entries
        .iter()
        .take(HOURLY_COUNT)
        .enumerate()
        .map(|(index, entry)| HourlyForecastItem {
            label: if index == 0 { "Now".to_string() } else { format_hour(entry.time, tz) },
            icon: weather_icon(entry.category, entry.condition_code),
            temperature: round_temperature(entry.temperature),
            precipitation_pct: (entry.pop.clamp(0.0, 1.0) * 100.0).round() as u8,
        })
        .collect()
}

/// Everything the main weather card shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub location: String,
    pub date: String,
    pub temperature: i64,
    pub temperature_label: String,
    pub feels_like: String,
    pub description: String,
    pub icon: WeatherIcon,
    pub visibility: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    pub cloud_cover: String,
    pub uv_index: String,
    pub sunrise: String,
    pub sunset: String,
    pub sun_position: Option<f64>,
    pub air_quality: AirQuality,
    pub is_favorite: bool,
}

pub fn current_view<Tz>(
    conditions: &CurrentConditions,
    is_favorite: bool,
    now: DateTime<Utc>,
    tz: &Tz,
    air_quality: AirQuality,
) -> CurrentView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let units = conditions.units;
    let (sunrise, sunset, sun) = match (conditions.sunrise, conditions.sunset) {
        (Some(rise), Some(set)) => (
            format_clock(rise, tz),
            format_clock(set, tz),
            Some(sun_position(rise, set, now)),
        ),
        _ => (SUNRISE_PLACEHOLDER.to_string(), SUNSET_PLACEHOLDER.to_string(), None),
    };

    CurrentView {
        location: conditions.label(),
        date: format_long_date(now, tz),
        temperature: round_temperature(conditions.temperature),
        temperature_label: format_temperature(conditions.temperature, units),
        feels_like: format_temperature(conditions.feels_like, units),
        description: title_case(&conditions.description),
        icon: weather_icon(conditions.category, conditions.condition_code),
        visibility: format!("{:.1} km", f64::from(conditions.visibility_m) / 1000.0),
        humidity: format!("{}%", conditions.humidity_pct),
        wind: format!("{:.1} {}", conditions.wind_speed, units.wind_suffix()),
        pressure: format!("{} hPa", conditions.pressure_hpa),
        cloud_cover: format!("{}%", conditions.cloud_cover_pct),
        uv_index: "N/A".to_string(),
        sunrise,
        sunset,
        sun_position: sun,
        air_quality,
        is_favorite,
    }
}
