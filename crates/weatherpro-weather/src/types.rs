use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Geographic position. Serialized as `{"lat":..,"lon":..}`.
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

/// What to load weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    City(String),
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Coordinates(c) => write!(f, "({c})"),
            LocationQuery::City(name) => write!(f, "{name}"),
        }
    }
}

/// Current conditions for one location at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    /// ISO 3166 country code, when the provider knows it
    pub country: Option<String>,
    pub coordinates: Coordinates,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    /// m/s
    pub wind_speed: f64,
    /// Cloud cover, percent
    pub cloudiness: u8,
    /// Epoch seconds
    pub sunrise: i64,
    /// Epoch seconds
    pub sunset: i64,
    /// Epoch seconds
    pub observed_at: i64,
    /// Shift from UTC of the location, seconds
    pub utc_offset_secs: i32,
}

impl WeatherSnapshot {
    pub fn sunrise_local(&self) -> Option<DateTime<FixedOffset>> {
        local_time(self.sunrise, self.utc_offset_secs)
    }

    pub fn sunset_local(&self) -> Option<DateTime<FixedOffset>> {
        local_time(self.sunset, self.utc_offset_secs)
    }
}

/// One future time slot of the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Epoch seconds
    pub timestamp: i64,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
    pub humidity: u8,
    /// 0.0 ..= 1.0
    pub precipitation_probability: f64,
}

impl ForecastEntry {
    pub fn precipitation_percent(&self) -> u8 {
        (self.precipitation_probability.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    pub fn local_time(&self, utc_offset_secs: i32) -> Option<DateTime<FixedOffset>> {
        local_time(self.timestamp, utc_offset_secs)
    }
}

/// Snapshot and forecast produced by one load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeather {
    pub snapshot: WeatherSnapshot,
    pub forecast: Vec<ForecastEntry>,
}

/// Convert epoch seconds to the location's wall clock.
pub fn local_time(epoch_secs: i64, utc_offset_secs: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset_secs)?;
    DateTime::from_timestamp(epoch_secs, 0).map(|utc| utc.with_timezone(&offset))
}

/// Icon image for a provider icon code
pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/w/{icon}.png")
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Geolocation not supported")]
    Unsupported,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Invalid API key")]
    Unauthorized,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}
