//! OpenWeatherMap client: current conditions and the 3-hourly forecast.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::types::{
    CityWeather, Coordinates, ForecastEntry, LocationQuery, WeatherError, WeatherSnapshot,
};

pub const OPENWEATHERMAP_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FORECAST_ENTRIES: usize = 8;

/// Every request is made in metric units (°C, m/s).
const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Sent as `appid` on every request
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// How many forecast slots to keep
    pub forecast_entries: usize,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENWEATHERMAP_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            forecast_entries: DEFAULT_FORECAST_ENTRIES,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    settings: ProviderSettings,
}

impl WeatherProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Current conditions at a position.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let lat = coordinates.lat.to_string();
        let lon = coordinates.lon.to_string();
        let current: owm::CurrentResponse = self
            .get(
                "weather",
                &[("lat", lat.as_str()), ("lon", lon.as_str())],
                &coordinates.to_string(),
            )
            .await?;
        Ok(current.into())
    }

    /// Current conditions for a city name.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_name(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let current: owm::CurrentResponse = self.get("weather", &[("q", city)], city).await?;
        Ok(current.into())
    }

    /// The first `forecast_entries` slots of the forecast for a city name.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
        let forecast: owm::ForecastResponse = self.get("forecast", &[("q", city)], city).await?;
        Ok(forecast
            .list
            .into_iter()
            .take(self.settings.forecast_entries)
            .map(ForecastEntry::from)
            .collect())
    }

    /// Snapshot, then the forecast for the snapshot's resolved city.
    ///
    /// Fails as a whole if either request fails.
    pub async fn load(&self, query: &LocationQuery) -> Result<CityWeather, WeatherError> {
        let snapshot = match query {
            LocationQuery::Coordinates(c) => self.fetch_by_coordinates(*c).await?,
            LocationQuery::City(name) => self.fetch_by_name(name).await?,
        };

        let forecast = if snapshot.city.is_empty() {
            tracing::debug!("No city name for {}, skipping forecast", query);
            Vec::new()
        } else {
            self.fetch_forecast(&snapshot.city).await?
        };

        tracing::info!(
            "Loaded weather for {} ({} forecast entries)",
            snapshot.city,
            forecast.len()
        );
        Ok(CityWeather { snapshot, forecast })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        subject: &str,
    ) -> Result<T, WeatherError> {
        let url = format!(
            "{}/data/2.5/{}",
            self.settings.base_url.trim_end_matches('/'),
            endpoint
        );

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("appid", self.settings.api_key.as_str()), ("units", UNITS)])
            .send()
            .await?;

        Self::handle_response(response, subject).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
        subject: &str,
    ) -> Result<T, WeatherError> {
        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::NOT_FOUND => return Err(WeatherError::CityNotFound(subject.to_string())),
            StatusCode::UNAUTHORIZED => return Err(WeatherError::Unauthorized),
            s if !s.is_success() => {
                let message = serde_json::from_str::<owm::ErrorBody>(&body)
                    .ok()
                    .and_then(|e| e.message)
                    .unwrap_or(body);
                tracing::warn!("Weather API returned {}: {}", s, message);
                return Err(WeatherError::Api {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

/// OpenWeatherMap response structures and conversion into domain types
mod owm {
    use super::{Coordinates, ForecastEntry, WeatherSnapshot};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ErrorBody {
        pub message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Coord {
        pub lat: f64,
        pub lon: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f64,
        pub temp_min: f64,
        pub temp_max: f64,
        #[serde(default)]
        pub humidity: u8,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct Wind {
        #[serde(default)]
        pub speed: f64,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct Clouds {
        #[serde(default)]
        pub all: u8,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct Sys {
        pub country: Option<String>,
        #[serde(default)]
        pub sunrise: i64,
        #[serde(default)]
        pub sunset: i64,
    }

    /// `/data/2.5/weather`
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub coord: Coord,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub main: Main,
        #[serde(default)]
        pub wind: Wind,
        #[serde(default)]
        pub clouds: Clouds,
        #[serde(default)]
        pub dt: i64,
        #[serde(default)]
        pub sys: Sys,
        #[serde(default)]
        pub timezone: i32,
        #[serde(default)]
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastMain {
        pub temp: f64,
        #[serde(default)]
        pub humidity: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        pub dt: i64,
        pub main: ForecastMain,
        #[serde(default)]
        pub weather: Vec<Condition>,
        #[serde(default)]
        pub wind: Wind,
        /// Probability of precipitation, 0..1
        pub pop: Option<f64>,
    }

    /// `/data/2.5/forecast`
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastItem>,
    }

    fn first_condition(conditions: Vec<Condition>) -> (String, String) {
        conditions
            .into_iter()
            .next()
            .map(|c| (c.description, c.icon))
            .unwrap_or_default()
    }

    impl From<CurrentResponse> for WeatherSnapshot {
        fn from(r: CurrentResponse) -> Self {
            let (description, icon) = first_condition(r.weather);
            let country = r.sys.country.filter(|c| !c.is_empty());
            WeatherSnapshot {
                city: r.name,
                country,
                coordinates: Coordinates::new(r.coord.lat, r.coord.lon),
                temperature: r.main.temp,
                temp_min: r.main.temp_min,
                temp_max: r.main.temp_max,
                description,
                icon,
                humidity: r.main.humidity,
                wind_speed: r.wind.speed,
                cloudiness: r.clouds.all,
                sunrise: r.sys.sunrise,
                sunset: r.sys.sunset,
                observed_at: r.dt,
                utc_offset_secs: r.timezone,
            }
        }
    }

    impl From<ForecastItem> for ForecastEntry {
        fn from(item: ForecastItem) -> Self {
            let (description, icon) = first_condition(item.weather);
            ForecastEntry {
                timestamp: item.dt,
                temperature: item.main.temp,
                description,
                icon,
                wind_speed: item.wind.speed,
                humidity: item.main.humidity,
                precipitation_probability: item.pop.unwrap_or(0.0),
            }
        }
    }
}
