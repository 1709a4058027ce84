//! Weather backend: async location and weather fetching.
//! All network work runs off the UI thread; results sent via mpsc.

use std::sync::Arc;

use tokio::runtime::Handle;
use weatherpro_weather::{
    CityWeather, Coordinates, Geolocator, LocationError, LocationQuery, WeatherProvider,
};

/// Error type for weather operations
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherError {
    CityNotFound(String),
    InvalidApiKey,
    /// Provider answered with a server error
    Unavailable(u16),
    Network(String),
    InvalidResponse(String),
    PermissionDenied,
    Unsupported,
    Location(String),
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherError::CityNotFound(s) => write!(f, "City not found: {}", s),
            WeatherError::InvalidApiKey => write!(f, "Weather API rejected the key"),
            WeatherError::Unavailable(status) => {
                write!(f, "Weather service unavailable ({})", status)
            }
            WeatherError::Network(s) => write!(f, "Weather error: {}", s),
            WeatherError::InvalidResponse(s) => write!(f, "Invalid weather response: {}", s),
            WeatherError::PermissionDenied => write!(f, "Location permission denied"),
            WeatherError::Unsupported => write!(f, "Geolocation not supported"),
            WeatherError::Location(s) => write!(f, "Location error: {}", s),
        }
    }
}

impl std::error::Error for WeatherError {}

impl From<weatherpro_weather::WeatherError> for WeatherError {
    fn from(e: weatherpro_weather::WeatherError) -> Self {
        use weatherpro_weather::WeatherError as Provider;
        match e {
            Provider::CityNotFound(city) => WeatherError::CityNotFound(city),
            Provider::Unauthorized => WeatherError::InvalidApiKey,
            Provider::Api { status, .. } if status >= 500 => WeatherError::Unavailable(status),
            Provider::Api { status, message } => {
                WeatherError::Network(format!("{} ({})", message, status))
            }
            Provider::Network(e) => WeatherError::Network(e.to_string()),
            Provider::Parse(s) => WeatherError::InvalidResponse(s),
        }
    }
}

impl From<LocationError> for WeatherError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::PermissionDenied => WeatherError::PermissionDenied,
            LocationError::Unsupported => WeatherError::Unsupported,
            LocationError::Unavailable(s) => WeatherError::Location(s),
        }
    }
}

/// Messages sent from async operations back to the UI thread
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of asking the geolocator for a position
    Located {
        generation: u64,
        result: Result<Coordinates, WeatherError>,
    },
    /// Result of a coordinated snapshot + forecast load
    LoadDone {
        generation: u64,
        result: Result<CityWeather, WeatherError>,
    },
}

/// Request a position fix asynchronously.
/// Sends `Located` on the channel when complete.
pub fn request_locate(
    tx: &std::sync::mpsc::Sender<WeatherServiceMessage>,
    runtime: &Handle,
    geolocator: Arc<dyn Geolocator>,
    generation: u64,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = geolocator.current_position().await.map_err(WeatherError::from);
        match &result {
            Ok(position) => tracing::info!("Got location: {}", position),
            Err(e) => tracing::warn!("Location request failed: {}", e),
        }
        let _ = tx.send(WeatherServiceMessage::Located { generation, result });
    });
}

/// Request snapshot + forecast asynchronously.
/// Sends `LoadDone` on the channel when complete.
pub fn request_load(
    tx: &std::sync::mpsc::Sender<WeatherServiceMessage>,
    runtime: &Handle,
    provider: Arc<WeatherProvider>,
    query: LocationQuery,
    generation: u64,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = provider.load(&query).await.map_err(|e| {
            tracing::error!("Failed to load weather for {}: {}", query, e);
            WeatherError::from(e)
        });
        let _ = tx.send(WeatherServiceMessage::LoadDone { generation, result });
    });
}
