//! Error types shared across the WeatherPro crates, each with the message
//! shown in the notification line.

use thiserror::Error;

/// Everything the dashboard can report to the user.
///
/// `user_message()` is the text of the notification; `Display` carries the
/// detail for logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Storage(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
        }
    }
}

/// Key/value storage errors (session and durable).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read storage: {0}")]
    ReadFailed(String),

    #[error("Failed to write storage: {0}")]
    WriteFailed(String),

    #[error("Stored value for '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::ReadFailed(_) => "Unable to read saved data.",
            StorageError::WriteFailed(_) => "Unable to save your changes. Please try again.",
            StorageError::Corrupt { .. } => "Saved data was unreadable and has been ignored.",
        }
    }
}

/// Geolocation errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Unable to get your location. Please allow location access."
            }
            LocationError::Unsupported => "Geolocation is not supported on this system.",
            LocationError::Unavailable(_) => "Unable to get your location. Please try again.",
        }
    }
}

/// Weather service errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Weather fetch failed: {0}")]
    FetchFailed(String),

    #[error("Invalid weather response: {0}")]
    InvalidResponse(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound(_) => "City not found. Please check the name and try again.",
            WeatherError::FetchFailed(_) | WeatherError::InvalidResponse(_) => {
                "Failed to fetch weather data. Please try again."
            }
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
        }
    }
}
