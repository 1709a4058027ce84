use crate::services::weather_service::WeatherError as UiWeatherError;
use weatherpro_core::{AppError, LocationError, WeatherError};

impl From<UiWeatherError> for AppError {
    fn from(e: UiWeatherError) -> Self {
        match e {
            UiWeatherError::CityNotFound(s) => AppError::Weather(WeatherError::CityNotFound(s)),
            UiWeatherError::InvalidApiKey => AppError::Weather(WeatherError::InvalidApiKey),
            UiWeatherError::Unavailable(status) => AppError::Weather(WeatherError::FetchFailed(
                format!("service unavailable ({})", status),
            )),
            UiWeatherError::Network(s) => AppError::Weather(WeatherError::FetchFailed(s)),
            UiWeatherError::InvalidResponse(s) => {
                AppError::Weather(WeatherError::InvalidResponse(s))
            }
            UiWeatherError::PermissionDenied => AppError::Location(LocationError::PermissionDenied),
            UiWeatherError::Unsupported => AppError::Location(LocationError::Unsupported),
            UiWeatherError::Location(s) => AppError::Location(LocationError::Unavailable(s)),
        }
    }
}
