//! Weather data for WeatherPro
//!
//! Current conditions and short-range forecast from the OpenWeatherMap API,
//! plus the position sources used for "your weather".

pub mod location;
pub mod provider;
pub mod types;

pub use location::{DeniedGeolocator, FixedGeolocator, Geolocator, IpGeolocator};
pub use provider::{ProviderSettings, WeatherProvider};
pub use types::*;
