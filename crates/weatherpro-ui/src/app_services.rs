//! Shared application services.
//!
//! `AppServices` owns the tokio runtime that every background request runs on,
//! together with the weather provider and the position source. The dashboard
//! borrows handles from it; dropping it shuts the runtime down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::{Handle, Runtime};

use weatherpro_core::{Config, LocationSource};
use weatherpro_weather::{
    Coordinates, DeniedGeolocator, FixedGeolocator, Geolocator, IpGeolocator, ProviderSettings,
    WeatherProvider,
};

pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: Runtime,

    provider: Arc<WeatherProvider>,

    geolocator: Arc<dyn Geolocator>,
}

impl AppServices {
    pub fn new(provider: WeatherProvider, geolocator: Arc<dyn Geolocator>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("weatherpro-worker")
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        Ok(Self {
            runtime,
            provider: Arc::new(provider),
            geolocator,
        })
    }

    /// Build the provider and position source described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .provider
            .api_key()
            .context("No weather API key configured")?;
        let timeout = Duration::from_secs(config.provider.timeout_secs);

        let settings = ProviderSettings {
            api_key: api_key.to_string(),
            base_url: config.provider.base_url.clone(),
            timeout,
            forecast_entries: config.provider.forecast_entries,
        };
        let provider =
            WeatherProvider::new(settings).context("Failed to create weather provider")?;

        let location = &config.location;
        let geolocator: Arc<dyn Geolocator> = match location.source {
            LocationSource::Fixed => {
                let position = location
                    .latitude
                    .zip(location.longitude)
                    .map(|(lat, lon)| Coordinates::new(lat, lon));
                Arc::new(FixedGeolocator::new(position))
            }
            LocationSource::Ip => Arc::new(
                IpGeolocator::new(location.ip_lookup_url.clone(), timeout)
                    .context("Failed to create IP geolocator")?,
            ),
            LocationSource::Disabled => Arc::new(DeniedGeolocator),
        };

        tracing::info!(
            "Weather services ready (provider {}, location source {:?})",
            config.provider.base_url,
            location.source
        );
        Self::new(provider, geolocator)
    }

    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    pub fn provider(&self) -> Arc<WeatherProvider> {
        Arc::clone(&self.provider)
    }

    pub fn geolocator(&self) -> Arc<dyn Geolocator> {
        Arc::clone(&self.geolocator)
    }
}
