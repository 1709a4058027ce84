//! Sources for the user's position.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{Coordinates, LocationError};

/// Produces one position fix on request.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;

    /// False when this system has no way to produce a position at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Position taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.position.ok_or(LocationError::Unsupported)
    }

    fn is_available(&self) -> bool {
        self.position.is_some()
    }
}

/// Always refuses, as if the user declined the permission prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocator;

#[async_trait]
impl Geolocator for DeniedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    message: Option<String>,
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    url: String,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "lookup returned {}",
                response.status()
            )));
        }

        let lookup: IpLookup = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if lookup.status != "success" {
            let reason = lookup.message.unwrap_or(lookup.status);
            return Err(LocationError::Unavailable(reason));
        }

        match (lookup.lat, lookup.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!(
                    "IP lookup placed us near {}",
                    lookup.city.as_deref().unwrap_or("an unnamed place")
                );
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(LocationError::Unavailable(
                "lookup returned no coordinates".to_string(),
            )),
        }
    }
}
