//! Saved locations, kept in session storage.

use serde::{Deserialize, Serialize};
use weatherpro_core::{Storage, StorageError, StorageExt};
use weatherpro_weather::WeatherSnapshot;

pub const SAVED_LOCATIONS_KEY: &str = "savedLocations";

/// Flattened copy of a snapshot at the moment it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub description: String,
    pub icon: String,
    pub sunrise: i64,
    pub sunset: i64,
}

impl From<&WeatherSnapshot> for SavedLocation {
    fn from(s: &WeatherSnapshot) -> Self {
        Self {
            city: s.city.clone(),
            country: s.country.clone(),
            temp: s.temperature,
            max_temp: s.temp_max,
            min_temp: s.temp_min,
            description: s.description.clone(),
            icon: s.icon.clone(),
            sunrise: s.sunrise,
            sunset: s.sunset,
        }
    }
}

/// Ordered list of saved locations. Duplicates are allowed.
#[derive(Debug, Clone, Default)]
pub struct Bookmarks {
    entries: Vec<SavedLocation>,
}

impl Bookmarks {
    /// Read the list back from storage. Unreadable data starts an empty list.
    pub fn restore(storage: &dyn Storage) -> Self {
        let entries = match storage.get_json::<Vec<SavedLocation>>(SAVED_LOCATIONS_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Discarding saved locations: {}", e);
                Vec::new()
            }
        };
        Self { entries }
    }

    pub fn entries(&self) -> &[SavedLocation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a copy of `snapshot` and persist the whole list.
    pub fn add(
        &mut self,
        storage: &mut dyn Storage,
        snapshot: &WeatherSnapshot,
    ) -> Result<(), StorageError> {
        self.entries.push(SavedLocation::from(snapshot));
        self.persist(storage)
    }

    /// Remove the entry at `index`. Out of range is a no-op.
    pub fn remove(
        &mut self,
        storage: &mut dyn Storage,
        index: usize,
    ) -> Result<Option<SavedLocation>, StorageError> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        let removed = self.entries.remove(index);
        self.persist(storage)?;
        Ok(Some(removed))
    }

    fn persist(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        storage.set_json(SAVED_LOCATIONS_KEY, &self.entries)
    }
}
