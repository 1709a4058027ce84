//! Theme preference in durable storage.

use weatherpro_core::{Storage, StorageError, Theme};

pub const THEME_KEY: &str = "theme";

/// Stored theme, light when unset or unreadable.
pub fn restore(storage: &dyn Storage) -> Theme {
    match storage.get_item(THEME_KEY) {
        Ok(value) => Theme::from_stored(value.as_deref()),
        Err(e) => {
            tracing::warn!("Could not read theme preference: {}", e);
            Theme::Light
        }
    }
}

pub fn persist(storage: &mut dyn Storage, theme: Theme) -> Result<(), StorageError> {
    storage.set_item(THEME_KEY, theme.as_str())
}

/// Class set of the root element for `theme`.
pub fn root_classes(theme: Theme) -> Vec<&'static str> {
    match theme {
        Theme::Dark => vec!["dark"],
        Theme::Light => Vec::new(),
    }
}
