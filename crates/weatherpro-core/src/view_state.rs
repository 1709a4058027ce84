//! View state shared by the dashboard controller and renderer.

use serde::{Deserialize, Serialize};

/// Which panel the tab bar has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Weather for the user's own position
    #[default]
    User,
    Search,
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "your" | "home" => Ok(Tab::User),
            "search" => Ok(Tab::Search),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// Page sections reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Weather,
    Forecast,
    Saved,
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weather" | "home" => Ok(Section::Weather),
            "forecast" => Ok(Section::Forecast),
            "saved" => Ok(Section::Saved),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

/// Color theme. Persisted as `"dark"` / `"light"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than `"dark"` reads as light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Load state of one region of the view.
///
/// Every state except `Idle` remembers the last value that loaded
/// successfully, so a failed or in-flight load never blanks what is on
/// screen.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading { previous: Option<T> },
    Loaded(T),
    Failed { message: String, previous: Option<T> },
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    /// The value to display, if any.
    pub fn displayed(&self) -> Option<&T> {
        match self {
            LoadState::Idle => None,
            LoadState::Loading { previous } | LoadState::Failed { previous, .. } => {
                previous.as_ref()
            }
            LoadState::Loaded(value) => Some(value),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    /// Error message of the last failed load.
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    fn take_displayed(&mut self) -> Option<T> {
        match std::mem::take(self) {
            LoadState::Idle => None,
            LoadState::Loading { previous } | LoadState::Failed { previous, .. } => previous,
            LoadState::Loaded(value) => Some(value),
        }
    }

    /// Enter `Loading`, keeping whatever is displayed.
    pub fn begin(&mut self) {
        let previous = self.take_displayed();
        *self = LoadState::Loading { previous };
    }

    pub fn succeed(&mut self, value: T) {
        *self = LoadState::Loaded(value);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let previous = self.take_displayed();
        *self = LoadState::Failed {
            message: message.into(),
            previous,
        };
    }

    /// Leave `Loading` without a result, returning to what was displayed
    /// before.
    pub fn abandon(&mut self) {
        if self.is_loading() {
            *self = match self.take_displayed() {
                Some(value) => LoadState::Loaded(value),
                None => LoadState::Idle,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_storage_values() {
        assert_eq!(Theme::from_stored(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
        assert_eq!(Theme::from_stored(Some("purple")), Theme::Light);
        assert_eq!(Theme::from_stored(None), Theme::Light);
        assert_eq!(Theme::Dark.as_str(), "dark");
    }

    #[test]
    fn theme_toggle_twice_is_identity() {
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn tab_and_section_parse() {
        assert_eq!("search".parse::<Tab>(), Ok(Tab::Search));
        assert_eq!("USER".parse::<Tab>(), Ok(Tab::User));
        assert!("other".parse::<Tab>().is_err());
        assert_eq!("saved".parse::<Section>(), Ok(Section::Saved));
        assert_eq!("forecast".parse::<Section>(), Ok(Section::Forecast));
    }

    #[test]
    fn idle_displays_nothing() {
        let state: LoadState<u32> = LoadState::Idle;
        assert_eq!(state.displayed(), None);
        assert!(!state.is_loading());
    }

    #[test]
    fn loading_keeps_previous_value() {
        let mut state = LoadState::Loaded(1);
        state.begin();
        assert!(state.is_loading());
        assert_eq!(state.displayed(), Some(&1));
    }

    #[test]
    fn failure_keeps_previous_value() {
        let mut state = LoadState::Loaded(1);
        state.begin();
        state.fail("timeout");
        assert_eq!(state.displayed(), Some(&1));
        assert_eq!(state.error(), Some("timeout"));
        assert!(!state.is_loading());
    }

    #[test]
    fn failure_without_previous_displays_nothing() {
        let mut state: LoadState<u32> = LoadState::Idle;
        state.begin();
        state.fail("not found");
        assert_eq!(state.displayed(), None);
    }

    #[test]
    fn success_replaces_value() {
        let mut state = LoadState::Loaded(1);
        state.begin();
        state.succeed(2);
        assert_eq!(state, LoadState::Loaded(2));
    }

    #[test]
    fn abandon_restores_previous() {
        let mut state = LoadState::Loaded(1);
        state.begin();
        state.abandon();
        assert_eq!(state, LoadState::Loaded(1));

        let mut empty: LoadState<u32> = LoadState::Idle;
        empty.begin();
        empty.abandon();
        assert_eq!(empty, LoadState::Idle);
    }

    #[test]
    fn abandon_outside_loading_is_noop() {
        let mut state: LoadState<u32> = LoadState::Failed {
            message: "x".into(),
            previous: None,
        };
        state.abandon();
        assert_eq!(state.error(), Some("x"));
    }
}
