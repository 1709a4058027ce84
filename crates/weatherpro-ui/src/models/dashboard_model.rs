//! Dashboard view-state controller.
//!
//! Owns every piece of view state and is driven from a single thread. Network
//! work is handed to the service layer; results come back over an mpsc channel
//! and are applied by `poll` / `wait_until_idle`.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use weatherpro_core::{
    AppError, FetchState, FetchTracker, LoadState, Section, Storage, StorageExt, Tab, Theme,
};
use weatherpro_weather::{CityWeather, Coordinates, LocationQuery, WeatherSnapshot};

use crate::app_services::AppServices;
use crate::bookmarks::{Bookmarks, SavedLocation};
use crate::notify::Notifier;
use crate::services::{self, WeatherError, WeatherServiceMessage};
use crate::theme;

pub const USER_COORDINATES_KEY: &str = "user-coordinates";

/// Which page regions are currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Panels {
    pub grant_access: bool,
    pub search_form: bool,
    pub loading: bool,
    pub weather_card: bool,
}

pub struct DashboardModel {
    services: AppServices,
    session: Box<dyn Storage>,
    durable: Box<dyn Storage>,
    notifier: Box<dyn Notifier>,

    tracker: FetchTracker,
    weather: LoadState<CityWeather>,
    bookmarks: Bookmarks,

    tab: Tab,
    section: Section,
    menu_open: bool,
    theme: Theme,
    location_access: bool,
    search_input: String,

    tx: Sender<WeatherServiceMessage>,
    rx: Receiver<WeatherServiceMessage>,
}

impl DashboardModel {
    pub fn new(
        services: AppServices,
        session: Box<dyn Storage>,
        durable: Box<dyn Storage>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            services,
            session,
            durable,
            notifier,
            tracker: FetchTracker::new(),
            weather: LoadState::Idle,
            bookmarks: Bookmarks::default(),
            tab: Tab::User,
            section: Section::Weather,
            menu_open: false,
            theme: Theme::Light,
            location_access: false,
            search_input: String::new(),
            tx,
            rx,
        }
    }

    /// Restore cached coordinates, saved locations and theme.
    pub fn start(&mut self) {
        if let Some(coordinates) = self.cached_coordinates() {
            tracing::info!("Restoring weather for cached position {}", coordinates);
            self.load(LocationQuery::Coordinates(coordinates));
        }

        self.bookmarks = Bookmarks::restore(self.session.as_ref());
        self.theme = theme::restore(self.durable.as_ref());
        tracing::debug!(
            "Dashboard started ({} saved, theme {})",
            self.bookmarks.len(),
            self.theme.as_str()
        );
    }

    /// Ask for the user's position, then load weather for it.
    pub fn grant_location(&mut self) {
        let geolocator = self.services.geolocator();
        if !geolocator.is_available() {
            self.report(WeatherError::Unsupported);
            return;
        }

        let generation = self.tracker.begin_locate();
        self.weather.begin();
        services::request_weather_locate(&self.tx, &self.services.handle(), geolocator, generation);
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;

        if tab == Tab::User {
            if let Some(coordinates) = self.cached_coordinates() {
                self.load(LocationQuery::Coordinates(coordinates));
            }
        }
    }

    /// Select the search tab without reloading anything.
    pub fn open_search(&mut self) {
        self.tab = Tab::Search;
    }

    pub fn set_search_input(&mut self, text: impl Into<String>) {
        self.search_input = text.into();
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Load weather for the search input. Returns false if the input is blank.
    pub fn submit_search(&mut self) -> bool {
        let city = self.search_input.trim();
        if city.is_empty() {
            return false;
        }
        let query = LocationQuery::City(city.to_string());
        self.load(query);
        true
    }

    /// Bookmark the displayed snapshot. Nothing displayed is a no-op.
    pub fn save_current(&mut self) {
        let Some(snapshot) = self.weather.displayed().map(|w| w.snapshot.clone()) else {
            return;
        };

        match self.bookmarks.add(self.session.as_mut(), &snapshot) {
            Ok(()) => {
                tracing::info!("Saved {} ({} saved)", snapshot.city, self.bookmarks.len());
                self.notifier
                    .alert(&format!("{} has been added to saved locations!", snapshot.city));
            }
            Err(e) => {
                tracing::error!("Failed to save location: {}", e);
                self.notifier.alert(AppError::from(e).user_message());
            }
        }
    }

    pub fn remove_saved(&mut self, index: usize) {
        match self.bookmarks.remove(self.session.as_mut(), index) {
            Ok(Some(removed)) => tracing::info!("Removed saved location {}", removed.city),
            Ok(None) => tracing::debug!("No saved location at {}", index),
            Err(e) => {
                tracing::error!("Failed to update saved locations: {}", e);
                self.notifier.alert(AppError::from(e).user_message());
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = theme::persist(self.durable.as_mut(), self.theme) {
            tracing::warn!("Failed to persist theme: {}", e);
        }
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Jump to a page section. Closes the menu.
    pub fn navigate(&mut self, section: Section) {
        self.section = section;
        self.menu_open = false;
    }

    /// Apply every result that has arrived. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.rx.try_recv() {
            changed |= self.handle_message(message);
        }
        changed
    }

    /// Apply results until nothing is in flight or `timeout` elapses.
    /// Returns true if the dashboard went idle.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.tracker.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(message) => {
                    self.handle_message(message);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    // Rendering queries

    pub fn panels(&self) -> Panels {
        let loading = self.weather.is_loading();
        let displayed = self.weather.displayed().is_some();
        Panels {
            grant_access: self.tab == Tab::User && !self.location_access && !loading && !displayed,
            search_form: self.tab == Tab::Search,
            loading,
            weather_card: displayed && !loading,
        }
    }

    pub fn root_classes(&self) -> Vec<&'static str> {
        theme::root_classes(self.theme)
    }

    pub fn weather(&self) -> &LoadState<CityWeather> {
        &self.weather
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.weather.displayed().map(|w| &w.snapshot)
    }

    pub fn is_loading(&self) -> bool {
        self.weather.is_loading()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.tracker.state()
    }

    pub fn saved(&self) -> &[SavedLocation] {
        self.bookmarks.entries()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn location_access(&self) -> bool {
        self.location_access
    }

    pub fn session_storage(&self) -> &dyn Storage {
        self.session.as_ref()
    }

    pub fn durable_storage(&self) -> &dyn Storage {
        self.durable.as_ref()
    }

    fn load(&mut self, query: LocationQuery) {
        let generation = self.tracker.begin_load();
        self.weather.begin();
        tracing::info!("Loading weather for {} (request {})", query, generation);
        services::request_weather_load(
            &self.tx,
            &self.services.handle(),
            self.services.provider(),
            query,
            generation,
        );
    }

    fn handle_message(&mut self, message: WeatherServiceMessage) -> bool {
        match message {
            WeatherServiceMessage::Located { generation, result } => {
                if !self.accepts_location(generation) {
                    return false;
                }
                match result {
                    Ok(coordinates) => self.on_located(generation, coordinates),
                    Err(e) => {
                        self.tracker.locate_failed(generation);
                        self.weather.abandon();
                        self.report(e);
                    }
                }
                true
            }
            WeatherServiceMessage::LoadDone { generation, result } => {
                if !self.tracker.loaded(generation) {
                    tracing::debug!("Discarding result of superseded request {}", generation);
                    return false;
                }
                match result {
                    Ok(weather) => {
                        tracing::info!("Showing weather for {}", weather.snapshot.city);
                        self.weather.succeed(weather);
                    }
                    Err(e) => {
                        let message = AppError::from(e.clone()).user_message();
                        self.weather.fail(message);
                        self.report(e);
                    }
                }
                true
            }
        }
    }

    fn accepts_location(&self, generation: u64) -> bool {
        let accepted = self.tracker.state().accepts_location(generation);
        if !accepted {
            tracing::debug!("Discarding position from superseded request {}", generation);
        }
        accepted
    }

    fn on_located(&mut self, generation: u64, coordinates: Coordinates) {
        if let Err(e) = self.session.set_json(USER_COORDINATES_KEY, &coordinates) {
            tracing::warn!("Could not cache coordinates: {}", e);
        }
        self.location_access = true;
        self.tracker.located(generation);
        services::request_weather_load(
            &self.tx,
            &self.services.handle(),
            self.services.provider(),
            LocationQuery::Coordinates(coordinates),
            generation,
        );
    }

    fn cached_coordinates(&self) -> Option<Coordinates> {
        match self.session.get_json::<Coordinates>(USER_COORDINATES_KEY) {
            Ok(coordinates) => coordinates,
            Err(e) => {
                tracing::warn!("Ignoring cached coordinates: {}", e);
                None
            }
        }
    }

    fn report(&self, error: WeatherError) {
        let error = AppError::from(error);
        tracing::error!("{}", error);
        self.notifier.alert(error.user_message());
    }
}
