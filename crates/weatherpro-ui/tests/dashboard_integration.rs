//! Integration tests for DashboardModel against a wiremock weather API.
//!
//! The dashboard runs its requests on its own runtime; the test thread drives
//! it synchronously like the UI loop does.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use weatherpro_core::{DurableStorage, SessionStorage, Storage, StorageExt, Tab, Theme};
use weatherpro_ui::{
    AppServices, DashboardModel, RecordingNotifier, SavedLocation, SAVED_LOCATIONS_KEY,
    USER_COORDINATES_KEY,
};
use weatherpro_weather::{
    Coordinates, DeniedGeolocator, FixedGeolocator, Geolocator, ProviderSettings, WeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(10);

fn current_json(name: &str, lat: f64, lon: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": lon, "lat": lat },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "main": { "temp": 14.2, "temp_min": 12.9, "temp_max": 15.4, "humidity": 72 },
        "wind": { "speed": 4.6 },
        "clouds": { "all": 75 },
        "dt": 1_700_000_000,
        "sys": { "country": "GB", "sunrise": 1_699_945_000, "sunset": 1_699_978_000 },
        "timezone": 0,
        "name": name
    })
}

fn forecast_json(count: usize) -> serde_json::Value {
    let list: Vec<_> = (0..count)
        .map(|i| {
            serde_json::json!({
                "dt": 1_700_010_800 + (i as i64) * 10_800,
                "main": { "temp": 11.0, "humidity": 80 },
                "weather": [{ "description": "light rain", "icon": "10d" }],
                "wind": { "speed": 5.0 },
                "pop": 0.4
            })
        })
        .collect();
    serde_json::json!({ "list": list })
}

struct Harness {
    rt: Runtime,
    server: MockServer,
    notifier: RecordingNotifier,
    dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self {
            rt,
            server,
            notifier: RecordingNotifier::new(),
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn mount_city(&self, name: &str) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/data/2.5/weather"))
                .and(query_param("q", name))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(current_json(name, 0.0, 0.0)),
                ),
        );
        self.mount(
            Mock::given(method("GET"))
                .and(path("/data/2.5/forecast"))
                .and(query_param("q", name))
                .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json(10))),
        );
    }

    fn weather_requests_with(&self, param: &str, value: &str) -> usize {
        let requests = self
            .rt
            .block_on(self.server.received_requests())
            .unwrap_or_default();
        requests
            .iter()
            .filter(|r| r.url.path() == "/data/2.5/weather")
            .filter(|r| r.url.query_pairs().any(|(k, v)| k == param && v == value))
            .count()
    }

    fn preferences_path(&self) -> std::path::PathBuf {
        self.dir.path().join("preferences.json")
    }

    fn settings(&self) -> ProviderSettings {
        ProviderSettings::new("test-key").with_base_url(self.server.uri())
    }

    fn dashboard(
        &self,
        geolocator: Arc<dyn Geolocator>,
        session: SessionStorage,
    ) -> DashboardModel {
        self.dashboard_with(self.settings(), geolocator, session)
    }

    fn dashboard_with(
        &self,
        settings: ProviderSettings,
        geolocator: Arc<dyn Geolocator>,
        session: SessionStorage,
    ) -> DashboardModel {
        let provider = WeatherProvider::new(settings).unwrap();
        let services = AppServices::new(provider, geolocator).unwrap();
        let durable = DurableStorage::open(self.preferences_path()).unwrap();
        DashboardModel::new(
            services,
            Box::new(session),
            Box::new(durable),
            Box::new(self.notifier.clone()),
        )
    }
}

fn search(dashboard: &mut DashboardModel, city: &str) {
    dashboard.switch_tab(Tab::Search);
    dashboard.set_search_input(city);
    assert!(dashboard.submit_search());
}

#[test]
fn test_grant_location_loads_weather_for_position() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_json("London", 51.5, -0.12)),
            ),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json(12))),
    );

    let geolocator = Arc::new(FixedGeolocator::new(Some(Coordinates::new(51.5, -0.12))));
    let mut dashboard = h.dashboard(geolocator, SessionStorage::new());
    dashboard.start();
    assert!(dashboard.panels().grant_access);

    dashboard.grant_location();
    assert!(dashboard.panels().loading);
    assert!(dashboard.wait_until_idle(WAIT));

    let weather = dashboard.weather().displayed().unwrap();
    assert_eq!(weather.snapshot.city, "London");
    assert_eq!(weather.forecast.len(), 8);
    assert!(dashboard.location_access());

    let panels = dashboard.panels();
    assert!(panels.weather_card);
    assert!(!panels.grant_access);
    assert!(!panels.loading);

    let cached: Option<Coordinates> = dashboard
        .session_storage()
        .get_json(USER_COORDINATES_KEY)
        .unwrap();
    assert_eq!(cached, Some(Coordinates::new(51.5, -0.12)));
}

#[test]
fn test_unknown_city_leaves_weather_unset() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
            ),
    );

    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), SessionStorage::new());
    search(&mut dashboard, "Atlantis");
    assert!(dashboard.wait_until_idle(WAIT));

    assert!(dashboard.snapshot().is_none());
    assert!(!dashboard.panels().weather_card);
    assert_eq!(
        h.notifier.last().as_deref(),
        Some("City not found. Please check the name and try again.")
    );
}

#[test]
fn test_save_appends_one_copy() {
    let h = Harness::new();
    h.mount_city("London");

    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), SessionStorage::new());
    search(&mut dashboard, "London");
    assert!(dashboard.wait_until_idle(WAIT));

    dashboard.save_current();

    assert_eq!(dashboard.saved().len(), 1);
    let saved = &dashboard.saved()[0];
    assert_eq!(saved.city, "London");
    assert_eq!(saved.country.as_deref(), Some("GB"));
    assert_eq!(saved.temp, 14.2);
    assert_eq!(saved.max_temp, 15.4);
    assert_eq!(saved.min_temp, 12.9);
    assert_eq!(saved.description, "broken clouds");
    assert_eq!(saved.icon, "04d");
    assert_eq!(saved.sunrise, 1_699_945_000);
    assert_eq!(saved.sunset, 1_699_978_000);
    assert_eq!(
        h.notifier.last().as_deref(),
        Some("London has been added to saved locations!")
    );

    let stored: Vec<SavedLocation> = dashboard
        .session_storage()
        .get_json(SAVED_LOCATIONS_KEY)
        .unwrap()
        .unwrap();
    assert_eq!(stored, dashboard.saved());
}

#[test]
fn test_remove_middle_entry_keeps_order() {
    let h = Harness::new();
    for city in ["Oslo", "Lima", "Pune"] {
        h.mount_city(city);
    }

    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), SessionStorage::new());
    for city in ["Oslo", "Lima", "Pune"] {
        search(&mut dashboard, city);
        assert!(dashboard.wait_until_idle(WAIT));
        dashboard.save_current();
    }
    assert_eq!(dashboard.saved().len(), 3);

    dashboard.remove_saved(1);
    let cities: Vec<_> = dashboard.saved().iter().map(|s| s.city.as_str()).collect();
    assert_eq!(cities, vec!["Oslo", "Pune"]);

    dashboard.remove_saved(7);
    assert_eq!(dashboard.saved().len(), 2);
}

#[test]
fn test_theme_toggle_twice_restores_preference() {
    let h = Harness::new();
    {
        let mut prefs = DurableStorage::open(h.preferences_path()).unwrap();
        prefs.set_item("theme", "dark").unwrap();
    }

    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), SessionStorage::new());
    dashboard.start();
    assert_eq!(dashboard.theme(), Theme::Dark);
    assert_eq!(dashboard.root_classes(), vec!["dark"]);

    dashboard.toggle_theme();
    assert!(dashboard.root_classes().is_empty());
    dashboard.toggle_theme();

    assert_eq!(dashboard.root_classes(), vec!["dark"]);
    let reopened = DurableStorage::open(h.preferences_path()).unwrap();
    assert_eq!(reopened.get_item("theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn test_switching_back_to_user_reloads_cached_position() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_json("London", 51.5, -0.12)),
            ),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json(8))),
    );

    let mut session = SessionStorage::new();
    session
        .set_json(USER_COORDINATES_KEY, &Coordinates::new(51.5, -0.12))
        .unwrap();

    // A denied geolocator would alert if the dashboard prompted again.
    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), session);
    dashboard.start();
    assert!(dashboard.wait_until_idle(WAIT));
    assert_eq!(h.weather_requests_with("lat", "51.5"), 1);

    dashboard.switch_tab(Tab::Search);
    assert!(!dashboard.is_loading());
    dashboard.switch_tab(Tab::User);
    assert!(dashboard.wait_until_idle(WAIT));

    assert_eq!(h.weather_requests_with("lat", "51.5"), 2);
    assert_eq!(dashboard.snapshot().map(|s| s.city.as_str()), Some("London"));
    assert!(h.notifier.messages().is_empty());
}

#[test]
fn test_superseded_search_is_not_applied() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Slowtown"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(current_json("Slowtown", 0.0, 0.0))
                    .set_delay(Duration::from_millis(600)),
            ),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Slowtown"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json(8))),
    );
    h.mount_city("Paris");

    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), SessionStorage::new());
    search(&mut dashboard, "Slowtown");
    search(&mut dashboard, "Paris");
    assert!(dashboard.wait_until_idle(WAIT));
    assert_eq!(dashboard.snapshot().map(|s| s.city.as_str()), Some("Paris"));

    // Let the slow response arrive, then apply whatever is queued.
    std::thread::sleep(Duration::from_millis(1200));
    assert!(!dashboard.poll());
    assert_eq!(dashboard.snapshot().map(|s| s.city.as_str()), Some("Paris"));
}

#[test]
fn test_forecast_failure_keeps_previous_pair() {
    let h = Harness::new();
    h.mount_city("Paris");
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Berlin"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_json("Berlin", 52.5, 13.4)),
            ),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Berlin"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream")),
    );

    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), SessionStorage::new());
    search(&mut dashboard, "Paris");
    assert!(dashboard.wait_until_idle(WAIT));
    let before = dashboard.weather().displayed().cloned().unwrap();

    search(&mut dashboard, "Berlin");
    assert!(dashboard.wait_until_idle(WAIT));

    assert_eq!(dashboard.weather().displayed(), Some(&before));
    assert!(dashboard.weather().error().is_some());
    assert!(dashboard.panels().weather_card);
    assert_eq!(
        h.notifier.last().as_deref(),
        Some("Failed to fetch weather data. Please try again.")
    );
}

#[test]
fn test_server_error_shows_generic_failure() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance")),
    );

    let mut dashboard = h.dashboard(Arc::new(DeniedGeolocator), SessionStorage::new());
    search(&mut dashboard, "Oslo");
    assert!(dashboard.wait_until_idle(WAIT));

    assert!(dashboard.snapshot().is_none());
    assert_eq!(
        h.notifier.last().as_deref(),
        Some("Failed to fetch weather data. Please try again.")
    );
}

#[test]
fn test_request_timeout_shows_generic_failure() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(current_json("Oslo", 59.9, 10.7))
                    .set_delay(Duration::from_secs(2)),
            ),
    );

    let settings = ProviderSettings {
        timeout: Duration::from_millis(200),
        ..h.settings()
    };
    let mut dashboard =
        h.dashboard_with(settings, Arc::new(DeniedGeolocator), SessionStorage::new());
    search(&mut dashboard, "Oslo");
    assert!(dashboard.wait_until_idle(WAIT));

    assert!(dashboard.snapshot().is_none());
    assert!(dashboard.weather().error().is_some());
    assert_eq!(
        h.notifier.last().as_deref(),
        Some("Failed to fetch weather data. Please try again.")
    );
}
