//! Text rendering of the dashboard.
//!
//! Produces the page as plain lines: navigation bar, then the focused section.
//! The weather section holds the tab bar and whichever panels are visible.

use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone};
use weatherpro_core::{Section, Tab, Theme};
use weatherpro_weather::{icon_url, ForecastEntry, WeatherSnapshot};

use crate::bookmarks::SavedLocation;
use crate::models::DashboardModel;

const NAV_ITEMS: [(&str, &str); 4] = [
    ("home", "Home"),
    ("search", "Search Weather"),
    ("forecast", "Weather Forecast"),
    ("saved", "Saved Locations"),
];

/// Whole temperatures, halves rounded up.
fn round_temp(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn hh_mm<Tz: TimeZone>(time: Option<DateTime<Tz>>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn viewer_time(epoch_secs: i64) -> String {
    hh_mm(DateTime::from_timestamp(epoch_secs, 0).map(|t| t.with_timezone(&Local)))
}

pub fn render(model: &DashboardModel) -> String {
    let mut out = String::new();
    render_nav(&mut out, model);
    out.push('\n');
    match model.section() {
        Section::Weather => render_weather_section(&mut out, model),
        Section::Forecast => render_forecast(&mut out, model),
        Section::Saved => render_saved(&mut out, model.saved()),
    }
    out
}

fn render_nav(out: &mut String, model: &DashboardModel) {
    let theme_icon = match model.theme() {
        Theme::Dark => "sun",
        Theme::Light => "moon",
    };
    let _ = write!(out, "WeatherPro  ");
    for (_, label) in NAV_ITEMS {
        let _ = write!(out, "[{}] ", label);
    }
    let _ = writeln!(out, " ({}) [menu]", theme_icon);

    if model.menu_open() {
        for (command, label) in NAV_ITEMS {
            let _ = writeln!(out, "  {:<9} {}", command, label);
        }
    }
}

fn render_weather_section(out: &mut String, model: &DashboardModel) {
    let _ = writeln!(out, "Weather Pro");
    let (user, search) = match model.tab() {
        Tab::User => ("*Your Weather*", "Search Weather"),
        Tab::Search => ("Your Weather", "*Search Weather*"),
    };
    let _ = writeln!(out, "  {}  |  {}\n", user, search);

    let panels = model.panels();
    if panels.grant_access {
        let _ = writeln!(out, "  Grant Location Access");
        let _ = writeln!(out, "  Allow access to get your local weather information");
        let _ = writeln!(out, "  > grant");
    }
    if panels.search_form {
        let input = model.search_input();
        let shown = if input.is_empty() {
            "Search for city..."
        } else {
            input
        };
        let save = if model.snapshot().is_some() {
            "[save]"
        } else {
            "(save)"
        };
        let _ = writeln!(out, "  [{}] [search] {}", shown, save);
    }
    if panels.loading {
        let _ = writeln!(out, "  Loading weather data...");
    }
    if panels.weather_card {
        if let Some(snapshot) = model.snapshot() {
            render_card(out, snapshot);
        }
    }
    if let Some(message) = model.weather().error() {
        let _ = writeln!(out, "  ! {}", message);
    }
}

fn render_card(out: &mut String, s: &WeatherSnapshot) {
    let country = s.country.as_deref().map(|c| format!(" ({c})")).unwrap_or_default();
    let _ = writeln!(out, "  {}{}", s.city, country);
    let _ = writeln!(out, "  {}", s.description);
    let _ = writeln!(out, "  {}°C   {}", round_temp(s.temperature), icon_url(&s.icon));
    let _ = writeln!(
        out,
        "  High {}°C  Low {}°C",
        round_temp(s.temp_max),
        round_temp(s.temp_min)
    );
    let _ = writeln!(out, "  Wind Speed   {} m/s", s.wind_speed);
    let _ = writeln!(out, "  Humidity     {}%", s.humidity);
    let _ = writeln!(out, "  Cloudiness   {}%", s.cloudiness);
    let _ = writeln!(
        out,
        "  Sunrise {}  Sunset {}",
        hh_mm(s.sunrise_local()),
        hh_mm(s.sunset_local())
    );
}

fn forecast_line(entry: &ForecastEntry, utc_offset_secs: i32) -> String {
    let when = entry
        .local_time(utc_offset_secs)
        .map(|t| t.format("%a %H:%M").to_string())
        .unwrap_or_else(|| "--- --:--".to_string());
    format!(
        "{}  {:>4}°C  {:<18} Wind: {} m/s  Humidity: {}%  Rain: {}%",
        when,
        round_temp(entry.temperature),
        entry.description,
        entry.wind_speed,
        entry.humidity,
        entry.precipitation_percent()
    )
}

fn render_forecast(out: &mut String, model: &DashboardModel) {
    let _ = writeln!(out, "Weather Forecast");
    match model.weather().displayed() {
        Some(weather) if !weather.forecast.is_empty() => {
            let offset = weather.snapshot.utc_offset_secs;
            for entry in &weather.forecast {
                let _ = writeln!(out, "  {}", forecast_line(entry, offset));
            }
        }
        _ => {
            let _ = writeln!(out, "  Search for a location to see forecast data");
        }
    }
}

fn render_saved(out: &mut String, saved: &[SavedLocation]) {
    let _ = writeln!(out, "Saved Locations");
    if saved.is_empty() {
        let _ = writeln!(out, "  No saved locations yet.");
        let _ = writeln!(out, "  Search for a city and use \"save\" to add it here.");
        return;
    }
    for (index, location) in saved.iter().enumerate() {
        let country = location
            .country
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  [{}] {}{}  {}°C  H {}°C / L {}°C  {}",
            index,
            location.city,
            country,
            round_temp(location.temp),
            round_temp(location.max_temp),
            round_temp(location.min_temp),
            location.description
        );
        let _ = writeln!(
            out,
            "      Sunrise {}  Sunset {}   (remove {})",
            viewer_time(location.sunrise),
            viewer_time(location.sunset),
            index
        );
    }
}
