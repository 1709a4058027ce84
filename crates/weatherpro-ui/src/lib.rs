pub mod app_services;
pub mod bookmarks;
mod error_mapping;
pub mod models;
pub mod notify;
pub mod render;
pub mod services;
pub mod theme;

pub use app_services::AppServices;
pub use bookmarks::{Bookmarks, SavedLocation, SAVED_LOCATIONS_KEY};
pub use models::{DashboardModel, Panels, USER_COORDINATES_KEY};
pub use notify::{Notifier, RecordingNotifier, TerminalNotifier};
pub use render::render;
