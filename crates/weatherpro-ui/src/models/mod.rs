pub mod dashboard_model;

pub use dashboard_model::{DashboardModel, Panels, USER_COORDINATES_KEY};
