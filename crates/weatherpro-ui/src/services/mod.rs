pub mod weather_service;

pub use weather_service::{
    request_load as request_weather_load, request_locate as request_weather_locate, WeatherError,
    WeatherServiceMessage,
};
