//! Weather proxy client for the camp dashboard.
//!
//! Fetches current conditions from a wttr.in-compatible upstream in its
//! `format=j1` JSON form and hands the body back unchanged.

pub mod config;
pub mod http;

pub use config::WeatherConfig;
pub use http::{validate_location, WeatherClient};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather upstream error: {0}")]
    Http(String),
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("weather upstream returned invalid JSON: {0}")]
    InvalidResponse(String),
}
