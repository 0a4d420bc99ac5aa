//! One-step-ahead wind and solar production forecasting.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod index;
pub mod io;
pub mod logging;
/// Pretrained forecasting models.
pub mod models;
pub mod report;
pub mod series;
pub mod synthetic;
#[cfg(feature = "tui")]
pub mod tui;
