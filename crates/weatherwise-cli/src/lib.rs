//! WeatherWise terminal front end
//!
//! Wires the preference store and weather provider together and renders the
//! home, search and settings screens as text.

pub mod app_services;
pub mod cli;
pub mod error_mapping;
pub mod render;
pub mod screens;

pub use app_services::AppServices;
pub use render::Palette;
