//! User preferences for WeatherWise
//!
//! Holds the temperature display unit, persists it through a pluggable
//! key-value store and converts canonical Celsius readings for display.

pub mod preferences;
pub mod storage;
pub mod unit;

pub use preferences::{LoadPhase, PreferenceStore, TEMPERATURE_UNIT_KEY};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use unit::{TemperatureUnit, UnknownUnit};
