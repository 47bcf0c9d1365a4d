use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Temperature display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Returned when a string names neither supported unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown temperature unit: {0:?}")]
pub struct UnknownUnit(pub String);

impl TemperatureUnit {
    /// Literal used for persistence ("celsius" / "fahrenheit")
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }

    /// Single-letter suffix shown after a degree sign
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// The other unit
    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Convert a Celsius reading into this unit.
    ///
    /// No range checks: negative values and NaN go through the same formula.
    pub fn from_celsius(self, value_celsius: f64) -> f64 {
        match self {
            Self::Celsius => value_celsius,
            Self::Fahrenheit => value_celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match only; persisted values are never case-folded or trimmed.
impl FromStr for TemperatureUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "celsius" => Ok(Self::Celsius),
            "fahrenheit" => Ok(Self::Fahrenheit),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}
