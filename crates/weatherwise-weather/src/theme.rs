//! Time-of-day theming: day between 06:00 and 18:00 local time, night otherwise.

use chrono::{Local, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Day,
    Night,
}

/// Two-stop background gradient, hex colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub start: &'static str,
    pub end: &'static str,
}

const DAY_GRADIENT: Gradient = Gradient {
    start: "#4c95f5",
    end: "#1d62d1",
};

const NIGHT_GRADIENT: Gradient = Gradient {
    start: "#1f2b44",
    end: "#0c1220",
};

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) {
            Self::Day
        } else {
            Self::Night
        }
    }

    /// Based on the local clock
    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    pub fn gradient(self) -> Gradient {
        match self {
            Self::Day => DAY_GRADIENT,
            Self::Night => NIGHT_GRADIENT,
        }
    }
}

impl Gradient {
    /// Parse the start color into RGB components
    pub fn start_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex(self.start)
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}
