//! The three screens: home (default city), search, settings.

pub mod home;
pub mod search;
pub mod settings;
