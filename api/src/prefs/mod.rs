//! User-facing preferences.

pub mod display_preference;
pub mod user_prefs;
