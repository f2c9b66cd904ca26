use serde::Deserialize;
use serde::Serialize;

use super::display_preference::DisplayPreference;

/// All user preferences. Intended for a settings file later on.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct UserPrefs {
    display_preference: DisplayPreference,
    /// Show the editable nonce field on confirmation screens.
    use_nonce_field: bool,
}

impl UserPrefs {
    pub fn from_env() -> Self {
        Self {
            display_preference: DisplayPreference::from_env(),
            use_nonce_field: std::env::var("USE_NONCE_FIELD")
                .map(|val| val.eq_ignore_ascii_case("true") || val == "1")
                .unwrap_or(true),
        }
    }

    pub fn display_preference(&self) -> &DisplayPreference {
        &self.display_preference
    }

    pub fn use_nonce_field(&self) -> bool {
        self.use_nonce_field
    }
}
