use std::env;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::tx::ChainId;

/// Chain the demo backend starts on when nothing is configured.
pub const DEFAULT_CHAIN_ID: ChainId = 1;

/// Kind of window the confirmation screen runs in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIs,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EnvironmentType {
    #[default]
    Popup,
    /// A transient window opened for a dapp request; closing it rejects.
    Notification,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmConfig {
    pub environment: EnvironmentType,
    pub chain_id: ChainId,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            environment: EnvironmentType::default(),
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl ConfirmConfig {
    /// - `CONFIRM_ENVIRONMENT`: popup, notification or fullscreen (default popup).
    /// - `CONFIRM_CHAIN_ID`: decimal chain id (default 1).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = lookup("CONFIRM_ENVIRONMENT")
            .and_then(|s| EnvironmentType::from_str(s.trim()).ok())
            .unwrap_or_default();
        let chain_id = lookup("CONFIRM_CHAIN_ID")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_CHAIN_ID);

        Self {
            environment,
            chain_id,
        }
    }
}
