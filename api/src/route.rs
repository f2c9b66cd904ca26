//! Destinations the coordinator can send the user to.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::tx::TxId;

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
pub enum HomeTab {
    #[default]
    Assets,
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumIs)]
pub enum Route {
    /// Overview screen; also where decisions land.
    Home(HomeTab),
    Confirm(TxId),
    EditTransaction(TxId),
}

impl Default for Route {
    fn default() -> Self {
        Self::Home(HomeTab::default())
    }
}

impl Route {
    /// Where an acknowledged confirmed/dropped transaction leads.
    pub fn activity() -> Self {
        Self::Home(HomeTab::Activity)
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home(HomeTab::Assets) => "/".to_string(),
            Self::Home(HomeTab::Activity) => "/?tab=activity".to_string(),
            Self::Confirm(id) => format!("/confirm-transaction/{id}"),
            Self::EditTransaction(id) => format!("/confirm-transaction/{id}/edit"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
