//! Defines the immutable, shared state for the application.

use std::ops::Deref;
use std::sync::Arc;

use api::config::ConfirmConfig;
use api::config::EnvironmentType;
use api::tx::ChainId;

/// Settings fixed for the lifetime of the window.
#[derive(Debug, PartialEq)]
pub struct AppStateData {
    pub config: ConfirmConfig,
}

impl AppStateData {
    pub fn environment(&self) -> EnvironmentType {
        self.config.environment
    }

    pub fn chain_id(&self) -> ChainId {
        self.config.chain_id
    }
}

/// The shared, non-reactive application state, provided as a Dioxus context.
#[derive(Clone, Debug, PartialEq)]
pub struct AppState(Arc<AppStateData>);

impl Deref for AppState {
    type Target = AppStateData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AppState {
    pub fn new(config: ConfirmConfig) -> Self {
        Self(Arc::new(AppStateData { config }))
    }
}
