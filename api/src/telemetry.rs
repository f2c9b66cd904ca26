//! Fire-and-forget product analytics events.

use std::collections::BTreeMap;

use dioxus_logger::tracing::info;
use serde::Deserialize;
use serde::Serialize;

pub const CATEGORY_TRANSACTIONS: &str = "Transactions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub category: String,
    pub event: String,
    pub properties: BTreeMap<String, String>,
}

impl TelemetryEvent {
    pub fn new(category: &str, event: &str) -> Self {
        Self {
            category: category.to_string(),
            event: event.to_string(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The coordinator has focused a transaction.
    pub fn confirm_started(origin: &str) -> Self {
        Self::new(CATEGORY_TRANSACTIONS, "Confirm: Started")
            .with("action", "Confirm Screen")
            .with("origin", origin)
    }

    pub fn edit_transaction(origin: &str) -> Self {
        Self::new(CATEGORY_TRANSACTIONS, "Edit Transaction")
            .with("action", "Confirm Screen")
            .with("origin", origin)
    }

    pub fn edit_gas(origin: &str, function_type: &str) -> Self {
        Self::new(CATEGORY_TRANSACTIONS, "User clicks \"Edit\" on gas")
            .with("action", "Confirm Screen")
            .with("origin", origin)
            .with("function_type", function_type)
    }

    /// A notification window was closed without a decision.
    pub fn cancel_via_notification_close(origin: &str) -> Self {
        Self::new(CATEGORY_TRANSACTIONS, "Cancel Tx Via Notification Close")
            .with("action", "Confirm Screen")
            .with("origin", origin)
    }
}

pub trait Telemetry {
    fn emit(&self, event: TelemetryEvent);
}

/// Writes events to the log instead of a collector.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn emit(&self, event: TelemetryEvent) {
        let properties = serde_json::to_string(&event.properties).unwrap_or_default();
        info!(
            category = %event.category,
            event = %event.event,
            "telemetry {properties}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_gas_event_carries_classification() {
        let event = TelemetryEvent::edit_gas("https://dapp.example", "approve");
        assert_eq!(event.category, "Transactions");
        assert_eq!(event.event, "User clicks \"Edit\" on gas");
        assert_eq!(event.property("function_type"), Some("approve"));
        assert_eq!(event.property("origin"), Some("https://dapp.example"));
    }

    #[test]
    fn serializes_as_flat_json() {
        let event = TelemetryEvent::confirm_started("wallet");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Confirm: Started");
        assert_eq!(json["properties"]["action"], "Confirm Screen");
    }
}
