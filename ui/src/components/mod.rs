//! Shared building blocks for the screens: pico wrappers, amounts, addresses
//! and queue navigation.
pub mod address;
pub mod amount;
pub mod pico;
pub mod tx_navigation;
