// This file makes the screen modules available to the rest of the application.

pub mod confirm_tx;
pub mod edit_tx;
pub mod overview;
