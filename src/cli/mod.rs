//! Terminal output and first-run setup

pub mod rates;
pub mod setup;
pub mod ui;
