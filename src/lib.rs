//! Utility resource and billing engine.
//!
//! Per-address accounts for electricity, gas, water and internet, billed
//! against a shared rate table, plus a seeded billing-period simulator.

pub mod accounts;
pub mod address;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod portfolio;
pub mod rates;
/// Daily usage profiles and the billing-period runner.
pub mod sim;
pub mod statement;

pub use address::Address;
pub use error::{BillingError, Result};
