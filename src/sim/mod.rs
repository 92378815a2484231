/// Billing-period driver.
pub mod runner;
/// Seeded daily usage profiles.
pub mod usage;
