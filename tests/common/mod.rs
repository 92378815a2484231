//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use rand::{Rng, SeedableRng, rngs::StdRng};

use utility_billing::accounts::{
    ElectricityAccount, GasAccount, InternetAccount, SupplyStrategy, WaterAccount,
};
use utility_billing::address::Address;
use utility_billing::rates::{InternetPlan, SharedRates, WaterPlan};

/// Rate table with built-in tariffs (electricity 8/3, gas 5).
pub fn default_rates() -> SharedRates {
    SharedRates::default()
}

/// A fixed test address.
pub fn test_address() -> Address {
    Address::new("21 Fixture Street", "Testville", "11111")
}

/// Grid-tied solar account with 100 kWh consumed and `generation` kWh generated.
pub fn solar_account(rates: &SharedRates, generation: f64) -> ElectricityAccount {
    ElectricityAccount::new(
        test_address(),
        SupplyStrategy::GridTiedSolar,
        100.0,
        generation,
        rates.clone(),
    )
    .expect("fixture account should open")
}

/// Empty gas account.
pub fn gas_account(rates: &SharedRates) -> GasAccount {
    GasAccount::new(test_address(), 0.0, rates.clone()).expect("fixture account should open")
}

/// Empty water account on `plan`.
pub fn water_account(rates: &SharedRates, plan: WaterPlan) -> WaterAccount {
    WaterAccount::new(test_address(), plan, 0.0, rates.clone())
        .expect("fixture account should open")
}

/// Empty internet account on `plan`.
pub fn internet_account(rates: &SharedRates, plan: InternetPlan) -> InternetAccount {
    InternetAccount::new(test_address(), plan, 0.0, rates.clone())
        .expect("fixture account should open")
}

/// Seeded RNG for property-style loops.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `n` random non-negative amounts below `max`.
pub fn random_amounts(rng: &mut StdRng, n: usize, max: f64) -> Vec<f64> {
    (0..n).map(|_| rng.random::<f64>() * max).collect()
}
