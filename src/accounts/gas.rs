use std::io;

use tracing::{info, warn};

use super::{SupplyStatus, UtilityAccount, UtilityKind};
use crate::address::Address;
use crate::error::{Result, accumulate, ensure_non_negative};
use crate::rates::SharedRates;

/// Flat-rate gas account.
#[derive(Debug, Clone)]
pub struct GasAccount {
    address: Address,
    consumption_m3: f64,
    rates: SharedRates,
}

impl GasAccount {
    /// Opens an account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the initial consumption is negative.
    pub fn new(address: Address, initial_consumption_m3: f64, rates: SharedRates) -> Result<Self> {
        let consumption_m3 = ensure_non_negative("initial_consumption", initial_consumption_m3)?;
        Ok(Self {
            address,
            consumption_m3,
            rates,
        })
    }

    /// Records gas consumed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative amount or an overflowing
    /// total; totals are unchanged.
    pub fn add_usage(&mut self, m3: f64) -> Result<()> {
        self.consumption_m3 = accumulate("usage", self.consumption_m3, m3).inspect_err(|e| {
            warn!(address = %self.address, error = %e, "gas usage rejected");
        })?;
        Ok(())
    }

    /// Total consumption this period (m³).
    pub fn total_consumption(&self) -> f64 {
        self.consumption_m3
    }

    fn bill_for(&self, unit_price: f64) -> f64 {
        if self.consumption_m3 <= 0.0 {
            0.0
        } else {
            self.consumption_m3 * unit_price
        }
    }
}

impl UtilityAccount for GasAccount {
    fn kind(&self) -> UtilityKind {
        UtilityKind::Gas
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn period_usage(&self) -> f64 {
        self.consumption_m3
    }

    fn plan_label(&self) -> String {
        "flat_rate".to_string()
    }

    fn calculate_bill(&self) -> Result<f64> {
        Ok(self.bill_for(self.rates.read().gas().unit_price))
    }

    fn supply(&self) -> SupplyStatus {
        let status = SupplyStatus::GridConnected;
        info!(address = %self.address, %status, "managing gas supply");
        status
    }

    fn show_status(&self, out: &mut dyn io::Write) -> io::Result<()> {
        let unit_price = self.rates.read().gas().unit_price;
        let bill = self.bill_for(unit_price);
        writeln!(out, "--- Gas Status for Address: [{}] ---", self.address)?;
        writeln!(out, "   Total Consumption This Period: {:.2} m³", self.consumption_m3)?;
        writeln!(out, "   Grid Unit Price: {unit_price:.2}/m³")?;
        writeln!(out, "   Estimated Grid Bill: {bill:.2}")?;
        writeln!(out, "-------------------------------------------")
    }
}
