//! Pricing state shared by every account of a utility kind.
//!
//! A [`RateTable`] is an explicitly constructed value. Accounts never own it;
//! they hold a [`SharedRates`] handle and read it under a lock for the whole
//! duration of a bill computation. Only the administrative setters write to
//! it, and each setter validates its input before touching the table, so a
//! rejected update leaves the prior value observable.

/// Internet plan catalog.
pub mod internet;
/// Water tariff plans and tier tables.
pub mod water;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, ensure_non_negative};

pub use internet::{InternetCatalog, InternetPlan, PlanDetails};
pub use water::{TariffTier, WaterPlan, WaterPlanInfo, WaterTariffs};

// JSON has no infinity; unbounded limits serialize as null.
fn serialize_unbounded<S: serde::Serializer>(
    value: &f64,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    if value.is_finite() {
        s.serialize_f64(*value)
    } else {
        s.serialize_none()
    }
}

/// Grid import price and export credit for electricity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElectricityRates {
    /// Charge per kWh drawn from the grid.
    pub unit_price: f64,
    /// Credit per kWh exported to the grid.
    pub feed_in_tariff: f64,
}

impl Default for ElectricityRates {
    fn default() -> Self {
        Self {
            unit_price: 8.0,
            feed_in_tariff: 3.0,
        }
    }
}

/// Flat gas price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasRates {
    /// Charge per m³.
    pub unit_price: f64,
}

impl Default for GasRates {
    fn default() -> Self {
        Self { unit_price: 5.0 }
    }
}

/// Complete pricing state for one billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RateTable {
    electricity: ElectricityRates,
    gas: GasRates,
    water: WaterTariffs,
    internet: InternetCatalog,
}

impl RateTable {
    /// Builds a table from its parts, validating every price.
    ///
    /// Water and internet catalogs are validated by their own constructors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any electricity or gas price is negative.
    pub fn new(
        electricity: ElectricityRates,
        gas: GasRates,
        water: WaterTariffs,
        internet: InternetCatalog,
    ) -> Result<Self> {
        ensure_non_negative("electricity_unit_price", electricity.unit_price)?;
        ensure_non_negative("electricity_feed_in_tariff", electricity.feed_in_tariff)?;
        ensure_non_negative("gas_unit_price", gas.unit_price)?;
        Ok(Self {
            electricity,
            gas,
            water,
            internet,
        })
    }

    /// Electricity prices.
    pub fn electricity(&self) -> ElectricityRates {
        self.electricity
    }

    /// Gas price.
    pub fn gas(&self) -> GasRates {
        self.gas
    }

    /// Water tier catalog.
    pub fn water(&self) -> &WaterTariffs {
        &self.water
    }

    /// Internet plan catalog.
    pub fn internet(&self) -> &InternetCatalog {
        &self.internet
    }

    /// Sets the electricity grid unit price.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative price; the old price is kept.
    pub fn set_electricity_unit_price(&mut self, price: f64) -> Result<()> {
        self.electricity.unit_price = ensure_non_negative("electricity_unit_price", price)?;
        Ok(())
    }

    /// Sets the electricity feed-in tariff.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative tariff; the old tariff is kept.
    pub fn set_electricity_feed_in_tariff(&mut self, tariff: f64) -> Result<()> {
        self.electricity.feed_in_tariff =
            ensure_non_negative("electricity_feed_in_tariff", tariff)?;
        Ok(())
    }

    /// Sets the gas unit price.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative price; the old price is kept.
    pub fn set_gas_unit_price(&mut self, price: f64) -> Result<()> {
        self.gas.unit_price = ensure_non_negative("gas_unit_price", price)?;
        Ok(())
    }

    /// Replaces the tiers of one water plan.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a malformed tier list; the old tiers are kept.
    pub fn set_water_tiers(&mut self, plan: WaterPlan, tiers: Vec<TariffTier>) -> Result<()> {
        self.water.set_tiers(plan, tiers)
    }
}

/// Cloneable handle to a lock-protected [`RateTable`].
///
/// Reads take a shared guard for the whole read-then-compute sequence;
/// administrative setters take an exclusive guard.
#[derive(Debug, Clone, Default)]
pub struct SharedRates {
    inner: Arc<RwLock<RateTable>>,
}

impl SharedRates {
    /// Wraps a rate table.
    pub fn new(table: RateTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Acquires a read guard.
    ///
    /// Setters validate before writing, so a poisoned lock still guards a
    /// consistent table and is recovered.
    pub fn read(&self) -> RwLockReadGuard<'_, RateTable> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an owned copy of the current table.
    pub fn snapshot(&self) -> RateTable {
        self.read().clone()
    }

    fn update(
        &self,
        what: &'static str,
        f: impl FnOnce(&mut RateTable) -> Result<()>,
    ) -> Result<()> {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let outcome = f(&mut *table);
        if let Err(e) = &outcome {
            warn!(setting = what, error = %e, "rate update rejected");
        }
        outcome
    }

    /// Administrative setter for the electricity unit price.
    ///
    /// # Errors
    ///
    /// See [`RateTable::set_electricity_unit_price`].
    pub fn set_electricity_unit_price(&self, price: f64) -> Result<()> {
        self.update("electricity_unit_price", |t| t.set_electricity_unit_price(price))?;
        info!(price, "electricity grid unit price updated");
        Ok(())
    }

    /// Administrative setter for the electricity feed-in tariff.
    ///
    /// # Errors
    ///
    /// See [`RateTable::set_electricity_feed_in_tariff`].
    pub fn set_electricity_feed_in_tariff(&self, tariff: f64) -> Result<()> {
        self.update("electricity_feed_in_tariff", |t| {
            t.set_electricity_feed_in_tariff(tariff)
        })?;
        info!(tariff, "electricity feed-in tariff updated");
        Ok(())
    }

    /// Administrative setter for the gas unit price.
    ///
    /// # Errors
    ///
    /// See [`RateTable::set_gas_unit_price`].
    pub fn set_gas_unit_price(&self, price: f64) -> Result<()> {
        self.update("gas_unit_price", |t| t.set_gas_unit_price(price))?;
        info!(price, "gas grid unit price updated");
        Ok(())
    }

    /// Administrative setter for a water plan's tiers.
    ///
    /// # Errors
    ///
    /// See [`RateTable::set_water_tiers`].
    pub fn set_water_tiers(&self, plan: WaterPlan, tiers: Vec<TariffTier>) -> Result<()> {
        let count = tiers.len();
        self.update("water_tiers", |t| t.set_water_tiers(plan, tiers))?;
        info!(%plan, tiers = count, "water tiers updated");
        Ok(())
    }
}
