use std::fmt;
use std::io;
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};

use super::{SupplyStatus, UtilityAccount, UtilityKind};
use crate::address::Address;
use crate::error::{BillingError, Result, accumulate, ensure_non_negative};
use crate::rates::SharedRates;

/// How an address sources its electricity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStrategy {
    /// Every kWh consumed is drawn from the grid.
    GridOnly,
    /// Own solar covers the load; no grid interaction is modelled.
    SolarPrimary,
    /// Own wind covers the load; no grid interaction is modelled.
    WindPrimary,
    /// Solar with net metering against the grid.
    GridTiedSolar,
    /// Wind with net metering against the grid.
    GridTiedWind,
}

impl SupplyStrategy {
    /// Every strategy.
    pub const ALL: [Self; 5] = [
        Self::GridOnly,
        Self::SolarPrimary,
        Self::WindPrimary,
        Self::GridTiedSolar,
        Self::GridTiedWind,
    ];

    /// Configuration tag accepted by [`FromStr`].
    pub fn tag(self) -> &'static str {
        match self {
            Self::GridOnly => "grid_only",
            Self::SolarPrimary => "solar_primary",
            Self::WindPrimary => "wind_primary",
            Self::GridTiedSolar => "grid_tied_solar",
            Self::GridTiedWind => "grid_tied_wind",
        }
    }

    /// Human-readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::GridOnly => "Grid Only",
            Self::SolarPrimary => "Solar Primary (Self-Gen)",
            Self::WindPrimary => "Wind Primary (Self-Gen)",
            Self::GridTiedSolar => "Grid-Tied Solar",
            Self::GridTiedWind => "Grid-Tied Wind",
        }
    }

    /// Self-generation strategies that never touch the grid.
    pub fn is_self_generation(self) -> bool {
        matches!(self, Self::SolarPrimary | Self::WindPrimary)
    }

    /// Strategies that generate locally at all.
    pub fn has_generation(self) -> bool {
        self != Self::GridOnly
    }
}

impl fmt::Display for SupplyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SupplyStrategy {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.tag() == norm)
            .ok_or_else(|| {
                BillingError::invalid(
                    "supply_strategy",
                    format!("unrecognised electricity strategy \"{s}\""),
                )
            })
    }
}

/// Net-metered electricity account for one address.
///
/// # Sign Convention
/// [`net_grid_energy`](Self::net_grid_energy) is positive for a net draw from
/// the grid and negative for a net export. The bill follows the same sign:
/// a draw is charged at the unit price, an export credited at the feed-in
/// tariff.
///
/// Changing the strategy does not reset consumption or generation.
#[derive(Debug, Clone)]
pub struct ElectricityAccount {
    address: Address,
    strategy: SupplyStrategy,
    consumption_kwh: f64,
    generation_kwh: f64,
    rates: SharedRates,
}

impl ElectricityAccount {
    /// Opens an account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either initial amount is negative.
    pub fn new(
        address: Address,
        strategy: SupplyStrategy,
        initial_consumption_kwh: f64,
        initial_generation_kwh: f64,
        rates: SharedRates,
    ) -> Result<Self> {
        let consumption_kwh = ensure_non_negative("initial_consumption", initial_consumption_kwh)?;
        let generation_kwh = ensure_non_negative("initial_generation", initial_generation_kwh)?;
        Ok(Self {
            address,
            strategy,
            consumption_kwh,
            generation_kwh,
            rates,
        })
    }

    /// Records energy consumed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative amount or an overflowing
    /// total; totals are unchanged.
    pub fn add_usage(&mut self, kwh: f64) -> Result<()> {
        self.consumption_kwh =
            accumulate("usage", self.consumption_kwh, kwh).inspect_err(|e| {
                warn!(address = %self.address, error = %e, "electricity usage rejected");
            })?;
        Ok(())
    }

    /// Records energy generated locally.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative amount or an overflowing
    /// total; totals are unchanged.
    pub fn add_local_generation(&mut self, kwh: f64) -> Result<()> {
        self.generation_kwh =
            accumulate("local_generation", self.generation_kwh, kwh).inspect_err(|e| {
                warn!(address = %self.address, error = %e, "local generation rejected");
            })?;
        Ok(())
    }

    /// Net energy exchanged with the grid this period.
    ///
    /// Self-generation strategies report zero even when generation falls
    /// short; [`supply`](UtilityAccount::supply) flags the shortfall instead.
    pub fn net_grid_energy(&self) -> f64 {
        match self.strategy {
            SupplyStrategy::GridOnly => self.consumption_kwh,
            SupplyStrategy::SolarPrimary | SupplyStrategy::WindPrimary => 0.0,
            SupplyStrategy::GridTiedSolar | SupplyStrategy::GridTiedWind => {
                self.consumption_kwh - self.generation_kwh
            }
        }
    }

    /// Total consumption this period (kWh).
    pub fn total_consumption(&self) -> f64 {
        self.consumption_kwh
    }

    /// Local generation this period (kWh).
    pub fn local_generation(&self) -> f64 {
        self.generation_kwh
    }

    /// Active strategy.
    pub fn supply_strategy(&self) -> SupplyStrategy {
        self.strategy
    }

    /// Switches strategy, keeping both accumulators.
    pub fn set_supply_strategy(&mut self, strategy: SupplyStrategy) {
        self.strategy = strategy;
        info!(
            address = %self.address,
            strategy = strategy.display_name(),
            "electricity supply strategy updated"
        );
    }

    fn bill_for(net_kwh: f64, unit_price: f64, feed_in_tariff: f64) -> f64 {
        if net_kwh > 0.0 {
            net_kwh * unit_price
        } else if net_kwh < 0.0 {
            net_kwh * feed_in_tariff
        } else {
            0.0
        }
    }
}

impl UtilityAccount for ElectricityAccount {
    fn kind(&self) -> UtilityKind {
        UtilityKind::Electricity
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn period_usage(&self) -> f64 {
        self.consumption_kwh
    }

    fn period_generation(&self) -> Option<f64> {
        Some(self.generation_kwh)
    }

    fn plan_label(&self) -> String {
        self.strategy.tag().to_string()
    }

    fn calculate_bill(&self) -> Result<f64> {
        let rates = self.rates.read();
        let prices = rates.electricity();
        Ok(Self::bill_for(
            self.net_grid_energy(),
            prices.unit_price,
            prices.feed_in_tariff,
        ))
    }

    fn supply(&self) -> SupplyStatus {
        let status = if self.strategy.is_self_generation() {
            if self.consumption_kwh > self.generation_kwh {
                SupplyStatus::GenerationShortfall {
                    deficit_kwh: self.consumption_kwh - self.generation_kwh,
                }
            } else {
                SupplyStatus::GenerationSufficient
            }
        } else {
            let net = self.net_grid_energy();
            if net > 0.0 {
                SupplyStatus::GridDraw { kwh: net }
            } else {
                SupplyStatus::GridExportOrBalanced { kwh: -net }
            }
        };
        info!(
            address = %self.address,
            strategy = self.strategy.display_name(),
            %status,
            "managing electricity"
        );
        status
    }

    fn show_status(&self, out: &mut dyn io::Write) -> io::Result<()> {
        let net = self.net_grid_energy();
        let direction = if net > 0.0 {
            "Draw"
        } else if net < 0.0 {
            "Export"
        } else {
            "Zero"
        };
        writeln!(out, "--- Electricity Status for Address: [{}] ---", self.address)?;
        writeln!(out, "   Supply Strategy: {}", self.strategy.display_name())?;
        writeln!(out, "   Total Consumption This Period: {:.2} kWh", self.consumption_kwh)?;
        if self.strategy.has_generation() {
            writeln!(out, "   Local Generation This Period: {:.2} kWh", self.generation_kwh)?;
        }
        writeln!(out, "   Net Grid Interaction: {net:.2} kWh ({direction})")?;
        if self.strategy.is_self_generation() {
            writeln!(out, "   Billing: N/A (Primary Self-Generation)")?;
        } else {
            let rates = self.rates.read();
            let prices = rates.electricity();
            let bill = Self::bill_for(net, prices.unit_price, prices.feed_in_tariff);
            writeln!(out, "   Grid Unit Price (Draw): {:.2}/kWh", prices.unit_price)?;
            writeln!(out, "   Grid Feed-in Tariff (Export): {:.2}/kWh", prices.feed_in_tariff)?;
            writeln!(out, "   Estimated Grid Bill/Credit: {bill:.2}")?;
        }
        writeln!(out, "-------------------------------------------")
    }
}
