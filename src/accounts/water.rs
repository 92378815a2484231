use std::io;

use tracing::{info, warn};

use super::{SupplyStatus, UtilityAccount, UtilityKind};
use crate::address::Address;
use crate::error::{Result, accumulate, ensure_non_negative};
use crate::rates::{SharedRates, TariffTier, WaterPlan};

/// Prices `consumption_m3` against a cumulative tier schedule.
///
/// Each tier bills the slice of consumption between the previous tier's
/// boundary and its own. Tiers must be strictly ascending and the last one
/// unbounded; consumption past a finite final boundary is not billed.
///
/// # Examples
///
/// ```
/// use utility_billing::accounts::water::tiered_bill;
/// use utility_billing::rates::TariffTier;
///
/// let tiers = [
///     TariffTier::new(10.0, 2.0),
///     TariffTier::new(20.0, 3.0),
///     TariffTier::unbounded(5.0),
/// ];
/// assert_eq!(tiered_bill(&tiers, 15.0), 35.0);
/// ```
pub fn tiered_bill(tiers: &[TariffTier], consumption_m3: f64) -> f64 {
    let mut bill = 0.0;
    let mut allocated = 0.0;
    let mut remaining = consumption_m3;

    for tier in tiers {
        if remaining <= 0.0 {
            break;
        }
        let in_tier = remaining.min(tier.limit_m3 - allocated).max(0.0);
        bill += in_tier * tier.price_per_m3;
        remaining -= in_tier;
        allocated = tier.limit_m3;
    }
    bill
}

/// Tiered water account.
///
/// Changing plan starts a fresh billing period: consumption resets to zero.
#[derive(Debug, Clone)]
pub struct WaterAccount {
    address: Address,
    plan: WaterPlan,
    consumption_m3: f64,
    rates: SharedRates,
}

impl WaterAccount {
    /// Opens an account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative consumption and `NotFound` if
    /// the rate table has no entry for `plan`.
    pub fn new(
        address: Address,
        plan: WaterPlan,
        initial_consumption_m3: f64,
        rates: SharedRates,
    ) -> Result<Self> {
        let consumption_m3 = ensure_non_negative("initial_consumption", initial_consumption_m3)?;
        rates.read().water().plan(plan)?;
        Ok(Self {
            address,
            plan,
            consumption_m3,
            rates,
        })
    }

    /// Records water consumed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative amount or an overflowing
    /// total; totals are unchanged.
    pub fn add_consumption(&mut self, m3: f64) -> Result<()> {
        self.consumption_m3 =
            accumulate("consumption", self.consumption_m3, m3).inspect_err(|e| {
                warn!(address = %self.address, error = %e, "water consumption rejected");
            })?;
        Ok(())
    }

    /// Consumption this period (m³).
    pub fn consumption_cubic_meters(&self) -> f64 {
        self.consumption_m3
    }

    /// Active plan.
    pub fn current_plan(&self) -> WaterPlan {
        self.plan
    }

    /// Display name of the active plan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the rate table lacks the plan.
    pub fn plan_display_name(&self) -> Result<String> {
        Ok(self.rates.read().water().plan(self.plan)?.display_name.clone())
    }

    /// Switches plan and resets consumption for the new period.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the rate table lacks `plan`; the account is unchanged.
    pub fn set_current_plan(&mut self, plan: WaterPlan) -> Result<()> {
        let name = self.rates.read().water().plan(plan)?.display_name.clone();
        self.plan = plan;
        self.consumption_m3 = 0.0;
        info!(address = %self.address, plan = %name, "water tariff plan updated");
        Ok(())
    }
}

impl UtilityAccount for WaterAccount {
    fn kind(&self) -> UtilityKind {
        UtilityKind::Water
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn period_usage(&self) -> f64 {
        self.consumption_m3
    }

    fn plan_label(&self) -> String {
        self.plan.tag().to_string()
    }

    fn calculate_bill(&self) -> Result<f64> {
        if self.plan == WaterPlan::NoSupply {
            return Ok(0.0);
        }
        let rates = self.rates.read();
        let info = rates.water().plan(self.plan)?;
        Ok(tiered_bill(&info.tiers, self.consumption_m3))
    }

    fn supply(&self) -> SupplyStatus {
        let status = if self.plan == WaterPlan::NoSupply {
            SupplyStatus::Inactive
        } else {
            SupplyStatus::Supplying
        };
        info!(address = %self.address, plan = %self.plan, %status, "managing water supply");
        status
    }

    fn show_status(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "--- Water Supply Status for Address: [{}] ---", self.address)?;
        let rates = self.rates.read();
        match rates.water().plan(self.plan) {
            Ok(info) => {
                writeln!(out, "   Current Plan: {}", info.display_name)?;
                if self.plan == WaterPlan::NoSupply {
                    writeln!(out, "   Status: No active water supply.")?;
                } else {
                    writeln!(out, "   Consumption This Period: {:.2} m³", self.consumption_m3)?;
                    writeln!(out, "   Tariff Tiers:")?;
                    for line in info.describe_tiers() {
                        writeln!(out, "     - {line}")?;
                    }
                    let bill = tiered_bill(&info.tiers, self.consumption_m3);
                    writeln!(out, "   Estimated Bill: {bill:.2}")?;
                }
            }
            Err(e) => writeln!(out, "   Plan details unavailable: {e}")?,
        }
        writeln!(out, "----------------------------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_tiers() -> Vec<TariffTier> {
        vec![
            TariffTier::new(10.0, 2.0),
            TariffTier::new(20.0, 3.0),
            TariffTier::unbounded(5.0),
        ]
    }

    fn account(plan: WaterPlan, initial: f64) -> WaterAccount {
        WaterAccount::new(
            Address::new("7 Well Ln", "Brook", "30003"),
            plan,
            initial,
            SharedRates::default(),
        )
        .unwrap()
    }

    #[test]
    fn overflowing_consumption_is_rejected() {
        let mut acct = account(WaterPlan::CommercialStandard, f64::MAX);
        assert!(acct.add_consumption(f64::MAX).unwrap_err().is_invalid_argument());
        assert_eq!(acct.consumption_cubic_meters(), f64::MAX);
    }

    #[test]
    fn plan_display_name_follows_plan() {
        let mut acct = account(WaterPlan::ResidentialStandard, 0.0);
        assert_eq!(acct.plan_display_name().unwrap(), "Residential Standard");
        acct.set_current_plan(WaterPlan::NoSupply).unwrap();
        assert_eq!(acct.plan_display_name().unwrap(), "No Supply");
    }

    #[test]
    fn tiered_bill_inside_second_tier() {
        assert_eq!(tiered_bill(&standard_tiers(), 15.0), 35.0);
    }

    #[test]
    fn tiered_bill_spills_into_unbounded_tier() {
        // 10*2 + 10*3 + 5*5
        assert_eq!(tiered_bill(&standard_tiers(), 25.0), 75.0);
    }

    #[test]
    fn tiered_bill_zero_consumption() {
        assert_eq!(tiered_bill(&standard_tiers(), 0.0), 0.0);
    }

    #[test]
    fn tiered_bill_exactly_on_boundary() {
        assert_eq!(tiered_bill(&standard_tiers(), 10.0), 20.0);
        assert_eq!(tiered_bill(&standard_tiers(), 20.0), 50.0);
    }

    #[test]
    fn finite_last_tier_drops_overflow() {
        let tiers = [TariffTier::new(10.0, 2.0)];
        assert_eq!(tiered_bill(&tiers, 25.0), 20.0);
    }

    #[test]
    fn no_supply_bills_zero() {
        let acct = account(WaterPlan::NoSupply, 40.0);
        assert_eq!(acct.calculate_bill().unwrap(), 0.0);
        assert_eq!(acct.supply(), SupplyStatus::Inactive);
    }

    #[test]
    fn residential_standard_uses_catalog_tiers() {
        let acct = account(WaterPlan::ResidentialStandard, 15.0);
        assert_eq!(acct.calculate_bill().unwrap(), 35.0);
    }

    #[test]
    fn plan_change_resets_consumption() {
        let mut acct = account(WaterPlan::ResidentialStandard, 0.0);
        acct.add_consumption(12.0).unwrap();
        acct.set_current_plan(WaterPlan::CommercialStandard).unwrap();
        assert_eq!(acct.consumption_cubic_meters(), 0.0);
        assert_eq!(acct.current_plan(), WaterPlan::CommercialStandard);
    }

    #[test]
    fn negative_consumption_rejected() {
        let mut acct = account(WaterPlan::ResidentialStandard, 3.0);
        assert!(acct.add_consumption(-1.0).unwrap_err().is_invalid_argument());
        assert_eq!(acct.consumption_cubic_meters(), 3.0);
    }

    #[test]
    fn updated_tiers_apply_to_next_bill() {
        let acct = account(WaterPlan::ResidentialConservation, 10.0);
        acct.rates
            .set_water_tiers(WaterPlan::ResidentialConservation, vec![TariffTier::unbounded(1.0)])
            .unwrap();
        assert_eq!(acct.calculate_bill().unwrap(), 10.0);
    }

    #[test]
    fn show_status_lists_tiers() {
        let acct = account(WaterPlan::ResidentialStandard, 15.0);
        let mut out = Vec::new();
        acct.show_status(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Residential Standard"));
        assert!(text.contains("0 to 10 m³"));
        assert!(text.contains("Estimated Bill: 35.00"));
    }
}
