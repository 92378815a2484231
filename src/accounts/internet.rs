use std::io;

use tracing::{info, warn};

use super::{SupplyStatus, UtilityAccount, UtilityKind};
use crate::address::Address;
use crate::error::{Result, accumulate, ensure_non_negative};
use crate::rates::{InternetPlan, PlanDetails, SharedRates};

/// Charge per GB over the cap.
///
/// Applied to every capped plan regardless of the plan's own
/// `overage_cost_per_gb`, which only decides whether overage is billed.
pub const OVERAGE_RATE_PER_GB: f64 = 10.0;

/// Plan-based internet account with data-cap overage.
///
/// Changing plan resets data usage to zero.
#[derive(Debug, Clone)]
pub struct InternetAccount {
    address: Address,
    plan: InternetPlan,
    data_used_gb: f64,
    rates: SharedRates,
}

impl InternetAccount {
    /// Opens an account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative usage and `NotFound` if the
    /// catalog has no entry for `plan`.
    pub fn new(
        address: Address,
        plan: InternetPlan,
        initial_data_gb: f64,
        rates: SharedRates,
    ) -> Result<Self> {
        let data_used_gb = ensure_non_negative("initial_data_usage", initial_data_gb)?;
        rates.read().internet().details(plan)?;
        Ok(Self {
            address,
            plan,
            data_used_gb,
            rates,
        })
    }

    /// Records data transferred.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a negative amount or an overflowing
    /// total; totals are unchanged.
    pub fn add_data_usage(&mut self, gb: f64) -> Result<()> {
        self.data_used_gb =
            accumulate("data_usage", self.data_used_gb, gb).inspect_err(|e| {
                warn!(address = %self.address, error = %e, "data usage rejected");
            })?;
        Ok(())
    }

    /// Data used this period (GB).
    pub fn data_used_gb(&self) -> f64 {
        self.data_used_gb
    }

    /// Active plan.
    pub fn current_plan(&self) -> InternetPlan {
        self.plan
    }

    /// Resolves the active plan's terms.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the catalog lacks the plan.
    pub fn plan_details(&self) -> Result<PlanDetails> {
        Ok(self.rates.read().internet().details(self.plan)?.clone())
    }

    /// Line speed of the active plan (Mbps).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the catalog lacks the plan.
    pub fn current_speed(&self) -> Result<u32> {
        Ok(self.plan_details()?.speed_mbps)
    }

    /// Switches plan and resets data usage.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the catalog lacks `plan`; the account is unchanged.
    pub fn set_current_plan(&mut self, plan: InternetPlan) -> Result<()> {
        let name = self.rates.read().internet().details(plan)?.display_name.clone();
        self.plan = plan;
        self.data_used_gb = 0.0;
        info!(address = %self.address, plan = %name, "internet plan changed");
        Ok(())
    }

    fn bill_for(plan: InternetPlan, details: &PlanDetails, data_used_gb: f64) -> f64 {
        match plan {
            InternetPlan::NoService => 0.0,
            InternetPlan::BusinessFiber => details.base_cost,
            InternetPlan::Standard | InternetPlan::Premium => {
                let mut bill = details.base_cost;
                if details.data_cap_gb.is_finite()
                    && data_used_gb > details.data_cap_gb
                    && details.overage_cost_per_gb > 0.0
                {
                    bill += (data_used_gb - details.data_cap_gb) * OVERAGE_RATE_PER_GB;
                }
                bill
            }
        }
    }
}

impl UtilityAccount for InternetAccount {
    fn kind(&self) -> UtilityKind {
        UtilityKind::Internet
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn period_usage(&self) -> f64 {
        self.data_used_gb
    }

    fn plan_label(&self) -> String {
        self.plan.tag().to_string()
    }

    fn calculate_bill(&self) -> Result<f64> {
        let rates = self.rates.read();
        let details = rates.internet().details(self.plan)?;
        Ok(Self::bill_for(self.plan, details, self.data_used_gb))
    }

    fn supply(&self) -> SupplyStatus {
        let status = match (self.plan, self.current_speed()) {
            (InternetPlan::NoService, _) | (_, Err(_)) => SupplyStatus::Inactive,
            (_, Ok(speed_mbps)) => SupplyStatus::Online { speed_mbps },
        };
        info!(address = %self.address, plan = %self.plan, %status, "managing internet service");
        status
    }

    fn show_status(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "--- Internet Service for Address: [{}] ---", self.address)?;
        let rates = self.rates.read();
        match rates.internet().details(self.plan) {
            Ok(details) => {
                writeln!(out, "   Current Plan: {}", details.display_name)?;
                if self.plan == InternetPlan::NoService {
                    writeln!(out, "   Status: No active service.")?;
                } else {
                    writeln!(out, "   Data Used: {:.2} GB", self.data_used_gb)?;
                    writeln!(out, "   Speed: {} Mbps", details.speed_mbps)?;
                    if details.data_cap_gb.is_finite() {
                        writeln!(out, "   Data Cap: {} GB", details.data_cap_gb)?;
                    } else {
                        writeln!(out, "   Data Cap: Unlimited")?;
                    }
                    if details.overage_cost_per_gb > 0.0 {
                        writeln!(
                            out,
                            "   Overage Cost: {:.2} per GB",
                            details.overage_cost_per_gb
                        )?;
                    }
                    let bill = Self::bill_for(self.plan, details, self.data_used_gb);
                    writeln!(out, "   Estimated Bill: {bill:.2}")?;
                }
            }
            Err(e) => writeln!(out, "   Plan details unavailable: {e}")?,
        }
        writeln!(out, "-------------------------")
    }
}
