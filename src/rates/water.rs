//! Water tariff plans and their tier tables.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{BillingError, Result};

/// Water tariff plan tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterPlan {
    /// No active supply; never billed.
    NoSupply,
    /// Low-usage residential plan with incentivised first tier.
    ResidentialConservation,
    /// Default residential plan.
    ResidentialStandard,
    /// Business premises.
    CommercialStandard,
}

impl WaterPlan {
    /// Every plan, in catalog order.
    pub const ALL: [Self; 4] = [
        Self::NoSupply,
        Self::ResidentialConservation,
        Self::ResidentialStandard,
        Self::CommercialStandard,
    ];

    /// Configuration tag accepted by [`FromStr`].
    pub fn tag(self) -> &'static str {
        match self {
            Self::NoSupply => "no_supply",
            Self::ResidentialConservation => "residential_conservation",
            Self::ResidentialStandard => "residential_standard",
            Self::CommercialStandard => "commercial_standard",
        }
    }
}

impl fmt::Display for WaterPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for WaterPlan {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.tag() == norm)
            .ok_or_else(|| {
                BillingError::invalid("water_plan", format!("unrecognised water plan \"{s}\""))
            })
    }
}

/// One band of a tiered schedule.
///
/// `limit_m3` is a cumulative threshold measured from zero consumption, not
/// the width of the band. The last tier of a supplying plan uses
/// `f64::INFINITY` so it absorbs all remaining consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TariffTier {
    /// Upper consumption boundary of this tier (m³, cumulative).
    #[serde(serialize_with = "super::serialize_unbounded")]
    pub limit_m3: f64,
    /// Price per m³ consumed inside this tier.
    pub price_per_m3: f64,
}

impl TariffTier {
    /// Creates a tier ending at `limit_m3`.
    pub const fn new(limit_m3: f64, price_per_m3: f64) -> Self {
        Self {
            limit_m3,
            price_per_m3,
        }
    }

    /// Creates the open-ended final tier.
    pub const fn unbounded(price_per_m3: f64) -> Self {
        Self::new(f64::INFINITY, price_per_m3)
    }
}

/// Display name plus tier list for one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterPlanInfo {
    /// Human-readable plan name.
    pub display_name: String,
    /// Tiers in strictly ascending boundary order.
    pub tiers: Vec<TariffTier>,
}

impl WaterPlanInfo {
    /// Renders each tier with its real lower bound, one line per tier.
    pub fn describe_tiers(&self) -> Vec<String> {
        let mut lower = 0.0;
        self.tiers
            .iter()
            .map(|tier| {
                let line = if tier.limit_m3.is_finite() {
                    format!(
                        "{lower} to {} m³ @ {:.2}/m³",
                        tier.limit_m3, tier.price_per_m3
                    )
                } else {
                    format!("above {lower} m³ @ {:.2}/m³", tier.price_per_m3)
                };
                lower = tier.limit_m3;
                line
            })
            .collect()
    }
}

/// Validates a tier list for a plan.
///
/// `NoSupply` takes no tiers. Every other plan needs a non-empty, strictly
/// ascending list ending with an unbounded tier, with finite non-negative
/// prices.
pub fn validate_tiers(plan: WaterPlan, tiers: &[TariffTier]) -> Result<()> {
    if plan == WaterPlan::NoSupply {
        if !tiers.is_empty() {
            return Err(BillingError::invalid(
                "water_tiers",
                format!("plan {plan} takes no tiers, got {}", tiers.len()),
            ));
        }
        return Ok(());
    }
    let Some(last) = tiers.last() else {
        return Err(BillingError::invalid(
            "water_tiers",
            format!("plan {plan} needs at least one tier"),
        ));
    };
    if last.limit_m3.is_finite() {
        return Err(BillingError::invalid(
            "water_tiers",
            format!("last tier of plan {plan} must be unbounded"),
        ));
    }
    let mut previous = 0.0_f64;
    for (i, tier) in tiers.iter().enumerate() {
        if !(tier.price_per_m3.is_finite() && tier.price_per_m3 >= 0.0) {
            return Err(BillingError::invalid(
                "water_tiers",
                format!("tier {i} of plan {plan} has invalid price {}", tier.price_per_m3),
            ));
        }
        if tier.limit_m3.is_nan() || tier.limit_m3 <= previous {
            return Err(BillingError::invalid(
                "water_tiers",
                format!("tier {i} of plan {plan} must end above {previous} m³"),
            ));
        }
        previous = tier.limit_m3;
    }
    Ok(())
}

/// Tier catalog keyed by plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterTariffs {
    plans: BTreeMap<WaterPlan, WaterPlanInfo>,
}

impl WaterTariffs {
    /// Builds a catalog, requiring an entry for every plan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a plan has no entry and `InvalidArgument` if a
    /// tier list is malformed.
    pub fn new(plans: BTreeMap<WaterPlan, WaterPlanInfo>) -> Result<Self> {
        for plan in WaterPlan::ALL {
            let info = plans.get(&plan).ok_or_else(|| BillingError::NotFound {
                what: format!("water plan `{plan}`"),
            })?;
            validate_tiers(plan, &info.tiers)?;
        }
        Ok(Self { plans })
    }

    /// Looks up a plan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the plan has no entry.
    pub fn plan(&self, plan: WaterPlan) -> Result<&WaterPlanInfo> {
        self.plans.get(&plan).ok_or_else(|| BillingError::NotFound {
            what: format!("water plan `{plan}`"),
        })
    }

    /// Replaces the tier list of one plan after validating it.
    ///
    /// On error the catalog is left unchanged.
    pub fn set_tiers(&mut self, plan: WaterPlan, tiers: Vec<TariffTier>) -> Result<()> {
        validate_tiers(plan, &tiers)?;
        let info = self.plans.get_mut(&plan).ok_or_else(|| BillingError::NotFound {
            what: format!("water plan `{plan}`"),
        })?;
        info.tiers = tiers;
        Ok(())
    }
}

impl Default for WaterTariffs {
    fn default() -> Self {
        let plans = BTreeMap::from([
            (
                WaterPlan::NoSupply,
                WaterPlanInfo {
                    display_name: "No Supply".to_string(),
                    tiers: Vec::new(),
                },
            ),
            (
                WaterPlan::ResidentialConservation,
                WaterPlanInfo {
                    display_name: "Residential Conservation".to_string(),
                    tiers: vec![
                        TariffTier::new(5.0, 1.0),
                        TariffTier::new(15.0, 2.5),
                        TariffTier::unbounded(6.0),
                    ],
                },
            ),
            (
                WaterPlan::ResidentialStandard,
                WaterPlanInfo {
                    display_name: "Residential Standard".to_string(),
                    tiers: vec![
                        TariffTier::new(10.0, 2.0),
                        TariffTier::new(20.0, 3.0),
                        TariffTier::unbounded(5.0),
                    ],
                },
            ),
            (
                WaterPlan::CommercialStandard,
                WaterPlanInfo {
                    display_name: "Commercial Standard".to_string(),
                    tiers: vec![
                        TariffTier::new(50.0, 3.0),
                        TariffTier::new(200.0, 4.0),
                        TariffTier::unbounded(4.5),
                    ],
                },
            ),
        ]);
        Self { plans }
    }
}
