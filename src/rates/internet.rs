//! Internet plan catalog.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{BillingError, Result};

/// Internet plan tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InternetPlan {
    /// Disconnected.
    NoService,
    /// Capped residential plan.
    Standard,
    /// Higher cap and speed.
    Premium,
    /// Uncapped flat-rate fibre.
    BusinessFiber,
}

impl InternetPlan {
    /// Every plan, in catalog order.
    pub const ALL: [Self; 4] = [
        Self::NoService,
        Self::Standard,
        Self::Premium,
        Self::BusinessFiber,
    ];

    /// Configuration tag accepted by [`FromStr`].
    pub fn tag(self) -> &'static str {
        match self {
            Self::NoService => "no_service",
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::BusinessFiber => "business_fiber",
        }
    }
}

impl fmt::Display for InternetPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for InternetPlan {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.tag() == norm)
            .ok_or_else(|| {
                BillingError::invalid(
                    "internet_plan",
                    format!("unrecognised internet plan \"{s}\""),
                )
            })
    }
}

/// Fixed terms of one internet plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDetails {
    /// Monthly base charge.
    pub base_cost: f64,
    /// Included data (GB); `f64::INFINITY` for uncapped plans.
    #[serde(serialize_with = "super::serialize_unbounded")]
    pub data_cap_gb: f64,
    /// Advertised overage price per GB. Only its sign gates overage billing.
    pub overage_cost_per_gb: f64,
    /// Line speed.
    pub speed_mbps: u32,
    /// Human-readable plan name.
    pub display_name: String,
}

/// Plan catalog, built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternetCatalog {
    plans: BTreeMap<InternetPlan, PlanDetails>,
}

impl InternetCatalog {
    /// Builds a catalog, requiring an entry for every plan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing plan and `InvalidArgument` for a
    /// negative or non-finite cost.
    pub fn new(plans: BTreeMap<InternetPlan, PlanDetails>) -> Result<Self> {
        for plan in InternetPlan::ALL {
            let details = plans.get(&plan).ok_or_else(|| BillingError::NotFound {
                what: format!("internet plan `{plan}`"),
            })?;
            let costs = [details.base_cost, details.overage_cost_per_gb];
            if costs.iter().any(|c| !c.is_finite() || *c < 0.0) {
                return Err(BillingError::invalid(
                    "internet_plan",
                    format!("plan {plan} has a negative or non-finite cost"),
                ));
            }
            if details.data_cap_gb.is_nan() || details.data_cap_gb < 0.0 {
                return Err(BillingError::invalid(
                    "internet_plan",
                    format!("plan {plan} has an invalid data cap"),
                ));
            }
        }
        Ok(Self { plans })
    }

    /// Resolves plan details.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the plan has no entry.
    pub fn details(&self, plan: InternetPlan) -> Result<&PlanDetails> {
        self.plans.get(&plan).ok_or_else(|| BillingError::NotFound {
            what: format!("internet plan `{plan}`"),
        })
    }
}

impl Default for InternetCatalog {
    fn default() -> Self {
        let plan = |base_cost, data_cap_gb, overage_cost_per_gb, speed_mbps, name: &str| {
            PlanDetails {
                base_cost,
                data_cap_gb,
                overage_cost_per_gb,
                speed_mbps,
                display_name: name.to_string(),
            }
        };
        let plans = BTreeMap::from([
            (InternetPlan::NoService, plan(0.0, 0.0, 0.0, 0, "No Service")),
            (InternetPlan::Standard, plan(500.0, 100.0, 10.0, 50, "Standard Plan")),
            (InternetPlan::Premium, plan(800.0, 200.0, 80.0, 100, "Premium Plan")),
            (
                InternetPlan::BusinessFiber,
                plan(1500.0, f64::INFINITY, 0.0, 1000, "Business Fiber Plan"),
            ),
        ]);
        Self { plans }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_resolves_every_plan() {
        let catalog = InternetCatalog::default();
        for plan in InternetPlan::ALL {
            assert!(catalog.details(plan).is_ok(), "{plan} should resolve");
        }
        assert!(InternetCatalog::new(catalog.plans.clone()).is_ok());
    }

    #[test]
    fn business_fiber_is_uncapped() {
        let catalog = InternetCatalog::default();
        let fiber = catalog.details(InternetPlan::BusinessFiber).unwrap();
        assert!(fiber.data_cap_gb.is_infinite());
        assert_eq!(fiber.speed_mbps, 1000);
    }

    #[test]
    fn missing_plan_is_not_found() {
        let mut plans = InternetCatalog::default().plans;
        plans.remove(&InternetPlan::Premium);
        assert!(InternetCatalog::new(plans).unwrap_err().is_not_found());
    }

    #[test]
    fn parses_known_tags_only() {
        assert_eq!("PREMIUM".parse::<InternetPlan>(), Ok(InternetPlan::Premium));
        assert_eq!(
            "business-fiber".parse::<InternetPlan>(),
            Ok(InternetPlan::BusinessFiber)
        );
        assert!("dialup".parse::<InternetPlan>().is_err());
    }
}
