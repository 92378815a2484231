//! Per-address utility accounts.
//!
//! Each account accumulates usage for the current billing period and turns
//! it into a signed amount using the shared rate table: positive amounts are
//! charges, negative amounts are credits.

/// Net-metered electricity account.
pub mod electricity;
/// Flat-rate gas account.
pub mod gas;
/// Plan and overage internet account.
pub mod internet;
/// Tiered water account.
pub mod water;

use std::fmt;
use std::io;

use serde::Serialize;

use crate::address::Address;
use crate::error::Result;

pub use electricity::{ElectricityAccount, SupplyStrategy};
pub use gas::GasAccount;
pub use internet::InternetAccount;
pub use water::WaterAccount;

/// Utility kinds served by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityKind {
    /// Electricity, metered in kWh.
    Electricity,
    /// Piped gas, metered in m³.
    Gas,
    /// Water, metered in m³.
    Water,
    /// Internet data, metered in GB.
    Internet,
}

impl UtilityKind {
    /// Every kind, in statement order.
    pub const ALL: [Self; 4] = [Self::Electricity, Self::Gas, Self::Water, Self::Internet];

    /// Unit in which usage is measured.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Electricity => "kWh",
            Self::Gas | Self::Water => "m³",
            Self::Internet => "GB",
        }
    }

    /// Lowercase name used in exports and API filters.
    pub fn name(self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Gas => "gas",
            Self::Water => "water",
            Self::Internet => "internet",
        }
    }
}

impl fmt::Display for UtilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl std::str::FromStr for UtilityKind {
    type Err = crate::error::BillingError;

    fn from_str(s: &str) -> Result<Self> {
        let norm = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == norm)
            .ok_or_else(|| {
                crate::error::BillingError::invalid("utility", format!("unknown utility \"{s}\""))
            })
    }
}

/// Operational status reported by [`UtilityAccount::supply`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SupplyStatus {
    /// Self-generation does not cover consumption.
    GenerationShortfall {
        /// Consumption minus generation (kWh, positive).
        deficit_kwh: f64,
    },
    /// Self-generation meets or exceeds consumption.
    GenerationSufficient,
    /// Net import from the grid.
    GridDraw {
        /// Net energy drawn (kWh, positive).
        kwh: f64,
    },
    /// Net export to the grid, or exactly balanced.
    GridExportOrBalanced {
        /// Net energy supplied (kWh, non-negative).
        kwh: f64,
    },
    /// Grid connection active (gas).
    GridConnected,
    /// Water is being supplied.
    Supplying,
    /// Internet service active at the plan speed.
    Online {
        /// Line speed in Mbps.
        speed_mbps: u32,
    },
    /// No supply or service on the current plan.
    Inactive,
}

impl fmt::Display for SupplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenerationShortfall { deficit_kwh } => write!(
                f,
                "potential energy shortfall, consumption exceeds generation by {deficit_kwh:.2} kWh"
            ),
            Self::GenerationSufficient => f.write_str("local generation meeting consumption"),
            Self::GridDraw { kwh } => write!(f, "net drawing {kwh:.2} kWh from grid"),
            Self::GridExportOrBalanced { kwh } => {
                write!(f, "net supplying {kwh:.2} kWh to grid or balanced")
            }
            Self::GridConnected => f.write_str("grid connection active, supply stable"),
            Self::Supplying => f.write_str("water is being supplied"),
            Self::Online { speed_mbps } => write!(f, "online at {speed_mbps} Mbps"),
            Self::Inactive => f.write_str("no active supply"),
        }
    }
}

/// Capability set shared by every utility account.
pub trait UtilityAccount: fmt::Debug + Send + Sync {
    /// Which utility this account meters.
    fn kind(&self) -> UtilityKind;

    /// Service address.
    fn address(&self) -> &Address;

    /// Usage accumulated this period, in [`UtilityKind::unit`].
    fn period_usage(&self) -> f64;

    /// Local generation this period; `None` for utilities without generation.
    fn period_generation(&self) -> Option<f64> {
        None
    }

    /// Tag of the active plan or supply strategy.
    fn plan_label(&self) -> String;

    /// Signed bill for the period: positive is a charge, negative a credit.
    ///
    /// Reads the shared rate table under one lock and never mutates totals.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` only if the rate table lacks the active plan.
    fn calculate_bill(&self) -> Result<f64>;

    /// Reports operational status and narrates it to the log.
    fn supply(&self) -> SupplyStatus;

    /// Writes a human-readable status block to `out`.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the sink only.
    fn show_status(&self, out: &mut dyn io::Write) -> io::Result<()>;
}
