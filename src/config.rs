//! TOML-based scenario configuration and preset definitions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::accounts::SupplyStrategy;
use crate::address::Address;
use crate::error::BillingError;
use crate::rates::water::validate_tiers;
use crate::rates::{InternetPlan, TariffTier, WaterPlan};

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Billing period length and random seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Overrides applied to the default rate table.
    #[serde(default)]
    pub rates: RatesConfig,
    /// Service addresses and their subscriptions.
    #[serde(default)]
    pub households: Vec<HouseholdConfig>,
}

/// Billing period length and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Days in the billing period (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { days: 30, seed: 42 }
    }
}

/// Optional rate-table overrides.
///
/// Unset prices keep the built-in defaults. Water tier lists are keyed by
/// plan tag (`residential_standard`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatesConfig {
    /// Grid price per kWh.
    pub electricity_unit_price: Option<f64>,
    /// Export credit per kWh.
    pub electricity_feed_in_tariff: Option<f64>,
    /// Gas price per m³.
    pub gas_unit_price: Option<f64>,
    /// Replacement tier lists per water plan.
    pub water: BTreeMap<String, Vec<TierConfig>>,
}

/// One water tier as written in TOML. `limit_m3 = inf` marks the open tier.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    /// Cumulative upper boundary (m³).
    pub limit_m3: f64,
    /// Price per m³ inside the tier.
    pub price_per_m3: f64,
}

impl From<TierConfig> for TariffTier {
    fn from(t: TierConfig) -> Self {
        TariffTier::new(t.limit_m3, t.price_per_m3)
    }
}

/// One service address, its subscriptions and its daily usage profile.
///
/// Omitting `electricity`, `water` or `internet` (or leaving `gas` false)
/// opens no account for that utility. Usage rates are daily means;
/// `noise_std` is the relative standard deviation applied to every draw.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseholdConfig {
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub zip: String,
    /// Electricity supply strategy tag.
    pub electricity: Option<String>,
    /// Water plan tag.
    pub water: Option<String>,
    /// Internet plan tag.
    pub internet: Option<String>,
    /// Whether a gas account is opened.
    pub gas: bool,
    /// Mean electricity consumption (kWh/day).
    pub electricity_kwh_per_day: f64,
    /// Mean local generation on a clear day (kWh/day).
    pub generation_kwh_per_day: f64,
    /// Mean gas consumption (m³/day).
    pub gas_m3_per_day: f64,
    /// Mean water consumption (m³/day).
    pub water_m3_per_day: f64,
    /// Mean data transfer (GB/day).
    pub data_gb_per_day: f64,
    /// Relative noise standard deviation (0.1 = 10%).
    pub noise_std: f64,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            street: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
            zip: "12345".to_string(),
            electricity: None,
            water: None,
            internet: None,
            gas: false,
            electricity_kwh_per_day: 10.0,
            generation_kwh_per_day: 0.0,
            gas_m3_per_day: 1.5,
            water_m3_per_day: 0.5,
            data_gb_per_day: 3.0,
            noise_std: 0.1,
        }
    }
}

impl HouseholdConfig {
    /// A grid-only home on the standard water and internet plans, with gas.
    pub fn standard_home(street: &str) -> Self {
        Self {
            street: street.to_string(),
            electricity: Some("grid_only".to_string()),
            water: Some("residential_standard".to_string()),
            internet: Some("standard".to_string()),
            gas: true,
            ..Self::default()
        }
    }

    /// Service address.
    pub fn address(&self) -> Address {
        Address::new(&self.street, &self.city, &self.zip)
    }

    /// Parsed electricity strategy, if subscribed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unrecognised tag.
    pub fn electricity_strategy(&self) -> Result<Option<SupplyStrategy>, BillingError> {
        self.electricity.as_deref().map(str::parse).transpose()
    }

    /// Parsed water plan, if subscribed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unrecognised tag.
    pub fn water_plan(&self) -> Result<Option<WaterPlan>, BillingError> {
        self.water.as_deref().map(str::parse).transpose()
    }

    /// Parsed internet plan, if subscribed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unrecognised tag.
    pub fn internet_plan(&self) -> Result<Option<InternetPlan>, BillingError> {
        self.internet.as_deref().map(str::parse).transpose()
    }

    fn validate_into(&self, index: usize, errors: &mut Vec<ConfigError>) {
        let prefix = format!("households[{index}]");

        if self.street.trim().is_empty() {
            errors.push(ConfigError::new(format!("{prefix}.street"), "must not be empty"));
        }
        if let Err(e) = self.electricity_strategy() {
            errors.push(ConfigError::new(format!("{prefix}.electricity"), e.to_string()));
        }
        if let Err(e) = self.water_plan() {
            errors.push(ConfigError::new(format!("{prefix}.water"), e.to_string()));
        }
        if let Err(e) = self.internet_plan() {
            errors.push(ConfigError::new(format!("{prefix}.internet"), e.to_string()));
        }

        let profile = [
            ("electricity_kwh_per_day", self.electricity_kwh_per_day),
            ("generation_kwh_per_day", self.generation_kwh_per_day),
            ("gas_m3_per_day", self.gas_m3_per_day),
            ("water_m3_per_day", self.water_m3_per_day),
            ("data_gb_per_day", self.data_gb_per_day),
            ("noise_std", self.noise_std),
        ];
        for (name, value) in profile {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(
                    format!("{prefix}.{name}"),
                    format!("must be a finite value >= 0, got {value}"),
                ));
            }
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.days"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl RatesConfig {
    fn validate_into(&self, errors: &mut Vec<ConfigError>) {
        let prices = [
            ("rates.electricity_unit_price", self.electricity_unit_price),
            ("rates.electricity_feed_in_tariff", self.electricity_feed_in_tariff),
            ("rates.gas_unit_price", self.gas_unit_price),
        ];
        for (field, value) in prices {
            if let Some(v) = value.filter(|v| !v.is_finite() || *v < 0.0) {
                errors.push(ConfigError::new(
                    field,
                    format!("must be a finite price >= 0, got {v}"),
                ));
            }
        }

        for (tag, tiers) in &self.water {
            let field = format!("rates.water.{tag}");
            match tag.parse::<WaterPlan>() {
                Ok(plan) => {
                    let tiers: Vec<TariffTier> =
                        tiers.iter().copied().map(TariffTier::from).collect();
                    if let Err(e) = validate_tiers(plan, &tiers) {
                        errors.push(ConfigError::new(field, e.to_string()));
                    }
                }
                Err(e) => errors.push(ConfigError::new(field, e.to_string())),
            }
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: a mixed street on default tariffs.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            rates: RatesConfig::default(),
            households: vec![
                HouseholdConfig::standard_home("12 Oak Street"),
                HouseholdConfig {
                    electricity: Some("grid_tied_solar".to_string()),
                    water: Some("residential_conservation".to_string()),
                    internet: Some("premium".to_string()),
                    electricity_kwh_per_day: 12.0,
                    generation_kwh_per_day: 9.0,
                    water_m3_per_day: 0.35,
                    data_gb_per_day: 6.0,
                    ..HouseholdConfig::standard_home("48 Elm Road")
                },
                HouseholdConfig {
                    internet: None,
                    gas: false,
                    electricity_kwh_per_day: 6.0,
                    water_m3_per_day: 0.3,
                    ..HouseholdConfig::standard_home("7 Pine Lane")
                },
            ],
        }
    }

    /// Returns the solar-street preset: rooftop generation with a raised
    /// feed-in tariff.
    pub fn solar_street() -> Self {
        let house = |street: &str, strategy: &str, generation: f64| HouseholdConfig {
            city: "Sunnyvale".to_string(),
            zip: "94086".to_string(),
            electricity: Some(strategy.to_string()),
            generation_kwh_per_day: generation,
            electricity_kwh_per_day: 11.0,
            ..HouseholdConfig::standard_home(street)
        };
        Self {
            simulation: SimulationConfig::default(),
            rates: RatesConfig {
                electricity_feed_in_tariff: Some(4.0),
                ..RatesConfig::default()
            },
            households: vec![
                house("1 Sunbeam Way", "grid_tied_solar", 14.0),
                house("3 Sunbeam Way", "grid_tied_solar", 8.0),
                house("5 Sunbeam Way", "solar_primary", 13.0),
                house("7 Sunbeam Way", "grid_tied_wind", 10.0),
            ],
        }
    }

    /// Returns the commercial preset: high-usage business premises.
    pub fn commercial() -> Self {
        let unit = |street: &str| HouseholdConfig {
            city: "Metropolis".to_string(),
            zip: "10001".to_string(),
            electricity: Some("grid_tied_wind".to_string()),
            water: Some("commercial_standard".to_string()),
            internet: Some("business_fiber".to_string()),
            electricity_kwh_per_day: 180.0,
            generation_kwh_per_day: 40.0,
            gas_m3_per_day: 12.0,
            water_m3_per_day: 8.0,
            data_gb_per_day: 90.0,
            noise_std: 0.15,
            ..HouseholdConfig::standard_home(street)
        };
        Self {
            simulation: SimulationConfig::default(),
            rates: RatesConfig {
                electricity_unit_price: Some(7.0),
                ..RatesConfig::default()
            },
            households: vec![
                unit("100 Commerce Plaza"),
                HouseholdConfig {
                    electricity: Some("grid_only".to_string()),
                    generation_kwh_per_day: 0.0,
                    ..unit("220 Industrial Park")
                },
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "solar_street", "commercial"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "solar_street" => Ok(Self::solar_street()),
            "commercial" => Ok(Self::commercial()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.simulation.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if self.households.is_empty() {
            errors.push(ConfigError::new("households", "at least one household is required"));
        }

        self.rates.validate_into(&mut errors);
        for (i, h) in self.households.iter().enumerate() {
            h.validate_into(i, &mut errors);
        }

        errors
    }
}
