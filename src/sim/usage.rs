//! Seeded daily usage generation for one household.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::accounts::SupplyStrategy;
use crate::config::HouseholdConfig;

/// AR(1) persistence of the solar cloud factor.
const CLOUD_ALPHA: f64 = 0.7;
/// Innovation noise of the solar cloud factor.
const CLOUD_NOISE_STD: f64 = 0.25;
/// Bounds of the solar cloud factor (overcast to cloud-edge boost).
const CLOUD_FACTOR_MIN: f64 = 0.2;
const CLOUD_FACTOR_MAX: f64 = 1.1;
/// Day-to-day gustiness of wind output.
const GUST_NOISE_STD: f64 = 0.45;
const GUST_FACTOR_MAX: f64 = 1.6;

/// Draws a zero-mean Gaussian sample via Box-Muller.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Where local generation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSource {
    /// Rooftop solar, scaled by a persistent cloud factor.
    Solar,
    /// Small wind, scaled by an independent daily gust factor.
    Wind,
}

impl GenerationSource {
    /// Source implied by an electricity strategy; `None` for grid-only.
    pub fn for_strategy(strategy: SupplyStrategy) -> Option<Self> {
        match strategy {
            SupplyStrategy::GridOnly => None,
            SupplyStrategy::SolarPrimary | SupplyStrategy::GridTiedSolar => Some(Self::Solar),
            SupplyStrategy::WindPrimary | SupplyStrategy::GridTiedWind => Some(Self::Wind),
        }
    }
}

/// Usage recorded for one household on one day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyUsage {
    /// Electricity consumed (kWh).
    pub electricity_kwh: f64,
    /// Electricity generated locally (kWh).
    pub generation_kwh: f64,
    /// Gas consumed (m³).
    pub gas_m3: f64,
    /// Water consumed (m³).
    pub water_m3: f64,
    /// Data transferred (GB).
    pub data_gb: f64,
}

/// Seeded generator of daily usage around a household's means.
///
/// Every draw is `mean * (1 + N(0, noise_std))`, floored at zero. Generation
/// is additionally scaled by the day's weather factor.
#[derive(Debug, Clone)]
pub struct UsageProfile {
    electricity_kwh: f64,
    generation_kwh: f64,
    gas_m3: f64,
    water_m3: f64,
    data_gb: f64,
    noise_std: f64,
    source: Option<GenerationSource>,
    cloud_factor: f64,
    rng: StdRng,
}

impl UsageProfile {
    /// Builds a profile from a household's configured means.
    ///
    /// # Arguments
    ///
    /// * `household` - Daily means and noise level
    /// * `source` - Generation source, or `None` for no local generation
    /// * `seed` - Random seed for reproducible draws
    pub fn new(household: &HouseholdConfig, source: Option<GenerationSource>, seed: u64) -> Self {
        Self {
            electricity_kwh: household.electricity_kwh_per_day.max(0.0),
            generation_kwh: household.generation_kwh_per_day.max(0.0),
            gas_m3: household.gas_m3_per_day.max(0.0),
            water_m3: household.water_m3_per_day.max(0.0),
            data_gb: household.data_gb_per_day.max(0.0),
            noise_std: household.noise_std.max(0.0),
            source,
            cloud_factor: 1.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn draw(&mut self, mean: f64) -> f64 {
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        (mean * (1.0 + noise)).max(0.0)
    }

    fn weather_factor(&mut self) -> f64 {
        match self.source {
            None => 0.0,
            Some(GenerationSource::Solar) => {
                let eps = gaussian_noise(&mut self.rng, CLOUD_NOISE_STD);
                self.cloud_factor =
                    CLOUD_ALPHA * self.cloud_factor + (1.0 - CLOUD_ALPHA) * (1.0 + eps);
                self.cloud_factor = self.cloud_factor.clamp(CLOUD_FACTOR_MIN, CLOUD_FACTOR_MAX);
                self.cloud_factor
            }
            Some(GenerationSource::Wind) => {
                (1.0 + gaussian_noise(&mut self.rng, GUST_NOISE_STD)).clamp(0.0, GUST_FACTOR_MAX)
            }
        }
    }

    /// Generates the next day's usage.
    pub fn next_day(&mut self) -> DailyUsage {
        let factor = self.weather_factor();
        DailyUsage {
            electricity_kwh: self.draw(self.electricity_kwh),
            generation_kwh: self.draw(self.generation_kwh) * factor,
            gas_m3: self.draw(self.gas_m3),
            water_m3: self.draw(self.water_m3),
            data_gb: self.draw(self.data_gb),
        }
    }
}
