//! Engine settings, deserialized from TOML.
//!
//! Every field has a default so an empty document is a valid configuration.

use crate::aspects::AspectTable;
use crate::ephemeris::{HouseSystem, Planet};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineSettings {
    pub chart: ChartSettings,
    pub aspects: AspectSettings,
    pub retrograde: RetrogradeSettings,
    pub lunar: LunarSettings,
    pub ephemeris: EphemerisPathSettings,
    pub templates: TemplateSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChartSettings {
    pub house_system: HouseSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectSettings {
    /// Scales every base orb
    pub orb_multiplier: f64,
    /// Aspects kept per daily forecast
    pub top_aspects: usize,
    /// Base orb per aspect kind
    pub orbs: AspectTable,
}

impl Default for AspectSettings {
    fn default() -> Self {
        Self {
            orb_multiplier: 1.0,
            top_aspects: 6,
            orbs: AspectTable::default(),
        }
    }
}

/// Upper bound for retrograde lead and padding days
pub const MAX_RETROGRADE_DAYS: i64 = 3660;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrogradeSettings {
    /// Days between the pre-alert and the station
    pub lead_days: i64,
    /// Sampling starts this many days before the query window
    pub pad_before_days: i64,
    /// Sampling ends this many days after the query window
    pub pad_after_days: i64,
    /// Zone whose local time-of-day is sampled
    pub sample_timezone: String,
    pub sample_hour: u32,
    /// Planets tracked for premium users
    pub tracked_planets: Vec<Planet>,
    /// Planets tracked for free users
    pub free_planets: Vec<Planet>,
}

impl Default for RetrogradeSettings {
    fn default() -> Self {
        Self {
            lead_days: 3,
            pad_before_days: 30,
            pad_after_days: 60,
            sample_timezone: "UTC".to_string(),
            sample_hour: 12,
            tracked_planets: vec![
                Planet::Mercury,
                Planet::Venus,
                Planet::Mars,
                Planet::Jupiter,
                Planet::Saturn,
            ],
            free_planets: vec![Planet::Mercury],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LunarSettings {
    /// Day contexts kept before the cache is halved
    pub cache_capacity: usize,
    pub reference_hour: u32,
}

impl Default for LunarSettings {
    fn default() -> Self {
        Self {
            cache_capacity: 100,
            reference_hour: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EphemerisPathSettings {
    /// Swiss Ephemeris data directory; `SWISS_EPHEMERIS_PATH` when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TemplateSettings {
    pub transit_templates: Option<PathBuf>,
    pub lunar_catalog: Option<PathBuf>,
    pub retrograde_guides: Option<PathBuf>,
}

impl EngineSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings =
            toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let multiplier = self.aspects.orb_multiplier;
        if multiplier.is_nan() || multiplier <= 0.0 {
            return Err(EngineError::Config(format!(
                "aspects.orb_multiplier must be positive, got {}",
                multiplier
            )));
        }
        if let Some((kind, orb)) = self.aspects.orbs.iter().find(|(_, orb)| *orb < 0.0) {
            return Err(EngineError::Config(format!(
                "aspects.orbs.{} must not be negative, got {}",
                kind, orb
            )));
        }
        if self.retrograde.lead_days < 0
            || self.retrograde.pad_before_days < 0
            || self.retrograde.pad_after_days < 0
        {
            return Err(EngineError::Config(
                "retrograde day counts must not be negative".to_string(),
            ));
        }
        let longest = self
            .retrograde
            .lead_days
            .max(self.retrograde.pad_before_days)
            .max(self.retrograde.pad_after_days);
        if longest > MAX_RETROGRADE_DAYS {
            return Err(EngineError::Config(format!(
                "retrograde day counts must not exceed {}, got {}",
                MAX_RETROGRADE_DAYS, longest
            )));
        }
        if self.retrograde.sample_hour > 23 || self.lunar.reference_hour > 23 {
            return Err(EngineError::Config("hours must be within 0..=23".to_string()));
        }
        if self.lunar.cache_capacity < 2 {
            return Err(EngineError::Config(
                "lunar.cache_capacity must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
