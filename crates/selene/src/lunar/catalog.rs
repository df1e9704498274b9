//! Static lunar reference data: phases, Moon signs and the action catalog.

use crate::data::{parse_json, read_json};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

const BUNDLED_SOURCE: &str = "data/lunar_planner.json";

lazy_static::lazy_static! {
    static ref BUNDLED: Result<Arc<LunarCatalog>, EngineError> =
        LunarCatalog::from_json(include_str!("../../data/lunar_planner.json"), BUNDLED_SOURCE)
            .map(Arc::new);
}

/// Eight-part lunar cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "new_moon",
            MoonPhase::WaxingCrescent => "waxing_crescent",
            MoonPhase::FirstQuarter => "first_quarter",
            MoonPhase::WaxingGibbous => "waxing_gibbous",
            MoonPhase::FullMoon => "full_moon",
            MoonPhase::WaningGibbous => "waning_gibbous",
            MoonPhase::LastQuarter => "last_quarter",
            MoonPhase::WaningCrescent => "waning_crescent",
        }
    }

    /// Bucket a Moon-minus-Sun elongation in degrees.
    pub fn from_angle(angle: f64) -> Self {
        let angle = angle.rem_euclid(360.0);
        if !(20.0..340.0).contains(&angle) {
            MoonPhase::NewMoon
        } else if angle < 70.0 {
            MoonPhase::WaxingCrescent
        } else if angle < 110.0 {
            MoonPhase::FirstQuarter
        } else if angle < 160.0 {
            MoonPhase::WaxingGibbous
        } else if angle < 200.0 {
            MoonPhase::FullMoon
        } else if angle < 250.0 {
            MoonPhase::WaningGibbous
        } else if angle < 300.0 {
            MoonPhase::LastQuarter
        } else {
            MoonPhase::WaningCrescent
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MoonPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        MoonPhase::ALL
            .into_iter()
            .find(|phase| phase.key() == key)
            .ok_or_else(|| format!("Unknown moon phase: {}", s))
    }
}

/// How favourable a phase is for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Excellent,
    Good,
    Neutral,
    Unfavorable,
}

impl Rating {
    pub fn score(&self) -> u8 {
        match self {
            Rating::Excellent => 3,
            Rating::Good => 2,
            Rating::Neutral => 1,
            Rating::Unfavorable => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub key: MoonPhase,
    pub title: String,
    pub emoji: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignDefinition {
    pub key: String,
    pub title: String,
    pub emoji: String,
    pub element: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseAdvice {
    pub rating: Rating,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caution: Option<String>,
}

impl PhaseAdvice {
    /// Stand-in for phases an action has no advice for
    pub fn neutral(text: &str) -> Self {
        Self {
            rating: Rating::Neutral,
            text: text.to_string(),
            caution: None,
        }
    }

    pub fn score(&self) -> u8 {
        self.rating.score()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub slug: String,
    pub title: String,
    pub emoji: String,
    pub summary: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub premium_only: bool,
    #[serde(default)]
    pub phase_advice: HashMap<MoonPhase, PhaseAdvice>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    phases: Vec<PhaseDefinition>,
    signs: Vec<SignDefinition>,
    #[serde(default)]
    actions: Vec<ActionDefinition>,
}

/// Loaded lunar reference data
#[derive(Debug, Clone)]
pub struct LunarCatalog {
    phases: HashMap<MoonPhase, PhaseDefinition>,
    signs: Vec<SignDefinition>,
    actions: Vec<ActionDefinition>,
}

impl LunarCatalog {
    pub fn bundled() -> Result<Arc<LunarCatalog>, EngineError> {
        BUNDLED.clone()
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let raw: RawCatalog = read_json(path)?;
        Self::resolve(raw, &path.display().to_string())
    }

    pub fn from_json(json: &str, source_name: &str) -> Result<Self, EngineError> {
        let raw: RawCatalog = parse_json(json, source_name)?;
        Self::resolve(raw, source_name)
    }

    fn resolve(raw: RawCatalog, source: &str) -> Result<Self, EngineError> {
        let load_error = |message: String| EngineError::TemplateLoad {
            source_name: source.to_string(),
            message,
        };

        let phases: HashMap<MoonPhase, PhaseDefinition> =
            raw.phases.into_iter().map(|p| (p.key, p)).collect();
        if let Some(missing) = MoonPhase::ALL.iter().find(|p| !phases.contains_key(p)) {
            return Err(load_error(format!("phase {} is not defined", missing)));
        }
        if raw.signs.len() != 12 {
            return Err(load_error(format!("expected 12 signs, found {}", raw.signs.len())));
        }

        let mut actions = raw.actions;
        let mut seen = std::collections::HashSet::new();
        for action in &actions {
            if !seen.insert(action.slug.as_str()) {
                return Err(load_error(format!("duplicate action slug {}", action.slug)));
            }
        }
        actions.sort_by(|a, b| a.slug.cmp(&b.slug));

        log::debug!("Loaded {} lunar actions from {}", actions.len(), source);

        Ok(Self {
            phases,
            signs: raw.signs,
            actions,
        })
    }

    pub fn phase(&self, phase: MoonPhase) -> Option<&PhaseDefinition> {
        self.phases.get(&phase)
    }

    /// Sign by zodiac index 0..12 (Aries first)
    pub fn sign(&self, index: usize) -> Option<&SignDefinition> {
        self.signs.get(index % 12)
    }

    pub fn actions(&self) -> &[ActionDefinition] {
        &self.actions
    }

    pub fn action(&self, slug: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.slug == slug)
    }
}
