//! Alert wording and per-planet guides for retrograde periods.

use crate::data::{parse_json, parse_key, read_json};
use crate::ephemeris::Planet;
use crate::error::EngineError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const BUNDLED_SOURCE: &str = "data/retrograde_guides.json";

lazy_static::lazy_static! {
    static ref BUNDLED: Result<Arc<RetrogradeGuides>, EngineError> =
        RetrogradeGuides::from_json(include_str!("../../data/retrograde_guides.json"), BUNDLED_SOURCE)
            .map(Arc::new);
}

/// Message templates; `{planet}`, `{start_date}`, `{end_date}`, `{days}`,
/// `{days_word}` and `{pre_alert}` are filled at format time.
#[derive(Debug, Clone, Deserialize)]
pub struct RetroMessages {
    pub pre_alert_premium_header: String,
    pub pre_alert_premium_list: String,
    pub pre_alert_free: String,
    pub pre_alert_no_end: String,
    pub start_premium_header: String,
    pub start_premium_list: String,
    pub start_free: String,
    pub start_no_end: String,
    pub summary_active: String,
    pub summary_upcoming: String,
    pub premium_only: String,
    pub premium_cta: String,
    pub what_is_retrograde: String,
    pub premium_fallback: String,
}

/// Checklists before and during a retrograde period
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanetGuide {
    #[serde(default)]
    pub pre: Vec<String>,
    #[serde(default)]
    pub during: Vec<String>,
}

/// Which part of a period a guide covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidePhase {
    Pre,
    During,
}

#[derive(Debug, Deserialize)]
struct RawGuides {
    messages: RetroMessages,
    #[serde(default)]
    guides: HashMap<String, PlanetGuide>,
    #[serde(default)]
    default_guides: PlanetGuide,
    #[serde(default)]
    premium_explanations: HashMap<String, String>,
    #[serde(default)]
    free_explanations: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct RetrogradeGuides {
    pub messages: RetroMessages,
    guides: HashMap<Planet, PlanetGuide>,
    default_guide: PlanetGuide,
    premium_explanations: HashMap<Planet, String>,
    free_explanations: HashMap<Planet, String>,
}

impl RetrogradeGuides {
    pub fn bundled() -> Result<Arc<RetrogradeGuides>, EngineError> {
        BUNDLED.clone()
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let raw: RawGuides = read_json(path)?;
        Self::resolve(raw, &path.display().to_string())
    }

    pub fn from_json(json: &str, source_name: &str) -> Result<Self, EngineError> {
        let raw: RawGuides = parse_json(json, source_name)?;
        Self::resolve(raw, source_name)
    }

    fn resolve(raw: RawGuides, source: &str) -> Result<Self, EngineError> {
        let guides = raw
            .guides
            .into_iter()
            .map(|(key, guide)| Ok((parse_key::<Planet>(&key, source)?, guide)))
            .collect::<Result<HashMap<_, _>, EngineError>>()?;
        let premium_explanations = resolve_planet_map(raw.premium_explanations, source)?;
        let free_explanations = resolve_planet_map(raw.free_explanations, source)?;
        Ok(Self {
            messages: raw.messages,
            guides,
            default_guide: raw.default_guides,
            premium_explanations,
            free_explanations,
        })
    }

    /// Checklist for a planet, falling back to the generic one.
    pub fn guide(&self, planet: Planet, phase: GuidePhase) -> &[String] {
        let guide = self.guides.get(&planet).unwrap_or(&self.default_guide);
        let items = match phase {
            GuidePhase::Pre => &guide.pre,
            GuidePhase::During => &guide.during,
        };
        if items.is_empty() {
            match phase {
                GuidePhase::Pre => &self.default_guide.pre,
                GuidePhase::During => &self.default_guide.during,
            }
        } else {
            items
        }
    }

    /// Explanation appended to a summary.
    ///
    /// Premium users get the planet's detailed text; free users get the
    /// general explanation plus a short planet line or the upgrade prompt.
    pub fn explanation(&self, planet: Planet, is_premium: bool) -> String {
        if is_premium {
            return self
                .premium_explanations
                .get(&planet)
                .cloned()
                .unwrap_or_else(|| self.messages.what_is_retrograde.clone());
        }
        let mut text = self.messages.what_is_retrograde.clone();
        match self.free_explanations.get(&planet) {
            Some(short) => text.push_str(short),
            None => text.push_str(&self.messages.premium_fallback),
        }
        text
    }
}

fn resolve_planet_map(
    raw: HashMap<String, String>,
    source: &str,
) -> Result<HashMap<Planet, String>, EngineError> {
    raw.into_iter()
        .map(|(key, text)| Ok((parse_key::<Planet>(&key, source)?, text)))
        .collect()
}
