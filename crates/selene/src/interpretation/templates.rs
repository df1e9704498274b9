//! Transit interpretation templates, resolved into typed lookup tables.

use crate::aspects::AspectKind;
use crate::data::{parse_house_key, parse_json, parse_key, read_json};
use crate::ephemeris::Planet;
use crate::error::EngineError;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const BUNDLED_SOURCE: &str = "data/transit_templates.json";

const GENERIC_RETROGRADE_NOTE: &str =
    "♻️ {transit_planet} движется ретроградно: действуйте вдумчиво, оставьте пространство для корректировок.";

lazy_static::lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern");

    static ref BUNDLED: Result<Arc<TransitTemplates>, EngineError> =
        TransitTemplates::from_json(include_str!("../../data/transit_templates.json"), BUNDLED_SOURCE)
            .map(Arc::new);
}

/// Substitute `{name}` placeholders; unknown names are left verbatim.
pub fn fill_placeholders(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// One wording of an interpretation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateVariant {
    pub title: String,
    pub text: String,
    pub advice: String,
}

type AspectBlock = HashMap<String, HashMap<String, Vec<TemplateVariant>>>;

#[derive(Debug, Deserialize)]
struct RawTransitTemplates {
    #[serde(default)]
    planets: HashMap<String, AspectBlock>,
    #[serde(default)]
    defaults: HashMap<String, Vec<TemplateVariant>>,
    #[serde(default)]
    houses: HashMap<String, Vec<String>>,
    #[serde(default)]
    house_titles: HashMap<String, String>,
    #[serde(default)]
    retrograde_notes: HashMap<String, String>,
    #[serde(default)]
    generic_retrograde_note: Option<String>,
}

/// Interpretation data keyed by planet and aspect identity
#[derive(Debug, Clone, Default)]
pub struct TransitTemplates {
    pairs: HashMap<(Planet, AspectKind, Planet), Vec<TemplateVariant>>,
    defaults: HashMap<AspectKind, Vec<TemplateVariant>>,
    houses: HashMap<u8, Vec<String>>,
    house_titles: HashMap<u8, String>,
    retrograde_notes: HashMap<Planet, String>,
    generic_retrograde_note: String,
}

impl TransitTemplates {
    /// The templates shipped with the crate, parsed once per process.
    pub fn bundled() -> Result<Arc<TransitTemplates>, EngineError> {
        BUNDLED.clone()
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let raw: RawTransitTemplates = read_json(path)?;
        Self::resolve(raw, &path.display().to_string())
    }

    pub fn from_json(json: &str, source_name: &str) -> Result<Self, EngineError> {
        let raw: RawTransitTemplates = parse_json(json, source_name)?;
        Self::resolve(raw, source_name)
    }

    fn resolve(raw: RawTransitTemplates, source: &str) -> Result<Self, EngineError> {
        let mut pairs = HashMap::new();
        for (transit_key, aspects) in raw.planets {
            let transit: Planet = parse_key(&transit_key, source)?;
            for (aspect_key, natal_block) in aspects {
                let aspect: AspectKind = parse_key(&aspect_key, source)?;
                for (natal_key, variants) in natal_block {
                    let natal: Planet = parse_key(&natal_key, source)?;
                    if !variants.is_empty() {
                        pairs.insert((transit, aspect, natal), variants);
                    }
                }
            }
        }

        let mut defaults = HashMap::new();
        for (aspect_key, variants) in raw.defaults {
            let aspect: AspectKind = parse_key(&aspect_key, source)?;
            if !variants.is_empty() {
                defaults.insert(aspect, variants);
            }
        }

        let mut houses = HashMap::new();
        for (key, pool) in raw.houses {
            houses.insert(parse_house_key(&key, source)?, pool);
        }

        let mut house_titles = HashMap::new();
        for (key, title) in raw.house_titles {
            house_titles.insert(parse_house_key(&key, source)?, title);
        }

        let mut retrograde_notes = HashMap::new();
        for (key, note) in raw.retrograde_notes {
            retrograde_notes.insert(parse_key::<Planet>(&key, source)?, note);
        }

        log::debug!(
            "Loaded {} pair templates and {} aspect defaults from {}",
            pairs.len(),
            defaults.len(),
            source
        );

        Ok(Self {
            pairs,
            defaults,
            houses,
            house_titles,
            retrograde_notes,
            generic_retrograde_note: raw
                .generic_retrograde_note
                .unwrap_or_else(|| GENERIC_RETROGRADE_NOTE.to_string()),
        })
    }

    /// Variants for an aspect: the exact planet pair first, then the
    /// aspect default. `None` when neither exists.
    pub fn variants(
        &self,
        transit: Planet,
        aspect: AspectKind,
        natal: Planet,
    ) -> Option<&[TemplateVariant]> {
        self.pairs
            .get(&(transit, aspect, natal))
            .or_else(|| self.defaults.get(&aspect))
            .map(Vec::as_slice)
    }

    /// Pick one variant uniformly at random
    pub fn choose<R: Rng + ?Sized>(
        &self,
        transit: Planet,
        aspect: AspectKind,
        natal: Planet,
        rng: &mut R,
    ) -> Option<&TemplateVariant> {
        self.variants(transit, aspect, natal)?.choose(rng)
    }

    /// Random meaning from a house's text pool
    pub fn house_meaning<R: Rng + ?Sized>(&self, house: u8, rng: &mut R) -> Option<&str> {
        self.houses.get(&house)?.choose(rng).map(String::as_str)
    }

    pub fn house_title(&self, house: u8) -> Option<&str> {
        self.house_titles.get(&house).map(String::as_str)
    }

    /// Retrograde caveat for a planet, or the generic one
    pub fn retrograde_note(&self, planet: Planet) -> &str {
        self.retrograde_notes
            .get(&planet)
            .map(String::as_str)
            .unwrap_or(&self.generic_retrograde_note)
    }
}
