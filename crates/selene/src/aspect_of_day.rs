//! Aspects between transiting planets on a given day.

use crate::aspects::{angular_distance, aspect_weight, is_applying, AspectKind, AspectTable, TransitAspect, EXACT_ORB};
use crate::chart::REFERENCE_HOUR;
use crate::ephemeris::{EphemerisProvider, Planet, PlanetPosition};
use crate::error::EngineError;
use crate::interpretation::labels::{aspect_label, planet_label};
use crate::interpretation::{fill_placeholders, TransitInterpreter};
use crate::timezone::local_at_hour;
use chrono::{NaiveDate, TimeZone, Utc};
use rand::Rng;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const NO_DAY_ASPECTS_TEXT: &str = "Сегодня значимых аспектов нет — спокойный фон.";

const DAY_HEADING: &str = "✨ Сегодняшний фон";
const PREMIUM_BONUS: &str =
    "💡 Premium-бонус: вы видите все значимые аспекты суток. Исполните главный совет и сохраните заметку в дневнике.";

/// A sky-to-sky aspect with free and premium wording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAspect {
    pub planet_a: Planet,
    pub planet_b: Planet,
    pub aspect: AspectKind,
    pub orb: f64,
    pub exact: bool,
    pub weight: f64,
    pub text: String,
    pub premium_text: String,
}

pub struct AspectOfDayService {
    interpreter: TransitInterpreter,
    table: AspectTable,
    planets: Vec<Planet>,
    cache: HashMap<NaiveDate, Vec<DayAspect>>,
}

impl AspectOfDayService {
    pub fn new(interpreter: TransitInterpreter, table: AspectTable) -> Self {
        Self {
            interpreter,
            table,
            planets: Planet::ALL.to_vec(),
            cache: HashMap::new(),
        }
    }

    pub fn with_planets(mut self, planets: &[Planet]) -> Self {
        self.planets = planets.to_vec();
        self.cache.clear();
        self
    }

    /// All aspects between tracked planets at noon UTC, strongest first.
    /// Aspects without interpretation text are skipped.
    pub fn aspects_of_day<R: Rng + ?Sized>(
        &mut self,
        provider: &dyn EphemerisProvider,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<DayAspect>, EngineError> {
        if let Some(cached) = self.cache.get(&date) {
            return Ok(cached.clone());
        }

        let instant = Utc.from_utc_datetime(&local_at_hour(date, REFERENCE_HOUR));
        let positions = provider.planet_positions(instant, &self.planets)?;

        let mut collected = Vec::new();
        for (idx, planet_a) in self.planets.iter().enumerate() {
            for planet_b in &self.planets[idx + 1..] {
                let (Some(pos_a), Some(pos_b)) = (positions.get(planet_a), positions.get(planet_b)) else {
                    log::debug!("No positions for {}/{} on {}", planet_a, planet_b, date);
                    continue;
                };
                let distance = angular_distance(pos_a.lon, pos_b.lon);
                for (kind, base_orb) in self.table.iter() {
                    let orb = (kind.angle() - distance).abs();
                    if orb > base_orb {
                        continue;
                    }
                    if let Some(aspect) = self.render(pos_a, pos_b, kind, orb, base_orb, rng) {
                        collected.push(aspect);
                    }
                }
            }
        }

        collected.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.orb.partial_cmp(&b.orb).unwrap_or(Ordering::Equal))
        });
        self.cache.insert(date, collected.clone());
        Ok(collected)
    }

    /// The `count` strongest aspects of the day
    pub fn top<R: Rng + ?Sized>(
        &mut self,
        provider: &dyn EphemerisProvider,
        date: NaiveDate,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<DayAspect>, EngineError> {
        let mut aspects = self.aspects_of_day(provider, date, rng)?;
        aspects.truncate(count);
        Ok(aspects)
    }

    fn render<R: Rng + ?Sized>(
        &self,
        pos_a: &PlanetPosition,
        pos_b: &PlanetPosition,
        kind: AspectKind,
        orb: f64,
        base_orb: f64,
        rng: &mut R,
    ) -> Option<DayAspect> {
        // Both bodies move, so applying depends on their relative speed.
        let relative = PlanetPosition {
            speed_lon: pos_a.speed_lon - pos_b.speed_lon,
            ..pos_a.clone()
        };
        let weight = aspect_weight(pos_a.planet, pos_b.planet, kind, orb, base_orb);
        let aspect = TransitAspect {
            transit_planet: pos_a.planet,
            natal_planet: pos_b.planet,
            aspect: kind,
            orb: (orb * 100.0).round() / 100.0,
            exact: orb <= EXACT_ORB,
            applying: is_applying(&relative, pos_b, kind.angle()),
            weight,
            transit_house: None,
            natal_house: None,
            transit_position: pos_a.clone(),
            natal_position: pos_b.clone(),
        };

        let variant = self
            .interpreter
            .templates()
            .choose(pos_a.planet, kind, pos_b.planet, rng)?;
        let context = TransitInterpreter::context(&aspect);
        let text = fill_placeholders(&variant.text, &context);
        let advice = format!("Совет дня: {}. #советдня", fill_placeholders(&variant.advice, &context));

        let mut premium = vec![text.clone()];
        if let Some(note) = self.interpreter.retrograde_note(&aspect) {
            premium.push(note);
        }
        premium.push(advice.clone());

        Some(DayAspect {
            planet_a: aspect.transit_planet,
            planet_b: aspect.natal_planet,
            aspect: kind,
            orb: aspect.orb,
            exact: aspect.exact,
            weight,
            text: [text, advice].join("\n"),
            premium_text: premium.join("\n"),
        })
    }
}

/// Message body for a list of day aspects
pub fn format_day_aspects(aspects: &[DayAspect], is_premium: bool) -> String {
    if aspects.is_empty() {
        return NO_DAY_ASPECTS_TEXT.to_string();
    }
    let mut blocks = vec![DAY_HEADING.to_string()];
    for aspect in aspects {
        let title = format!(
            "🌟 {} {} {} #аспектдня",
            planet_label(aspect.planet_a),
            aspect_label(aspect.aspect),
            planet_label(aspect.planet_b)
        );
        let body = if is_premium {
            &aspect.premium_text
        } else {
            &aspect.text
        };
        blocks.push(format!("{}\n{}", title, body));
    }
    if is_premium && aspects.len() > 1 {
        blocks.push(PREMIUM_BONUS.to_string());
    }
    blocks.join("\n\n")
}
