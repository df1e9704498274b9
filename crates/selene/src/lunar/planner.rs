use crate::chart::{locate_house, ChartSnapshot};
use crate::ephemeris::{EphemerisProvider, Planet};
use crate::error::EngineError;
use crate::interpretation::TransitTemplates;
use crate::lunar::catalog::{
    ActionDefinition, LunarCatalog, MoonPhase, PhaseAdvice, PhaseDefinition, SignDefinition,
};
use crate::settings::LunarSettings;
use crate::timezone::{local_at_hour, resolve_utc};
use crate::zodiac::sign_index;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Lunar situation for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayContext {
    pub date: NaiveDate,
    pub phase: PhaseDefinition,
    pub moon_sign: SignDefinition,
    /// Lit fraction of the disc, 0..=100
    pub illumination: u8,
    /// Moon minus Sun longitude, 0..360
    pub angle: f64,
    /// Natal house the transiting Moon occupies
    pub natal_house: Option<u8>,
}

/// An action paired with the advice for the day's phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSuggestion {
    pub action: ActionDefinition,
    pub advice: PhaseAdvice,
}

/// Percentage of the lunar disc lit at a given elongation.
pub fn illumination(angle: f64) -> u8 {
    let lit = ((1.0 - angle.to_radians().cos()) * 50.0).round();
    lit.clamp(0.0, 100.0) as u8
}

/// Phase bucket key for an elongation ("waxing_crescent", ...).
pub fn phase_key_from_angle(angle: f64) -> &'static str {
    MoonPhase::from_angle(angle).key()
}

/// Chart-independent part of a day, plus the Moon longitude for house lookup
#[derive(Debug, Clone)]
struct CachedDay {
    context: DayContext,
    moon_lon: f64,
}

/// Day contexts keyed by date and zone, plus the action ranker
pub struct LunarPlanner {
    catalog: Arc<LunarCatalog>,
    templates: Arc<TransitTemplates>,
    settings: LunarSettings,
    cache: HashMap<(NaiveDate, String), CachedDay>,
}

impl LunarPlanner {
    pub fn new(
        catalog: Arc<LunarCatalog>,
        templates: Arc<TransitTemplates>,
        settings: LunarSettings,
    ) -> Self {
        Self {
            catalog,
            templates,
            settings,
            cache: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &LunarCatalog {
        &self.catalog
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn with_house(cached: &CachedDay, natal: Option<&ChartSnapshot>) -> DayContext {
        DayContext {
            natal_house: natal.and_then(|chart| locate_house(cached.moon_lon, &chart.houses)),
            ..cached.context.clone()
        }
    }

    /// Lunar context at local reference time on `date`.
    ///
    /// Cached days keep the Moon's longitude, so the natal house is resolved
    /// against whichever chart the caller supplies.
    pub fn compute(
        &mut self,
        provider: &dyn EphemerisProvider,
        date: NaiveDate,
        timezone: &str,
        natal: Option<&ChartSnapshot>,
    ) -> Result<DayContext, EngineError> {
        let key = (date, timezone.to_string());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Self::with_house(cached, natal));
        }

        let instant = resolve_utc(local_at_hour(date, self.settings.reference_hour), timezone);
        let positions = provider.planet_positions(instant, &[Planet::Sun, Planet::Moon])?;
        let (Some(sun), Some(moon)) = (positions.get(&Planet::Sun), positions.get(&Planet::Moon)) else {
            return Err(EngineError::EphemerisFailure {
                message: format!("Sun or Moon missing for {}", date),
            });
        };

        let angle = (moon.lon - sun.lon).rem_euclid(360.0);
        let phase = MoonPhase::from_angle(angle);
        let phase = self.catalog.phase(phase).cloned().ok_or_else(|| EngineError::TemplateLoad {
            source_name: "lunar catalog".to_string(),
            message: format!("phase {} is not defined", phase),
        })?;
        let moon_sign = self
            .catalog
            .sign(sign_index(moon.lon))
            .cloned()
            .ok_or_else(|| EngineError::TemplateLoad {
                source_name: "lunar catalog".to_string(),
                message: "sign list is incomplete".to_string(),
            })?;

        let cached = CachedDay {
            context: DayContext {
                date,
                phase,
                moon_sign,
                illumination: illumination(angle),
                angle,
                natal_house: None,
            },
            moon_lon: moon.lon,
        };
        let context = Self::with_house(&cached, natal);
        self.cache.insert(key, cached);
        self.prune_cache();
        Ok(context)
    }

    /// Halve the cache, keeping the latest dates, once it outgrows capacity.
    fn prune_cache(&mut self) {
        let capacity = self.settings.cache_capacity;
        if self.cache.len() <= capacity {
            return;
        }
        let mut keys: Vec<(NaiveDate, String)> = self.cache.keys().cloned().collect();
        keys.sort_by(|a, b| a.0.cmp(&b.0));
        let drop_count = keys.len().saturating_sub(capacity / 2);
        for key in keys.into_iter().take(drop_count) {
            self.cache.remove(&key);
        }
        log::debug!("Lunar cache trimmed to {} entries", self.cache.len());
    }

    /// Contexts for `days` consecutive dates from `start`.
    pub fn build_window(
        &mut self,
        provider: &dyn EphemerisProvider,
        start: NaiveDate,
        timezone: &str,
        days: u32,
        natal: Option<&ChartSnapshot>,
    ) -> Result<Vec<DayContext>, EngineError> {
        (0..days)
            .map(|offset| self.compute(provider, start + Duration::days(offset as i64), timezone, natal))
            .collect()
    }

    /// Rank catalog actions for a day.
    ///
    /// Candidates scoring at least 2 are preferred, then at least 1, then
    /// anything at all.
    pub fn select_actions(&self, day: &DayContext, is_premium: bool, limit: usize) -> Vec<ActionSuggestion> {
        let mut candidates: Vec<ActionSuggestion> = self
            .catalog
            .actions()
            .iter()
            .filter(|action| is_premium || !action.premium_only)
            .map(|action| ActionSuggestion {
                advice: action
                    .phase_advice
                    .get(&day.phase.key)
                    .cloned()
                    .unwrap_or_else(|| PhaseAdvice::neutral(&action.summary)),
                action: action.clone(),
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.advice
                .score()
                .cmp(&a.advice.score())
                .then_with(|| b.action.categories.len().cmp(&a.action.categories.len()))
                .then_with(|| a.action.slug.cmp(&b.action.slug))
        });

        let mut preferred: Vec<ActionSuggestion> = Vec::new();
        for threshold in [2, 1] {
            preferred = candidates
                .iter()
                .filter(|c| c.advice.score() >= threshold)
                .cloned()
                .collect();
            if !preferred.is_empty() {
                break;
            }
        }
        if preferred.is_empty() {
            preferred = candidates;
        }
        preferred.truncate(limit);
        preferred
    }

    pub fn action(&self, slug: &str) -> Option<&ActionDefinition> {
        self.catalog.action(slug)
    }

    /// Advice an action carries for a phase, if any.
    pub fn action_advice(&self, slug: &str, phase: MoonPhase) -> Option<&PhaseAdvice> {
        self.action(slug)?.phase_advice.get(&phase)
    }

    /// Random meaning for the Moon's natal house, with the house title.
    pub fn house_interpretation<R: Rng + ?Sized>(&self, house: u8, rng: &mut R) -> Option<(String, String)> {
        let title = self.templates.house_title(house)?;
        let meaning = self.templates.house_meaning(house, rng)?;
        Some((title.to_string(), meaning.to_string()))
    }
}
