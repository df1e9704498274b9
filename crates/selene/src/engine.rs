//! Engine facade: one provider, the loaded reference data and the caches.
//!
//! The engine is not internally synchronized. Hosts that share it across
//! threads wrap it in their own lock.

use crate::aspect_of_day::{format_day_aspects, AspectOfDayService, DayAspect};
use crate::aspects::{AspectCalculator, TransitAspect};
use crate::chart::{locate_house, ChartBuilder, ChartKind, ChartSnapshot, HouseCusp};
use crate::ephemeris::{EphemerisProvider, Planet};
use crate::error::EngineError;
use crate::forecast::{BirthProfile, BirthProfileStore, DailyForecaster, ForecastResult};
use crate::interpretation::{TransitInterpreter, TransitTemplates};
use crate::lunar::{ActionDefinition, ActionSuggestion, DayContext, LunarCatalog, LunarPlanner, MoonPhase, PhaseAdvice};
use crate::retrograde::{RetroAlertFormatter, RetroPeriod, RetrogradeGuides, RetrogradeTracker};
use crate::settings::{EngineSettings, TemplateSettings};
use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Template and catalog data shared between engines
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub transit_templates: Arc<TransitTemplates>,
    pub lunar_catalog: Arc<LunarCatalog>,
    pub retrograde_guides: Arc<RetrogradeGuides>,
}

impl ReferenceData {
    /// Data bundled with the crate
    pub fn bundled() -> Result<Self, EngineError> {
        Ok(Self {
            transit_templates: TransitTemplates::bundled()?,
            lunar_catalog: LunarCatalog::bundled()?,
            retrograde_guides: RetrogradeGuides::bundled()?,
        })
    }

    /// Bundled data with any configured file overrides applied.
    pub fn load(settings: &TemplateSettings) -> Result<Self, EngineError> {
        let transit_templates = match &settings.transit_templates {
            Some(path) => Arc::new(TransitTemplates::from_path(path)?),
            None => TransitTemplates::bundled()?,
        };
        let lunar_catalog = match &settings.lunar_catalog {
            Some(path) => Arc::new(LunarCatalog::from_path(path)?),
            None => LunarCatalog::bundled()?,
        };
        let retrograde_guides = match &settings.retrograde_guides {
            Some(path) => Arc::new(RetrogradeGuides::from_path(path)?),
            None => RetrogradeGuides::bundled()?,
        };
        Ok(Self {
            transit_templates,
            lunar_catalog,
            retrograde_guides,
        })
    }
}

pub struct Engine {
    provider: Box<dyn EphemerisProvider>,
    settings: EngineSettings,
    aspects: AspectCalculator,
    interpreter: TransitInterpreter,
    alerts: RetroAlertFormatter,
    lunar: LunarPlanner,
    day_aspects: AspectOfDayService,
}

impl Engine {
    /// Engine with reference data resolved from `settings.templates`.
    pub fn new(provider: Box<dyn EphemerisProvider>, settings: EngineSettings) -> Result<Self, EngineError> {
        settings.validate()?;
        let data = ReferenceData::load(&settings.templates)?;
        Ok(Self::with_data(provider, settings, data))
    }

    pub fn with_data(provider: Box<dyn EphemerisProvider>, settings: EngineSettings, data: ReferenceData) -> Self {
        let aspects = AspectCalculator::new(settings.aspects.orbs.clone(), settings.aspects.orb_multiplier);
        let interpreter = TransitInterpreter::new(data.transit_templates.clone());
        let lunar = LunarPlanner::new(
            data.lunar_catalog,
            data.transit_templates,
            settings.lunar.clone(),
        );
        let day_aspects = AspectOfDayService::new(interpreter.clone(), settings.aspects.orbs.clone());
        Self {
            provider,
            settings,
            aspects,
            interpreter,
            alerts: RetroAlertFormatter::new(data.retrograde_guides),
            lunar,
            day_aspects,
        }
    }

    /// Engine backed by the Swiss Ephemeris data at `settings.ephemeris.path`.
    #[cfg(feature = "swisseph")]
    pub fn swiss(settings: EngineSettings) -> Result<Self, EngineError> {
        let adapter = crate::ephemeris::SwissEphemerisAdapter::new(settings.ephemeris.path.clone())?;
        Self::new(Box::new(adapter), settings)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn provider(&self) -> &dyn EphemerisProvider {
        self.provider.as_ref()
    }

    pub fn interpreter(&self) -> &TransitInterpreter {
        &self.interpreter
    }

    pub fn chart_builder(&self) -> ChartBuilder<'_> {
        ChartBuilder::new(self.provider.as_ref(), self.settings.chart.house_system)
    }

    // Charts and aspects

    pub fn build_chart(
        &self,
        instant: NaiveDateTime,
        timezone: &str,
        lat: f64,
        lon: f64,
        kind: ChartKind,
    ) -> Result<ChartSnapshot, EngineError> {
        self.chart_builder().build_chart(instant, timezone, lat, lon, kind)
    }

    pub fn build_transit(&self, natal: &ChartSnapshot, date: NaiveDate) -> Result<ChartSnapshot, EngineError> {
        self.chart_builder().build_transit(natal, date)
    }

    pub fn find_aspects(
        &self,
        natal: &ChartSnapshot,
        transit: &ChartSnapshot,
        include: Option<&[Planet]>,
    ) -> Vec<TransitAspect> {
        self.aspects.find_aspects(natal, transit, include)
    }

    pub fn locate_house(&self, longitude: f64, houses: &BTreeMap<u8, HouseCusp>) -> Option<u8> {
        locate_house(longitude, houses)
    }

    // Retrograde periods

    pub fn retrograde_tracker(&self) -> RetrogradeTracker<'_> {
        RetrogradeTracker::new(self.provider.as_ref(), self.settings.retrograde.clone())
    }

    pub fn extract_retrograde_periods(
        &self,
        planet: Planet,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RetroPeriod>, EngineError> {
        self.retrograde_tracker().extract(planet, start, end)
    }

    /// Periods for every tracked planet
    pub fn retrograde_periods(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<Planet, Vec<RetroPeriod>>, EngineError> {
        self.retrograde_tracker().periods(start, end)
    }

    pub fn format_pre_alert(&self, period: &RetroPeriod, is_premium: bool, today: NaiveDate) -> String {
        self.alerts.format_pre_alert(period, is_premium, today)
    }

    pub fn format_start_alert(&self, period: &RetroPeriod, is_premium: bool) -> String {
        self.alerts.format_start_alert(period, is_premium)
    }

    pub fn format_summary(&self, period: &RetroPeriod, is_premium: bool, today: NaiveDate) -> String {
        self.alerts.format_summary(period, is_premium, today)
    }

    // Lunar planner

    pub fn lunar_day(
        &mut self,
        date: NaiveDate,
        timezone: &str,
        natal: Option<&ChartSnapshot>,
    ) -> Result<DayContext, EngineError> {
        self.lunar.compute(self.provider.as_ref(), date, timezone, natal)
    }

    pub fn build_lunar_window(
        &mut self,
        start: NaiveDate,
        timezone: &str,
        days: u32,
        natal: Option<&ChartSnapshot>,
    ) -> Result<Vec<DayContext>, EngineError> {
        self.lunar.build_window(self.provider.as_ref(), start, timezone, days, natal)
    }

    pub fn lunar_planner(&self) -> &LunarPlanner {
        &self.lunar
    }

    pub fn select_actions(&self, day: &DayContext, is_premium: bool, limit: usize) -> Vec<ActionSuggestion> {
        self.lunar.select_actions(day, is_premium, limit)
    }

    pub fn action(&self, slug: &str) -> Option<&ActionDefinition> {
        self.lunar.action(slug)
    }

    pub fn action_advice(&self, slug: &str, phase: MoonPhase) -> Option<&PhaseAdvice> {
        self.lunar.action_advice(slug, phase)
    }

    pub fn house_interpretation<R: Rng + ?Sized>(&self, house: u8, rng: &mut R) -> Option<(String, String)> {
        self.lunar.house_interpretation(house, rng)
    }

    // Forecasts

    fn forecaster(&self) -> DailyForecaster<'_> {
        DailyForecaster::new(self.chart_builder(), &self.aspects, self.settings.aspects.top_aspects)
    }

    pub fn generate_forecast(
        &self,
        profile: &BirthProfile,
        user_id: i64,
        target_date: Option<NaiveDate>,
    ) -> ForecastResult {
        self.forecaster().generate(profile, user_id, target_date)
    }

    pub fn generate_for_user(
        &self,
        store: &dyn BirthProfileStore,
        user_id: i64,
        target_date: Option<NaiveDate>,
    ) -> ForecastResult {
        self.forecaster().generate_for_user(store, user_id, target_date)
    }

    pub fn render_forecast<R: Rng + ?Sized>(&self, forecast: &ForecastResult, rng: &mut R) -> String {
        self.interpreter.render_forecast(forecast, rng)
    }

    // Aspect of the day

    pub fn aspects_of_day<R: Rng + ?Sized>(
        &mut self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<DayAspect>, EngineError> {
        self.day_aspects.aspects_of_day(self.provider.as_ref(), date, rng)
    }

    pub fn format_day_aspects(&self, aspects: &[DayAspect], is_premium: bool) -> String {
        format_day_aspects(aspects, is_premium)
    }
}
