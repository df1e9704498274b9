use crate::ephemeris::{EphemerisProvider, Planet};
use crate::error::EngineError;
use crate::settings::RetrogradeSettings;
use crate::timezone::{local_at_hour, resolve_utc};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A contiguous run of retrograde days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetroPeriod {
    pub planet: Planet,
    pub start: NaiveDate,
    /// `None` while the period runs past the sampled window
    pub end: Option<NaiveDate>,
    pub pre_alert: NaiveDate,
}

impl RetroPeriod {
    pub fn new(planet: Planet, start: NaiveDate, end: Option<NaiveDate>, lead_days: i64) -> Self {
        Self {
            planet,
            start,
            end,
            pre_alert: shift_days(start, -lead_days.max(0)).unwrap_or(NaiveDate::MIN),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.end {
            Some(end) => self.start <= date && date <= end,
            None => self.start <= date,
        }
    }
}

/// `date` moved by `days`, or `None` past the calendar range.
fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

fn out_of_range(date: NaiveDate, days: i64) -> EngineError {
    EngineError::InvalidDate {
        value: format!("{} {:+} days", date, days),
        message: "padded window leaves the supported calendar range".to_string(),
    }
}

/// Bounds used to decide which detected periods are relevant
#[derive(Debug, Clone, Copy)]
pub struct ExtractionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub pad_before_days: i64,
    pub pad_after_days: i64,
    pub lead_days: i64,
}

impl ExtractionWindow {
    pub fn analysis_start(&self) -> Result<NaiveDate, EngineError> {
        self.pad_before_days
            .checked_neg()
            .and_then(|days| shift_days(self.start, days))
            .ok_or_else(|| out_of_range(self.start, self.pad_before_days.saturating_neg()))
    }

    pub fn analysis_end(&self) -> Result<NaiveDate, EngineError> {
        shift_days(self.end, self.pad_after_days).ok_or_else(|| out_of_range(self.end, self.pad_after_days))
    }

    fn is_relevant(&self, period: &RetroPeriod) -> bool {
        let ends_too_early = match (period.end, self.analysis_start()) {
            (Some(end), Ok(first)) => end < first,
            _ => false,
        };
        let starts_too_late = match self.analysis_end() {
            Ok(last) => period.start > last,
            Err(_) => false,
        };
        !ends_too_early && !starts_too_late
    }
}

/// Turn a date-ordered daily retrograde series into periods.
///
/// A run already retrograde on the first sample starts there; a run still
/// retrograde on the last sample stays open.
pub fn extract_periods(
    planet: Planet,
    series: &[(NaiveDate, bool)],
    window: &ExtractionWindow,
) -> Vec<RetroPeriod> {
    let mut periods = Vec::new();
    let Some(&(first_day, first_status)) = series.first() else {
        return periods;
    };

    let mut prev_status = first_status;
    let mut prev_day = first_day;
    let mut current_start = if first_status { Some(first_day) } else { None };

    for &(day, status) in &series[1..] {
        if !prev_status && status {
            current_start = Some(day);
        } else if prev_status && !status {
            let start = current_start.take().unwrap_or(first_day);
            periods.push(RetroPeriod::new(planet, start, Some(prev_day), window.lead_days));
        }
        prev_status = status;
        prev_day = day;
    }

    if prev_status {
        if let Some(start) = current_start {
            periods.push(RetroPeriod::new(planet, start, None, window.lead_days));
        }
    }

    periods.retain(|p| window.is_relevant(p));
    periods.sort_by_key(|p| p.start);
    periods
}

/// Samples daily retrograde status and extracts periods
pub struct RetrogradeTracker<'a> {
    provider: &'a dyn EphemerisProvider,
    settings: RetrogradeSettings,
}

impl<'a> RetrogradeTracker<'a> {
    pub fn new(provider: &'a dyn EphemerisProvider, settings: RetrogradeSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &RetrogradeSettings {
        &self.settings
    }

    fn window(&self, start: NaiveDate, end: NaiveDate) -> ExtractionWindow {
        ExtractionWindow {
            start,
            end,
            pad_before_days: self.settings.pad_before_days,
            pad_after_days: self.settings.pad_after_days,
            lead_days: self.settings.lead_days,
        }
    }

    /// One sample per day over the padded window for each planet
    fn sample(
        &self,
        planets: &[Planet],
        window: &ExtractionWindow,
    ) -> Result<BTreeMap<Planet, Vec<(NaiveDate, bool)>>, EngineError> {
        let mut series: BTreeMap<Planet, Vec<(NaiveDate, bool)>> =
            planets.iter().map(|p| (*p, Vec::new())).collect();

        let mut day = window.analysis_start()?;
        let last = window.analysis_end()?;
        while day <= last {
            let instant = resolve_utc(
                local_at_hour(day, self.settings.sample_hour),
                &self.settings.sample_timezone,
            );
            let positions = self.provider.planet_positions(instant, planets)?;
            for planet in planets {
                let retrograde = match positions.get(planet) {
                    Some(pos) => pos.retrograde,
                    None => {
                        return Err(EngineError::EphemerisFailure {
                            message: format!("no position for {} on {}", planet, day),
                        })
                    }
                };
                if let Some(values) = series.get_mut(planet) {
                    values.push((day, retrograde));
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(series)
    }

    /// Retrograde periods of one planet relevant to `[start, end]`.
    pub fn extract(
        &self,
        planet: Planet,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RetroPeriod>, EngineError> {
        let mut all = self.extract_many(&[planet], start, end)?;
        Ok(all.remove(&planet).unwrap_or_default())
    }

    /// Periods for every tracked planet, from a single sampling pass.
    pub fn periods(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<Planet, Vec<RetroPeriod>>, EngineError> {
        let planets = self.settings.tracked_planets.clone();
        self.extract_many(&planets, start, end)
    }

    fn extract_many(
        &self,
        planets: &[Planet],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<Planet, Vec<RetroPeriod>>, EngineError> {
        if end < start {
            return Err(EngineError::InvalidDate {
                value: format!("{}..{}", start, end),
                message: "range end precedes start".to_string(),
            });
        }
        let window = self.window(start, end);
        log::debug!(
            "Sampling retrograde status for {:?} from {} to {} (padding {}/{} days)",
            planets,
            start,
            end,
            window.pad_before_days,
            window.pad_after_days
        );
        let series = self.sample(planets, &window)?;
        Ok(series
            .into_iter()
            .map(|(planet, values)| (planet, extract_periods(planet, &values, &window)))
            .collect())
    }

    /// Planets whose alerts a user receives
    pub fn planets_for(&self, is_premium: bool) -> &[Planet] {
        if is_premium {
            &self.settings.tracked_planets
        } else {
            &self.settings.free_planets
        }
    }
}

/// The current or soonest upcoming period as of `reference`.
pub fn next_period(periods: &[RetroPeriod], reference: NaiveDate) -> Option<&RetroPeriod> {
    periods
        .iter()
        .filter(|p| p.start >= reference || p.contains(reference))
        .min_by_key(|p| p.start)
}
