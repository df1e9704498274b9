use crate::aspects::{AspectCalculator, TransitAspect};
use crate::chart::{ChartBuilder, ChartKind, ChartSnapshot};
use crate::error::EngineError;
use crate::forecast::profile::{parse_birth_datetime, BirthProfile, BirthProfileStore};
use crate::timezone::today_in;
use chrono::NaiveDate;
use serde::Serialize;

/// Outcome of a daily forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub user_id: i64,
    pub target_date: NaiveDate,
    pub natal_chart: Option<ChartSnapshot>,
    pub transit_chart: Option<ChartSnapshot>,
    pub aspects: Vec<TransitAspect>,
    pub missing_fields: Vec<String>,
    /// Set when the charts could not be cast despite complete data
    #[serde(skip)]
    pub error: Option<EngineError>,
}

impl ForecastResult {
    pub fn ok(&self) -> bool {
        self.missing_fields.is_empty() && self.natal_chart.is_some() && self.transit_chart.is_some()
    }

    fn incomplete(user_id: i64, target_date: NaiveDate, missing_fields: Vec<String>) -> Self {
        Self {
            user_id,
            target_date,
            natal_chart: None,
            transit_chart: None,
            aspects: Vec::new(),
            missing_fields,
            error: None,
        }
    }

    fn failed(user_id: i64, target_date: NaiveDate, error: EngineError) -> Self {
        Self {
            error: Some(error),
            ..Self::incomplete(user_id, target_date, Vec::new())
        }
    }
}

/// Ties chart casting and aspect search into one per-user forecast
pub struct DailyForecaster<'a> {
    charts: ChartBuilder<'a>,
    aspects: &'a AspectCalculator,
    top_aspects: usize,
}

impl<'a> DailyForecaster<'a> {
    pub fn new(charts: ChartBuilder<'a>, aspects: &'a AspectCalculator, top_aspects: usize) -> Self {
        Self {
            charts,
            aspects,
            top_aspects,
        }
    }

    /// Forecast for a stored profile; a missing profile is reported as the
    /// missing field `profile`.
    pub fn generate_for_user(
        &self,
        store: &dyn BirthProfileStore,
        user_id: i64,
        target_date: Option<NaiveDate>,
    ) -> ForecastResult {
        match store.profile(user_id) {
            Some(profile) => self.generate(&profile, user_id, target_date),
            None => ForecastResult::incomplete(
                user_id,
                target_date.unwrap_or_else(|| today_in("UTC")),
                vec!["profile".to_string()],
            ),
        }
    }

    /// Forecast for `target_date` (today in the profile's zone by default).
    ///
    /// Incomplete profiles short-circuit before the ephemeris is consulted.
    pub fn generate(
        &self,
        profile: &BirthProfile,
        user_id: i64,
        target_date: Option<NaiveDate>,
    ) -> ForecastResult {
        let timezone = profile.timezone.clone().unwrap_or_else(|| "UTC".to_string());
        let target_date = target_date.unwrap_or_else(|| today_in(&timezone));

        let missing = profile.missing_fields();
        let (true, Some(birth_date), Some(lat), Some(lon)) = (
            missing.is_empty(),
            profile.birth_date.as_deref(),
            profile.lat,
            profile.lon,
        ) else {
            log::debug!("Forecast for user {} missing {:?}", user_id, missing);
            return ForecastResult::incomplete(user_id, target_date, missing);
        };

        let birth = match parse_birth_datetime(birth_date, profile.birth_time.as_deref()) {
            Ok(birth) => birth,
            Err(e) => {
                log::warn!("Unparseable birth data for user {}: {}", user_id, e);
                return ForecastResult::incomplete(user_id, target_date, vec!["birth_date".to_string()]);
            }
        };

        let natal = match self.charts.build_chart(birth, &timezone, lat, lon, ChartKind::Natal) {
            Ok(chart) => chart,
            Err(e) => {
                log::warn!("Natal chart failed for user {}: {}", user_id, e);
                return ForecastResult::failed(user_id, target_date, e);
            }
        };
        let transit = match self.charts.build_transit(&natal, target_date) {
            Ok(chart) => chart,
            Err(e) => {
                log::warn!("Transit chart failed for user {} on {}: {}", user_id, target_date, e);
                return ForecastResult::failed(user_id, target_date, e);
            }
        };

        let mut aspects = self.aspects.find_aspects(&natal, &transit, None);
        if self.top_aspects > 0 {
            aspects.truncate(self.top_aspects);
        }

        ForecastResult {
            user_id,
            target_date,
            natal_chart: Some(natal),
            transit_chart: Some(transit),
            aspects,
            missing_fields: Vec::new(),
            error: None,
        }
    }
}
