use crate::chart::houses::normalize_cusps;
use crate::chart::types::{ChartKind, ChartSnapshot};
use crate::ephemeris::{EphemerisProvider, GeoLocation, HouseSystem, Planet};
use crate::error::EngineError;
use crate::timezone::{local_at_hour, resolve_utc};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Hour of the local day used for transit and lunar charts
pub const REFERENCE_HOUR: u32 = 12;

/// Casts natal and transit snapshots through an ephemeris provider.
pub struct ChartBuilder<'a> {
    provider: &'a dyn EphemerisProvider,
    house_system: HouseSystem,
    planets: Vec<Planet>,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(provider: &'a dyn EphemerisProvider, house_system: HouseSystem) -> Self {
        Self {
            provider,
            house_system,
            planets: Planet::ALL.to_vec(),
        }
    }

    /// Restrict the tracked objects
    pub fn with_planets(mut self, planets: &[Planet]) -> Self {
        self.planets = planets.to_vec();
        self
    }

    /// Cast a chart for a local wall-clock instant.
    ///
    /// Unknown timezones are treated as UTC. If the provider cannot compute
    /// cusps for the location the snapshot has no houses.
    pub fn build_chart(
        &self,
        instant: NaiveDateTime,
        timezone: &str,
        lat: f64,
        lon: f64,
        kind: ChartKind,
    ) -> Result<ChartSnapshot, EngineError> {
        let utc = resolve_utc(instant, timezone);
        let location = GeoLocation { lat, lon };

        let objects: BTreeMap<_, _> = self
            .provider
            .planet_positions(utc, &self.planets)?
            .into_iter()
            .collect();

        let houses = match self.provider.house_cusps(utc, location, self.house_system) {
            Ok(raw) => normalize_cusps(&raw),
            Err(e) => {
                log::warn!(
                    "House enrichment unavailable for {:?} chart at ({}, {}): {}",
                    kind,
                    lat,
                    lon,
                    e
                );
                BTreeMap::new()
            }
        };

        Ok(ChartSnapshot {
            timestamp: instant,
            kind,
            location,
            timezone: timezone.to_string(),
            objects,
            houses,
        })
    }

    /// Cast a transit chart at local noon of `date`, reusing the natal
    /// chart's location and timezone.
    pub fn build_transit(
        &self,
        natal: &ChartSnapshot,
        date: NaiveDate,
    ) -> Result<ChartSnapshot, EngineError> {
        self.build_chart(
            local_at_hour(date, REFERENCE_HOUR),
            &natal.timezone,
            natal.location.lat,
            natal.location.lon,
            ChartKind::Transit,
        )
    }
}
