#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use selene::chart::{ChartKind, ChartSnapshot, HouseCusp};
use selene::ephemeris::{
    CuspId, EphemerisError, EphemerisProvider, GeoLocation, HouseSystem, Planet, PlanetPosition, RawCusp,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type PositionScript = Box<dyn Fn(DateTime<Utc>, Planet) -> Option<(f64, f64)> + Send + Sync>;

/// In-memory provider whose positions are a function of the instant.
pub struct ScriptedProvider {
    script: PositionScript,
    cusps: Option<Vec<RawCusp>>,
    fail_planets: bool,
    planet_calls: Arc<AtomicUsize>,
    house_calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(DateTime<Utc>, Planet) -> Option<(f64, f64)> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            cusps: None,
            fail_planets: false,
            planet_calls: Arc::new(AtomicUsize::new(0)),
            house_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Same `(lon, speed)` for each listed planet at every instant
    pub fn fixed(positions: &[(Planet, f64, f64)]) -> Self {
        let table: HashMap<Planet, (f64, f64)> =
            positions.iter().map(|(p, lon, speed)| (*p, (*lon, *speed))).collect();
        Self::new(move |_, planet| table.get(&planet).copied())
    }

    /// A provider that fails every planet request
    pub fn failing() -> Self {
        let mut provider = Self::fixed(&[]);
        provider.fail_planets = true;
        provider
    }

    pub fn with_cusps(mut self, cusps: Vec<RawCusp>) -> Self {
        self.cusps = Some(cusps);
        self
    }

    /// Equal 30° houses starting at `first`
    pub fn with_equal_houses(self, first: f64) -> Self {
        let cusps = (1..=12)
            .map(|i| RawCusp {
                id: CuspId::Index(i),
                lon: (first + (i - 1) as f64 * 30.0).rem_euclid(360.0),
            })
            .collect();
        self.with_cusps(cusps)
    }

    pub fn planet_calls(&self) -> Arc<AtomicUsize> {
        self.planet_calls.clone()
    }

    pub fn house_calls(&self) -> Arc<AtomicUsize> {
        self.house_calls.clone()
    }
}

impl EphemerisProvider for ScriptedProvider {
    fn planet_positions(
        &self,
        instant: DateTime<Utc>,
        planets: &[Planet],
    ) -> Result<HashMap<Planet, PlanetPosition>, EphemerisError> {
        self.planet_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_planets {
            return Err(EphemerisError::Unavailable("scripted failure".to_string()));
        }
        Ok(planets
            .iter()
            .filter_map(|planet| {
                (self.script)(instant, *planet)
                    .map(|(lon, speed)| (*planet, PlanetPosition::new(*planet, lon, 0.0, speed)))
            })
            .collect())
    }

    fn house_cusps(
        &self,
        _instant: DateTime<Utc>,
        _location: GeoLocation,
        _system: HouseSystem,
    ) -> Result<Vec<RawCusp>, EphemerisError> {
        self.house_calls.fetch_add(1, Ordering::SeqCst);
        self.cusps.clone().ok_or_else(|| EphemerisError::HouseCalculationFailed {
            message: "no cusps scripted".to_string(),
        })
    }
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
}

/// Cusp map with the given longitudes for houses 1..=12
pub fn houses(lons: [f64; 12]) -> BTreeMap<u8, HouseCusp> {
    lons.iter()
        .enumerate()
        .map(|(i, lon)| {
            let house = i as u8 + 1;
            (house, HouseCusp { house, lon: *lon })
        })
        .collect()
}

pub fn equal_houses(first: f64) -> BTreeMap<u8, HouseCusp> {
    let mut lons = [0.0; 12];
    for (i, lon) in lons.iter_mut().enumerate() {
        *lon = (first + i as f64 * 30.0).rem_euclid(360.0);
    }
    houses(lons)
}

/// Snapshot holding the given `(planet, lon, speed)` objects
pub fn snapshot(kind: ChartKind, objects: &[(Planet, f64, f64)], houses: BTreeMap<u8, HouseCusp>) -> ChartSnapshot {
    ChartSnapshot {
        timestamp: noon(2024, 1, 1),
        kind,
        location: GeoLocation { lat: 55.75, lon: 37.62 },
        timezone: "Europe/Moscow".to_string(),
        objects: objects
            .iter()
            .map(|(p, lon, speed)| (*p, PlanetPosition::new(*p, *lon, 0.0, *speed)))
            .collect(),
        houses,
    }
}
