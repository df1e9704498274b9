use crate::ephemeris::types::{
    CuspId, EphemerisError, EphemerisProvider, GeoLocation, HouseSystem, Planet, PlanetPosition,
    RawCusp,
};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use swisseph::swe::{calc_ut, houses_ex, julday, revjul, set_ephe_path};

/// Polar circle latitude; quadrant house systems are undefined beyond it.
const POLAR_LATITUDE: f64 = 66.56;

// FLG_SWIEPH | FLG_SPEED
const CALC_FLAGS: i32 = 2 | 256;

/// Swiss Ephemeris body codes
fn planet_code(planet: Planet) -> u32 {
    match planet {
        Planet::Sun => 0,
        Planet::Moon => 1,
        Planet::Mercury => 2,
        Planet::Venus => 3,
        Planet::Mars => 4,
        Planet::Jupiter => 5,
        Planet::Saturn => 6,
        Planet::Uranus => 7,
        Planet::Neptune => 8,
        Planet::Pluto => 9,
    }
}

/// Swiss Ephemeris adapter implementation
pub struct SwissEphemerisAdapter {
    ephemeris_path: PathBuf,
}

impl SwissEphemerisAdapter {
    /// Create a new adapter with optional ephemeris path
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/usr/local/share/swisseph"))
        });

        if !path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }

        // Process-wide setting inside the library; calc_ut reads from here.
        set_ephe_path(&path.to_string_lossy());
        log::debug!("Swiss Ephemeris data at {}", path.display());
        Ok(Self {
            ephemeris_path: path,
        })
    }

    pub fn ephemeris_path(&self) -> &PathBuf {
        &self.ephemeris_path
    }

    /// Calculate position for a single planet
    fn calc_planet_position(&self, planet: Planet, jd: f64) -> Result<PlanetPosition, EphemerisError> {
        let result = calc_ut(jd, planet_code(planet), CALC_FLAGS as u32).map_err(|e| {
            EphemerisError::CalculationFailed {
                planet,
                datetime: julian_day_to_datetime(jd),
                message: format!("Swiss Ephemeris error: {}", e),
            }
        })?;

        let out = result.out;
        Ok(PlanetPosition::new(planet, out[0], out[1], out[3]))
    }
}

impl EphemerisProvider for SwissEphemerisAdapter {
    fn planet_positions(
        &self,
        instant: DateTime<Utc>,
        planets: &[Planet],
    ) -> Result<HashMap<Planet, PlanetPosition>, EphemerisError> {
        let jd = datetime_to_julian_day(instant);
        let mut positions = HashMap::with_capacity(planets.len());
        for &planet in planets {
            positions.insert(planet, self.calc_planet_position(planet, jd)?);
        }
        Ok(positions)
    }

    fn house_cusps(
        &self,
        instant: DateTime<Utc>,
        location: GeoLocation,
        system: HouseSystem,
    ) -> Result<Vec<RawCusp>, EphemerisError> {
        if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lon) {
            return Err(EphemerisError::HouseCalculationFailed {
                message: format!("coordinates out of range: {}, {}", location.lat, location.lon),
            });
        }
        if system.fails_near_poles() && location.lat.abs() >= POLAR_LATITUDE {
            return Err(EphemerisError::HouseCalculationFailed {
                message: format!("{:?} houses are undefined at latitude {}", system, location.lat),
            });
        }

        let jd = datetime_to_julian_day(instant);
        let (c, _a) = houses_ex(jd, CALC_FLAGS, location.lat, location.lon, system.code() as i32);

        use swisseph::Cusp;
        let cusps = Cusp::from_array(c);
        let values = [
            cusps.first, cusps.second, cusps.third, cusps.fourth,
            cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
            cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
        ];

        if values.iter().all(|v| *v == 0.0) {
            return Err(EphemerisError::HouseCalculationFailed {
                message: "Swiss Ephemeris returned no cusps".to_string(),
            });
        }

        Ok(values
            .iter()
            .enumerate()
            .map(|(i, &lon)| RawCusp {
                id: CuspId::Index(i as i64 + 1),
                lon: lon.rem_euclid(360.0),
            })
            .collect())
    }
}

/// Convert UTC datetime to Julian Day
fn datetime_to_julian_day(dt: DateTime<Utc>) -> f64 {
    let hour_decimal =
        dt.hour() as f64 + dt.minute() as f64 / 60.0 + dt.second() as f64 / 3600.0;
    // GREG_CAL = 1
    julday(dt.year(), dt.month() as i32, dt.day() as i32, hour_decimal, 1)
}

/// Convert Julian Day to UTC datetime
fn julian_day_to_datetime(jd: f64) -> DateTime<Utc> {
    let (year, month, day, hour_decimal) = revjul(jd, 1);
    let hour = hour_decimal as u32;
    let minute = ((hour_decimal - hour as f64) * 60.0) as u32;
    let second = (((hour_decimal - hour as f64) * 60.0 - minute as f64) * 60.0) as u32;
    Utc.with_ymd_and_hms(year, month as u32, day as u32, hour, minute, second)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
