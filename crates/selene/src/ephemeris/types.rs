use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised at the ephemeris provider boundary
#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Failed to calculate position for {planet} at {datetime}: {message}")]
    CalculationFailed {
        planet: Planet,
        datetime: DateTime<Utc>,
        message: String,
    },
    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },
    #[error("Ephemeris provider unavailable: {0}")]
    Unavailable(String),
}

/// Tracked celestial objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    pub const ALL: [Planet; 10] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Planet::Sun => "sun",
            Planet::Moon => "moon",
            Planet::Mercury => "mercury",
            Planet::Venus => "venus",
            Planet::Mars => "mars",
            Planet::Jupiter => "jupiter",
            Planet::Saturn => "saturn",
            Planet::Uranus => "uranus",
            Planet::Neptune => "neptune",
            Planet::Pluto => "pluto",
        }
    }

    /// Relative importance used when scoring aspects
    pub fn importance(&self) -> f64 {
        match self {
            Planet::Sun | Planet::Moon => 1.0,
            Planet::Mars => 0.9,
            Planet::Mercury | Planet::Venus => 0.8,
            Planet::Jupiter | Planet::Saturn => 0.7,
            Planet::Uranus | Planet::Neptune | Planet::Pluto => 0.6,
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Planet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Planet::ALL
            .iter()
            .copied()
            .find(|p| p.id() == lower)
            .ok_or_else(|| format!("Unknown planet: {}", s))
    }
}

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Planetary position data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub planet: Planet,
    /// Longitude in degrees (0-360)
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Speed in longitude (degrees per day)
    pub speed_lon: f64,
    /// Whether the planet is retrograde
    pub retrograde: bool,
}

impl PlanetPosition {
    /// Build a position, deriving the retrograde flag from the speed sign.
    pub fn new(planet: Planet, lon: f64, lat: f64, speed_lon: f64) -> Self {
        Self {
            planet,
            lon: lon.rem_euclid(360.0),
            lat,
            speed_lon,
            retrograde: speed_lon < 0.0,
        }
    }
}

/// Supported house systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    Placidus,
    Koch,
    WholeSign,
    Equal,
    Regiomontanus,
    Campanus,
}

impl HouseSystem {
    /// Swiss Ephemeris house system letter
    pub fn code(&self) -> u8 {
        match self {
            HouseSystem::Placidus => b'P',
            HouseSystem::Koch => b'K',
            HouseSystem::WholeSign => b'W',
            HouseSystem::Equal => b'E',
            HouseSystem::Regiomontanus => b'R',
            HouseSystem::Campanus => b'C',
        }
    }

    /// Quadrant systems that break down inside the polar circles
    pub fn fails_near_poles(&self) -> bool {
        matches!(self, HouseSystem::Placidus | HouseSystem::Koch)
    }
}

impl Default for HouseSystem {
    fn default() -> Self {
        HouseSystem::Placidus
    }
}

/// House identifier as reported by a provider.
///
/// Some providers number houses, others label them ("H1", "House7").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuspId {
    Index(i64),
    Label(String),
}

/// A cusp before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawCusp {
    pub id: CuspId,
    pub lon: f64,
}

/// Source of truth for celestial positions.
pub trait EphemerisProvider {
    /// Geocentric positions of the requested planets at a UTC instant.
    fn planet_positions(
        &self,
        instant: DateTime<Utc>,
        planets: &[Planet],
    ) -> Result<HashMap<Planet, PlanetPosition>, EphemerisError>;

    /// House cusps for a location under the given house system.
    fn house_cusps(
        &self,
        instant: DateTime<Utc>,
        location: GeoLocation,
        system: HouseSystem,
    ) -> Result<Vec<RawCusp>, EphemerisError>;
}

impl<T: EphemerisProvider + ?Sized> EphemerisProvider for &T {
    fn planet_positions(
        &self,
        instant: DateTime<Utc>,
        planets: &[Planet],
    ) -> Result<HashMap<Planet, PlanetPosition>, EphemerisError> {
        (**self).planet_positions(instant, planets)
    }

    fn house_cusps(
        &self,
        instant: DateTime<Utc>,
        location: GeoLocation,
        system: HouseSystem,
    ) -> Result<Vec<RawCusp>, EphemerisError> {
        (**self).house_cusps(instant, location, system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_from_str_is_case_insensitive() {
        assert_eq!("Mercury".parse::<Planet>(), Ok(Planet::Mercury));
        assert_eq!(" pluto ".parse::<Planet>(), Ok(Planet::Pluto));
        assert!("vulcan".parse::<Planet>().is_err());
    }

    #[test]
    fn test_position_normalizes_longitude() {
        let pos = PlanetPosition::new(Planet::Mars, -10.0, 0.0, -0.2);
        assert!((pos.lon - 350.0).abs() < 1e-9);
        assert!(pos.retrograde);
    }
}
