use crate::ephemeris::{GeoLocation, Planet, PlanetPosition};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Natal,
    Transit,
}

/// Start of a house sector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    /// House index 1..=12
    pub house: u8,
    /// Cusp longitude in degrees (0-360)
    pub lon: f64,
}

/// Positions and houses for one instant and place.
///
/// `houses` is either empty (house enrichment unavailable) or holds all 12.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    /// Local wall-clock time the chart was cast for
    pub timestamp: NaiveDateTime,
    pub kind: ChartKind,
    pub location: GeoLocation,
    pub timezone: String,
    pub objects: BTreeMap<Planet, PlanetPosition>,
    pub houses: BTreeMap<u8, HouseCusp>,
}

impl ChartSnapshot {
    pub fn position(&self, planet: Planet) -> Option<&PlanetPosition> {
        self.objects.get(&planet)
    }

    pub fn has_houses(&self) -> bool {
        !self.houses.is_empty()
    }
}
