use crate::ephemeris::{Planet, PlanetPosition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Major aspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Opposition => "opposition",
        }
    }

    /// Exact angle for this aspect
    pub fn angle(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }

    /// Weight multiplier; hard aspects and conjunctions count most
    pub fn bonus(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 1.2,
            AspectKind::Square | AspectKind::Opposition => 1.1,
            AspectKind::Trine => 0.9,
            AspectKind::Sextile => 0.8,
        }
    }

    pub fn default_orb(&self) -> f64 {
        match self {
            AspectKind::Conjunction | AspectKind::Opposition => 6.0,
            AspectKind::Square | AspectKind::Trine => 5.0,
            AspectKind::Sextile => 4.0,
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AspectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        AspectKind::ALL
            .iter()
            .copied()
            .find(|a| a.id() == lower)
            .ok_or_else(|| format!("Unknown aspect: {}", s))
    }
}

/// Base orbs per aspect kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectTable {
    pub orbs: BTreeMap<AspectKind, f64>,
}

impl AspectTable {
    pub fn new(orbs: BTreeMap<AspectKind, f64>) -> Self {
        Self { orbs }
    }

    pub fn base_orb(&self, kind: AspectKind) -> Option<f64> {
        self.orbs.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AspectKind, f64)> + '_ {
        self.orbs.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for AspectTable {
    fn default() -> Self {
        Self {
            orbs: AspectKind::ALL.iter().map(|k| (*k, k.default_orb())).collect(),
        }
    }
}

/// An aspect between a transiting body and a natal body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitAspect {
    pub transit_planet: Planet,
    pub natal_planet: Planet,
    pub aspect: AspectKind,
    /// Deviation from the exact angle, rounded to 0.01°
    pub orb: f64,
    /// Within 0.1° of exact
    pub exact: bool,
    /// Orb is currently shrinking
    pub applying: bool,
    pub weight: f64,
    pub transit_house: Option<u8>,
    pub natal_house: Option<u8>,
    pub transit_position: PlanetPosition,
    pub natal_position: PlanetPosition,
}
