use crate::aspects::types::{AspectKind, AspectTable, TransitAspect};
use crate::chart::{locate_house, ChartSnapshot};
use crate::ephemeris::{Planet, PlanetPosition};
use std::cmp::Ordering;

/// Orbs at or below this are reported as exact
pub const EXACT_ORB: f64 = 0.1;

/// Minimum share of the weight kept however wide the orb
const MIN_ORB_FACTOR: f64 = 0.1;

/// Smallest separation between two longitudes, in [0, 180].
pub fn angular_distance(lon1: f64, lon2: f64) -> f64 {
    let diff = (lon1 - lon2).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Aspect score from planet importance, aspect bonus and orb tightness.
pub fn aspect_weight(first: Planet, second: Planet, kind: AspectKind, orb: f64, base_orb: f64) -> f64 {
    let base = first.importance() + second.importance();
    let orb_factor = (1.0 - orb / base_orb.max(1.0)).max(MIN_ORB_FACTOR);
    base * kind.bonus() * orb_factor
}

/// Whether the moving body is closing in on the exact aspect angle.
///
/// The signed offset from the exact angle is measured on the transit body's
/// side; a positive offset closes when it moves backwards.
pub fn is_applying(moving: &PlanetPosition, fixed: &PlanetPosition, aspect_angle: f64) -> bool {
    let relative = (moving.lon - fixed.lon).rem_euclid(360.0);
    let mut offset = relative - aspect_angle;
    if offset > 180.0 {
        offset -= 360.0;
    }
    if offset < -180.0 {
        offset += 360.0;
    }
    if offset > 0.0 {
        moving.speed_lon < 0.0
    } else {
        moving.speed_lon > 0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Finds aspects between transiting and natal positions
pub struct AspectCalculator {
    table: AspectTable,
    orb_multiplier: f64,
}

impl AspectCalculator {
    pub fn new(table: AspectTable, orb_multiplier: f64) -> Self {
        Self {
            table,
            orb_multiplier,
        }
    }

    pub fn table(&self) -> &AspectTable {
        &self.table
    }

    /// All aspects matching the separation of two longitudes, as
    /// `(kind, orb, base_orb)`.
    pub fn matching_aspects(&self, lon1: f64, lon2: f64) -> Vec<(AspectKind, f64, f64)> {
        let distance = angular_distance(lon1, lon2);
        self.table
            .iter()
            .filter_map(|(kind, base_orb)| {
                let orb = (kind.angle() - distance).abs();
                if orb <= base_orb * self.orb_multiplier {
                    Some((kind, orb, base_orb))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Aspects from every transit body to every natal body, strongest first.
    ///
    /// `include` restricts the transiting bodies considered.
    pub fn find_aspects(
        &self,
        natal: &ChartSnapshot,
        transit: &ChartSnapshot,
        include: Option<&[Planet]>,
    ) -> Vec<TransitAspect> {
        let mut results = Vec::new();

        for (transit_planet, transit_pos) in &transit.objects {
            if let Some(filter) = include {
                if !filter.contains(transit_planet) {
                    continue;
                }
            }
            let transit_house = locate_house(transit_pos.lon, &natal.houses);

            for (natal_planet, natal_pos) in &natal.objects {
                for (kind, orb, base_orb) in self.matching_aspects(transit_pos.lon, natal_pos.lon) {
                    results.push(TransitAspect {
                        transit_planet: *transit_planet,
                        natal_planet: *natal_planet,
                        aspect: kind,
                        orb: round2(orb),
                        exact: orb <= EXACT_ORB,
                        applying: is_applying(transit_pos, natal_pos, kind.angle()),
                        weight: aspect_weight(*transit_planet, *natal_planet, kind, orb, base_orb),
                        transit_house,
                        natal_house: locate_house(natal_pos.lon, &natal.houses),
                        transit_position: transit_pos.clone(),
                        natal_position: natal_pos.clone(),
                    });
                }
            }
        }

        sort_by_strength(&mut results);
        results
    }
}

impl Default for AspectCalculator {
    fn default() -> Self {
        Self::new(AspectTable::default(), 1.0)
    }
}

/// Sort by weight descending, tighter orb first on ties.
pub fn sort_by_strength(aspects: &mut [TransitAspect]) {
    aspects.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then(a.orb.partial_cmp(&b.orb).unwrap_or(Ordering::Equal))
    });
}
