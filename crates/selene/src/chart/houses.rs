//! House sector lookup and cusp normalization.

use crate::chart::types::HouseCusp;
use crate::ephemeris::{CuspId, RawCusp};
use std::collections::BTreeMap;

/// Map a longitude to the house containing it.
///
/// Each house spans `[cusp_i, cusp_{i+1})` on the circle, house 12 wrapping
/// back to house 1. A longitude sitting exactly on a cusp belongs to the
/// house that starts there. When no sector matches (cusps that are not
/// monotonic around the circle) the last house is returned.
pub fn locate_house(longitude: f64, houses: &BTreeMap<u8, HouseCusp>) -> Option<u8> {
    if houses.is_empty() {
        return None;
    }
    let longitude = longitude.rem_euclid(360.0);
    // BTreeMap iterates in house order
    let cusps: Vec<&HouseCusp> = houses.values().collect();
    let count = cusps.len();

    for (idx, cusp) in cusps.iter().enumerate() {
        let start = cusp.lon.rem_euclid(360.0);
        let end = cusps[(idx + 1) % count].lon.rem_euclid(360.0);

        let inside = if start <= end {
            start <= longitude && longitude < end
        } else {
            longitude >= start || longitude < end
        };
        if inside {
            return Some(cusp.house);
        }
    }
    cusps.last().map(|c| c.house)
}

/// Parse a provider house id into an index.
///
/// Accepts integers and labels such as "7", "H7", "h7" or "House7".
pub fn normalize_house_id(id: &CuspId) -> Option<u8> {
    let value = match id {
        CuspId::Index(n) => *n,
        CuspId::Label(label) => {
            let digits = label
                .trim()
                .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '_');
            digits.parse::<i64>().ok()?
        }
    };
    if (1..=12).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

/// Normalize raw provider cusps into a complete 12-house map.
///
/// Returns an empty map when the provider did not supply all twelve houses.
pub fn normalize_cusps(raw: &[RawCusp]) -> BTreeMap<u8, HouseCusp> {
    let mut houses = BTreeMap::new();
    for cusp in raw {
        match normalize_house_id(&cusp.id) {
            Some(house) => {
                houses.insert(
                    house,
                    HouseCusp {
                        house,
                        lon: cusp.lon.rem_euclid(360.0),
                    },
                );
            }
            None => log::debug!("Skipping unrecognised house id {:?}", cusp.id),
        }
    }
    if houses.len() != 12 {
        if !houses.is_empty() {
            log::warn!("Incomplete house set ({} of 12); dropping houses", houses.len());
        }
        houses.clear();
    }
    houses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_houses(start: f64) -> BTreeMap<u8, HouseCusp> {
        (1..=12u8)
            .map(|h| {
                (
                    h,
                    HouseCusp {
                        house: h,
                        lon: (start + (h as f64 - 1.0) * 30.0) % 360.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_houses() {
        assert_eq!(locate_house(10.0, &BTreeMap::new()), None);
    }

    #[test]
    fn test_cusp_belongs_to_starting_house() {
        let houses = equal_houses(0.0);
        assert_eq!(locate_house(30.0, &houses), Some(2));
        assert_eq!(locate_house(29.999, &houses), Some(1));
        assert_eq!(locate_house(0.0, &houses), Some(1));
    }

    #[test]
    fn test_wrap_through_zero() {
        let houses = equal_houses(345.0);
        // House 1 spans 345..15
        assert_eq!(locate_house(350.0, &houses), Some(1));
        assert_eq!(locate_house(5.0, &houses), Some(1));
        assert_eq!(locate_house(15.0, &houses), Some(2));
        // House 12 spans 315..345
        assert_eq!(locate_house(344.0, &houses), Some(12));
    }

    #[test]
    fn test_longitude_is_normalized() {
        let houses = equal_houses(0.0);
        assert_eq!(locate_house(-10.0, &houses), Some(12));
        assert_eq!(locate_house(365.0, &houses), Some(1));
    }

    #[test]
    fn test_normalize_house_id_variants() {
        assert_eq!(normalize_house_id(&CuspId::Index(7)), Some(7));
        assert_eq!(normalize_house_id(&CuspId::Label("H7".into())), Some(7));
        assert_eq!(normalize_house_id(&CuspId::Label("house12".into())), Some(12));
        assert_eq!(normalize_house_id(&CuspId::Label("Asc".into())), None);
        assert_eq!(normalize_house_id(&CuspId::Index(0)), None);
        assert_eq!(normalize_house_id(&CuspId::Index(13)), None);
    }

    #[test]
    fn test_partial_cusp_set_is_dropped() {
        let raw: Vec<RawCusp> = (1..=11)
            .map(|h| RawCusp {
                id: CuspId::Index(h),
                lon: h as f64 * 30.0,
            })
            .collect();
        assert!(normalize_cusps(&raw).is_empty());
    }
}
