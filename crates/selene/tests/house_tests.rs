mod common;

use common::{count, equal_houses, houses, noon, ScriptedProvider};
use selene::chart::{locate_house, ChartBuilder, ChartKind};
use selene::ephemeris::{CuspId, HouseSystem, Planet, RawCusp};
use std::collections::BTreeMap;

#[test]
fn test_longitude_on_cusp_belongs_to_starting_house() {
    let cusps = equal_houses(15.0);
    for house in 1..=12u8 {
        let lon = cusps[&house].lon;
        assert_eq!(locate_house(lon, &cusps), Some(house), "cusp {}", lon);
    }
}

#[test]
fn test_wrapping_sector_through_aries_point() {
    // House 12 spans 345°..15°
    let cusps = equal_houses(15.0);
    assert_eq!(locate_house(350.0, &cusps), Some(12));
    assert_eq!(locate_house(0.0, &cusps), Some(12));
    assert_eq!(locate_house(14.999, &cusps), Some(12));
    assert_eq!(locate_house(-5.0, &cusps), Some(12));
    assert_eq!(locate_house(375.0, &cusps), Some(1));
}

#[test]
fn test_unequal_cusps() {
    let cusps = houses([
        100.0, 125.0, 152.0, 185.0, 220.0, 250.0, 280.0, 305.0, 332.0, 5.0, 40.0, 70.0,
    ]);
    assert_eq!(locate_house(110.0, &cusps), Some(1));
    assert_eq!(locate_house(0.0, &cusps), Some(9));
    assert_eq!(locate_house(5.0, &cusps), Some(10));
    assert_eq!(locate_house(99.0, &cusps), Some(12));
}

#[test]
fn test_empty_houses() {
    assert_eq!(locate_house(42.0, &BTreeMap::new()), None);
}

#[test]
fn test_non_monotonic_cusps_fall_back_to_last_house() {
    // Every sector is empty: each cusp equals the next one.
    let degenerate = houses([50.0; 12]);
    assert_eq!(locate_house(10.0, &degenerate), Some(12));

    // Houses 3 and 4 swapped: house 3 wraps 90°..60° and overlaps its
    // neighbours, so the first matching sector in house order wins.
    let swapped = houses([
        0.0, 30.0, 90.0, 60.0, 120.0, 150.0, 180.0, 210.0, 240.0, 270.0, 300.0, 330.0,
    ]);
    assert_eq!(locate_house(45.0, &swapped), Some(2));
    assert_eq!(locate_house(75.0, &swapped), Some(2));
    assert_eq!(locate_house(100.0, &swapped), Some(3));
    assert_eq!(locate_house(200.0, &swapped), Some(3));
}

#[test]
fn test_builder_normalizes_labelled_cusps() {
    let cusps = (1..=12)
        .map(|i| RawCusp {
            id: CuspId::Label(format!("H{}", i)),
            lon: (i - 1) as f64 * 30.0,
        })
        .collect();
    let provider = ScriptedProvider::fixed(&[(Planet::Sun, 45.0, 1.0)]).with_cusps(cusps);
    let chart = ChartBuilder::new(&provider, HouseSystem::Placidus)
        .build_chart(noon(1990, 5, 17), "UTC", 55.0, 37.0, ChartKind::Natal)
        .unwrap();
    assert_eq!(chart.houses.len(), 12);
    assert_eq!(chart.houses[&7].lon, 180.0);
    assert_eq!(locate_house(chart.objects[&Planet::Sun].lon, &chart.houses), Some(2));
}

#[test]
fn test_partial_cusp_set_is_discarded() {
    let cusps = vec![
        RawCusp { id: CuspId::Index(1), lon: 0.0 },
        RawCusp { id: CuspId::Label("house2".into()), lon: 30.0 },
        RawCusp { id: CuspId::Label("asc".into()), lon: 0.0 },
    ];
    let provider = ScriptedProvider::fixed(&[(Planet::Sun, 45.0, 1.0)]).with_cusps(cusps);
    let chart = ChartBuilder::new(&provider, HouseSystem::Placidus)
        .build_chart(noon(1990, 5, 17), "UTC", 55.0, 37.0, ChartKind::Natal)
        .unwrap();
    assert!(chart.houses.is_empty());
}

#[test]
fn test_house_failure_keeps_planets() {
    let provider = ScriptedProvider::fixed(&[(Planet::Sun, 45.0, 1.0), (Planet::Moon, 200.0, 13.0)]);
    let house_calls = provider.house_calls();
    let chart = ChartBuilder::new(&provider, HouseSystem::Placidus)
        .build_chart(noon(2000, 6, 21), "Europe/Oslo", 78.2, 15.6, ChartKind::Natal)
        .unwrap();
    assert_eq!(count(&house_calls), 1);
    assert!(!chart.has_houses());
    assert_eq!(chart.objects.len(), 2);
}

#[test]
fn test_planet_failure_is_an_error() {
    let provider = ScriptedProvider::failing().with_equal_houses(0.0);
    let result = ChartBuilder::new(&provider, HouseSystem::Placidus).build_chart(
        noon(2000, 6, 21),
        "UTC",
        10.0,
        10.0,
        ChartKind::Transit,
    );
    assert!(matches!(result, Err(selene::EngineError::EphemerisFailure { .. })));
}
