mod common;

use common::{equal_houses, snapshot};
use selene::aspects::{angular_distance, AspectCalculator, AspectKind, AspectTable};
use selene::chart::ChartKind;
use selene::ephemeris::Planet;
use std::collections::BTreeMap;

#[test]
fn test_exact_square_from_transit_mars() {
    let natal = snapshot(ChartKind::Natal, &[(Planet::Sun, 10.0, 1.0)], BTreeMap::new());
    let transit = snapshot(ChartKind::Transit, &[(Planet::Mars, 100.0, 0.6)], BTreeMap::new());

    let aspects = AspectCalculator::default().find_aspects(&natal, &transit, None);

    assert_eq!(aspects.len(), 1);
    let aspect = &aspects[0];
    assert_eq!(aspect.transit_planet, Planet::Mars);
    assert_eq!(aspect.natal_planet, Planet::Sun);
    assert_eq!(aspect.aspect, AspectKind::Square);
    assert_eq!(aspect.orb, 0.0);
    assert!(aspect.exact);
    // (0.9 + 1.0) * 1.1 * 1.0
    assert!((aspect.weight - 2.09).abs() < 1e-9);
    assert_eq!(aspect.transit_house, None);
}

#[test]
fn test_angular_distance_range_and_symmetry() {
    let mut lon1 = 0.0;
    while lon1 < 360.0 {
        let mut lon2 = 0.0;
        while lon2 < 360.0 {
            let d = angular_distance(lon1, lon2);
            assert!((0.0..=180.0).contains(&d), "{} {} -> {}", lon1, lon2, d);
            assert!((d - angular_distance(lon2, lon1)).abs() < 1e-9);
            lon2 += 17.5;
        }
        lon1 += 13.25;
    }
}

#[test]
fn test_every_match_within_scaled_orb() {
    let table = AspectTable::default();
    for multiplier in [0.5, 1.0, 1.5] {
        let calculator = AspectCalculator::new(table.clone(), multiplier);
        let mut lon = 0.0;
        while lon < 360.0 {
            for (kind, orb, base_orb) in calculator.matching_aspects(0.0, lon) {
                let distance = angular_distance(0.0, lon);
                assert!((kind.angle() - distance).abs() <= base_orb * multiplier + 1e-9);
                assert!(orb <= base_orb * multiplier + 1e-9);
            }
            lon += 0.5;
        }
    }
}

#[test]
fn test_results_sorted_by_weight_then_orb() {
    let natal = snapshot(
        ChartKind::Natal,
        &[(Planet::Sun, 0.0, 1.0), (Planet::Saturn, 200.0, 0.03)],
        BTreeMap::new(),
    );
    let transit = snapshot(
        ChartKind::Transit,
        &[
            (Planet::Moon, 2.0, 13.0),
            (Planet::Pluto, 121.0, 0.01),
            (Planet::Venus, 58.0, 1.2),
        ],
        BTreeMap::new(),
    );
    let aspects = AspectCalculator::default().find_aspects(&natal, &transit, None);
    assert!(aspects.len() >= 3);
    for pair in aspects.windows(2) {
        assert!(
            pair[0].weight > pair[1].weight
                || (pair[0].weight == pair[1].weight && pair[0].orb <= pair[1].orb)
        );
    }
    assert_eq!(aspects[0].transit_planet, Planet::Moon);
}

#[test]
fn test_include_filter_limits_transit_bodies() {
    let natal = snapshot(ChartKind::Natal, &[(Planet::Sun, 0.0, 1.0)], BTreeMap::new());
    let transit = snapshot(
        ChartKind::Transit,
        &[(Planet::Moon, 1.0, 13.0), (Planet::Mars, 90.0, 0.5)],
        BTreeMap::new(),
    );
    let aspects = AspectCalculator::default().find_aspects(&natal, &transit, Some(&[Planet::Mars]));
    assert_eq!(aspects.len(), 1);
    assert_eq!(aspects[0].transit_planet, Planet::Mars);
}

#[test]
fn test_applying_and_separating() {
    let natal = snapshot(ChartKind::Natal, &[(Planet::Sun, 10.0, 1.0)], BTreeMap::new());

    // Mars 2° short of the square and moving forward closes the gap.
    let closing = snapshot(ChartKind::Transit, &[(Planet::Mars, 98.0, 0.6)], BTreeMap::new());
    let aspects = AspectCalculator::default().find_aspects(&natal, &closing, None);
    assert!(aspects[0].applying);

    // Past the square and direct: separating.
    let leaving = snapshot(ChartKind::Transit, &[(Planet::Mars, 102.0, 0.6)], BTreeMap::new());
    assert!(!AspectCalculator::default().find_aspects(&natal, &leaving, None)[0].applying);

    // Past the square but retrograde: applying again.
    let returning = snapshot(ChartKind::Transit, &[(Planet::Mars, 102.0, -0.2)], BTreeMap::new());
    let aspect = &AspectCalculator::default().find_aspects(&natal, &returning, None)[0];
    assert!(aspect.applying);
    assert!(aspect.transit_position.retrograde);
}

#[test]
fn test_houses_attached_from_natal_cusps() {
    let natal = snapshot(ChartKind::Natal, &[(Planet::Moon, 75.0, 13.0)], equal_houses(0.0));
    let transit = snapshot(ChartKind::Transit, &[(Planet::Jupiter, 195.0, 0.1)], BTreeMap::new());
    let aspects = AspectCalculator::default().find_aspects(&natal, &transit, None);
    assert_eq!(aspects.len(), 1);
    assert_eq!(aspects[0].aspect, AspectKind::Trine);
    assert_eq!(aspects[0].transit_house, Some(7));
    assert_eq!(aspects[0].natal_house, Some(3));
}

#[test]
fn test_orb_multiplier_widens_matches() {
    let natal = snapshot(ChartKind::Natal, &[(Planet::Sun, 0.0, 1.0)], BTreeMap::new());
    let transit = snapshot(ChartKind::Transit, &[(Planet::Mars, 97.0, 0.5)], BTreeMap::new());
    assert!(AspectCalculator::default()
        .find_aspects(&natal, &transit, None)
        .is_empty());
    let wide = AspectCalculator::new(AspectTable::default(), 1.5);
    let aspects = wide.find_aspects(&natal, &transit, None);
    assert_eq!(aspects.len(), 1);
    assert_eq!(aspects[0].orb, 7.0);
}
