mod common;

use chrono::{Duration, NaiveDate};
use common::{count, date, ScriptedProvider};
use selene::engine::{Engine, ReferenceData};
use selene::ephemeris::Planet;
use selene::retrograde::{extract_periods, ExtractionWindow, RetroPeriod, RetrogradeTracker};
use selene::settings::{EngineSettings, RetrogradeSettings};

fn series(start: NaiveDate, flags: &[bool]) -> Vec<(NaiveDate, bool)> {
    flags
        .iter()
        .enumerate()
        .map(|(i, flag)| (start + Duration::days(i as i64), *flag))
        .collect()
}

fn window(start: NaiveDate, end: NaiveDate) -> ExtractionWindow {
    ExtractionWindow {
        start,
        end,
        pad_before_days: 30,
        pad_after_days: 60,
        lead_days: 3,
    }
}

/// Provider where each planet is retrograde inside the given date ranges
fn retro_provider(ranges: Vec<(Planet, NaiveDate, NaiveDate)>) -> ScriptedProvider {
    ScriptedProvider::new(move |instant, planet| {
        let day = instant.date_naive();
        let retro = ranges
            .iter()
            .any(|(p, start, end)| *p == planet && *start <= day && day <= *end);
        Some((100.0, if retro { -0.5 } else { 1.0 }))
    })
}

#[test]
fn test_short_series_period() {
    let s = series(date(2024, 1, 1), &[false, false, true, true, true, false]);
    let periods = extract_periods(Planet::Mercury, &s, &window(date(2024, 1, 1), date(2024, 1, 6)));
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].start, date(2024, 1, 3));
    assert_eq!(periods[0].end, Some(date(2024, 1, 5)));
    assert_eq!(periods[0].pre_alert, date(2023, 12, 31));
}

#[test]
fn test_union_of_periods_equals_true_days() {
    let patterns: [&[bool]; 5] = [
        &[true, false, true, true, false, false, true],
        &[false, false, false],
        &[true, true, true, true],
        &[false, true, false, true, false, true, true, false],
        &[true],
    ];
    let start = date(2024, 3, 1);
    for flags in patterns {
        let s = series(start, flags);
        let last = s.last().map(|(d, _)| *d).unwrap();
        let periods = extract_periods(Planet::Venus, &s, &window(start, last));
        for (day, flag) in &s {
            let covered = periods.iter().any(|p| p.contains(*day));
            assert_eq!(covered, *flag, "{:?} on {}", flags, day);
        }
        for pair in periods.windows(2) {
            assert!(pair[0].end.unwrap() < pair[1].start);
        }
    }
}

#[test]
fn test_tracker_samples_padded_window_once_per_day() {
    let provider = retro_provider(vec![(Planet::Mercury, date(2024, 4, 1), date(2024, 4, 25))]);
    let calls = provider.planet_calls();
    let tracker = RetrogradeTracker::new(&provider, RetrogradeSettings::default());

    let periods = tracker
        .extract(Planet::Mercury, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();

    // 30 days before + 31 in range + 60 after
    assert_eq!(count(&calls), 121);
    assert_eq!(
        periods,
        vec![RetroPeriod {
            planet: Planet::Mercury,
            start: date(2024, 4, 1),
            end: Some(date(2024, 4, 25)),
            pre_alert: date(2024, 3, 29),
        }]
    );
}

#[test]
fn test_tracker_reports_open_and_leading_periods() {
    let provider = retro_provider(vec![
        (Planet::Mars, date(2023, 12, 1), date(2024, 1, 10)),
        (Planet::Mars, date(2024, 4, 20), date(2024, 12, 31)),
    ]);
    let tracker = RetrogradeTracker::new(&provider, RetrogradeSettings::default());
    let periods = tracker.extract(Planet::Mars, date(2024, 1, 20), date(2024, 2, 20)).unwrap();

    assert_eq!(periods.len(), 2);
    // Already retrograde on the first sample (2023-12-21)
    assert_eq!(periods[0].start, date(2023, 12, 21));
    assert_eq!(periods[0].end, Some(date(2024, 1, 10)));
    // Still retrograde on the last sample (2024-04-20)
    assert_eq!(periods[1].start, date(2024, 4, 20));
    assert_eq!(periods[1].end, None);
}

#[test]
fn test_configured_padding() {
    let provider = retro_provider(vec![]);
    let calls = provider.planet_calls();
    let settings = RetrogradeSettings {
        pad_before_days: 0,
        pad_after_days: 0,
        ..RetrogradeSettings::default()
    };
    let tracker = RetrogradeTracker::new(&provider, settings);
    let periods = tracker.periods(date(2024, 1, 1), date(2024, 1, 10)).unwrap();
    assert_eq!(count(&calls), 10);
    assert_eq!(periods.len(), 5);
    assert!(periods.values().all(Vec::is_empty));
}

#[test]
fn test_reversed_range_is_rejected() {
    let provider = retro_provider(vec![]);
    let tracker = RetrogradeTracker::new(&provider, RetrogradeSettings::default());
    assert!(tracker.extract(Planet::Venus, date(2024, 2, 1), date(2024, 1, 1)).is_err());
}

#[test]
fn test_padding_past_calendar_range_is_an_error() {
    let provider = retro_provider(vec![]);
    let calls = provider.planet_calls();
    let settings = RetrogradeSettings {
        pad_before_days: i64::MAX / 2,
        ..RetrogradeSettings::default()
    };
    let tracker = RetrogradeTracker::new(&provider, settings);
    let result = tracker.extract(Planet::Mercury, date(2024, 1, 1), date(2024, 1, 10));
    assert!(matches!(result, Err(selene::EngineError::InvalidDate { .. })));
    assert_eq!(count(&calls), 0);
}

#[test]
fn test_engine_periods_and_alerts() {
    let provider = retro_provider(vec![
        (Planet::Mercury, date(2024, 4, 1), date(2024, 4, 25)),
        (Planet::Venus, date(2024, 5, 10), date(2024, 6, 1)),
    ]);
    let engine = Engine::with_data(
        Box::new(provider),
        EngineSettings::default(),
        ReferenceData::bundled().unwrap(),
    );

    let all = engine.retrograde_periods(date(2024, 3, 20), date(2024, 4, 20)).unwrap();
    assert_eq!(all[&Planet::Mercury].len(), 1);
    assert_eq!(all[&Planet::Venus].len(), 1);
    assert!(all[&Planet::Saturn].is_empty());

    let mercury = &all[&Planet::Mercury][0];
    let pre = engine.format_pre_alert(mercury, true, mercury.pre_alert);
    assert!(pre.contains("Через 3 дня Меркурий"));
    let start = engine.format_start_alert(mercury, false);
    assert!(start.contains("до 25.04.2024"));
    let summary = engine.format_summary(mercury, false, date(2024, 4, 10));
    assert!(summary.contains("сейчас ретрограден"));
}
