use rand::Rng;
use selene::engine::Engine;
use selene::interpretation::labels::{format_date, pluralize_days};
use selene::lunar::{ActionSuggestion, DayContext, Rating};
use serde::Serialize;

const NO_ACTIONS_TEXT: &str = "Пока нет ярких сценариев — сфокусируйтесь на базовых задачах и отдыхе.";

#[derive(Debug, Serialize)]
pub(crate) struct DayReport {
    pub day: DayContext,
    pub actions: Vec<ActionSuggestion>,
}

/// Consecutive days from `index` with the Moon in the same sign
fn sign_span(window: &[DayReport], index: usize) -> usize {
    let current = &window[index].day.moon_sign.key;
    window[index..]
        .iter()
        .take_while(|r| &r.day.moon_sign.key == current)
        .count()
}

fn sign_duration(span: usize) -> String {
    if span <= 1 {
        "только сегодня".to_string()
    } else {
        format!("в ближайшие {} {}", span, pluralize_days(span as i64))
    }
}

pub(crate) fn format_day_section<R: Rng + ?Sized>(
    engine: &Engine,
    window: &[DayReport],
    index: usize,
    rng: &mut R,
) -> String {
    let report = &window[index];
    let day = &report.day;
    let mut lines = vec![
        format!("{} {} — {}", day.phase.emoji, format_date(day.date), day.phase.title),
        day.phase.description.clone(),
        format!("Освещённость: {}%", day.illumination),
        format!(
            "Луна в {} {} {}",
            day.moon_sign.emoji,
            day.moon_sign.title,
            sign_duration(sign_span(window, index))
        ),
    ];

    if let Some(house) = day.natal_house {
        if let Some((_, meaning)) = engine.house_interpretation(house, rng) {
            lines.push(format!("Персональный акцент: {}", meaning));
        }
    }

    if report.actions.is_empty() {
        lines.push(NO_ACTIONS_TEXT.to_string());
    } else {
        lines.push("Лучшие дела:".to_string());
        for suggestion in &report.actions {
            let marker = if suggestion.advice.rating == Rating::Excellent {
                "🔥"
            } else {
                "✅"
            };
            lines.push(format!(
                "{} {} {} — {}",
                marker, suggestion.action.emoji, suggestion.action.title, suggestion.advice.text
            ));
        }
    }
    lines.join("\n")
}
