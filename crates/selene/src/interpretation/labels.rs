//! Russian labels for user-facing text.

use crate::aspects::AspectKind;
use crate::ephemeris::Planet;
use chrono::NaiveDate;

pub fn planet_label(planet: Planet) -> &'static str {
    match planet {
        Planet::Sun => "Солнце",
        Planet::Moon => "Луна",
        Planet::Mercury => "Меркурий",
        Planet::Venus => "Венера",
        Planet::Mars => "Марс",
        Planet::Jupiter => "Юпитер",
        Planet::Saturn => "Сатурн",
        Planet::Uranus => "Уран",
        Planet::Neptune => "Нептун",
        Planet::Pluto => "Плутон",
    }
}

pub fn aspect_label(kind: AspectKind) -> &'static str {
    match kind {
        AspectKind::Conjunction => "конъюнкция",
        AspectKind::Sextile => "секстиль",
        AspectKind::Square => "квадрат",
        AspectKind::Trine => "тригон",
        AspectKind::Opposition => "оппозиция",
    }
}

/// Label for a missing profile field; unknown fields are shown as-is.
pub fn missing_field_label(field: &str) -> &str {
    match field {
        "birth_date" => "дата рождения",
        "timezone" => "часовой пояс",
        "lat" | "lon" => "координаты",
        "profile" => "натальный профиль",
        other => other,
    }
}

/// Distinct labels for missing fields, in first-seen order.
pub fn missing_field_labels(fields: &[String]) -> Vec<&str> {
    let mut labels: Vec<&str> = Vec::new();
    for field in fields {
        let label = missing_field_label(field);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// DD.MM.YYYY
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Russian plural form of "day" for a count.
pub fn pluralize_days(days: i64) -> &'static str {
    let days = days.abs();
    if days % 10 == 1 && days % 100 != 11 {
        "день"
    } else if (2..=4).contains(&(days % 10)) && !(12..=14).contains(&(days % 100)) {
        "дня"
    } else {
        "дней"
    }
}
