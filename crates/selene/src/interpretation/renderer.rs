use crate::aspects::TransitAspect;
use crate::forecast::ForecastResult;
use crate::interpretation::labels::{aspect_label, format_date, missing_field_labels, planet_label};
use crate::interpretation::templates::{fill_placeholders, TransitTemplates};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

pub const NO_TRANSITS_TEXT: &str =
    "Сегодня значимые транзиты не зафиксированы. Сохраняйте спокойный ритм.";

const TRANSIT_HOUSE_PREFIX: &str = "⚡ Транзит затрагивает";
const NATAL_HOUSE_PREFIX: &str = "🧭 Натальная тема";

/// A single aspect rendered to text blocks
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAspect {
    pub title: String,
    pub text: String,
    pub advice: String,
    pub transit_house_note: Option<String>,
    pub natal_house_note: Option<String>,
    pub retro_note: Option<String>,
}

impl RenderedAspect {
    pub fn to_text(&self) -> String {
        let mut parts = vec![self.title.clone(), self.text.clone()];
        if let Some(note) = &self.transit_house_note {
            parts.push(note.clone());
        }
        if let Some(note) = &self.natal_house_note {
            if self.transit_house_note.as_ref() != Some(note) {
                parts.push(note.clone());
            }
        }
        if let Some(note) = &self.retro_note {
            parts.push(note.clone());
        }
        parts.push(format!("Совет: {}", self.advice));
        parts.join("\n")
    }
}

/// Turns aspects and forecasts into narrative text
#[derive(Clone)]
pub struct TransitInterpreter {
    templates: Arc<TransitTemplates>,
}

impl TransitInterpreter {
    pub fn new(templates: Arc<TransitTemplates>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &TransitTemplates {
        &self.templates
    }

    /// Placeholder values for an aspect
    pub fn context(aspect: &TransitAspect) -> HashMap<&'static str, String> {
        HashMap::from([
            ("transit_planet", planet_label(aspect.transit_planet).to_string()),
            ("natal_planet", planet_label(aspect.natal_planet).to_string()),
            ("aspect_name", aspect_label(aspect.aspect).to_string()),
            ("orb", format!("{:.1}", aspect.orb)),
        ])
    }

    /// Render one aspect; `None` when no template covers it.
    pub fn render_aspect<R: Rng + ?Sized>(
        &self,
        aspect: &TransitAspect,
        rng: &mut R,
    ) -> Option<RenderedAspect> {
        let variant = self.templates.choose(
            aspect.transit_planet,
            aspect.aspect,
            aspect.natal_planet,
            rng,
        )?;
        let context = Self::context(aspect);

        Some(RenderedAspect {
            title: fill_placeholders(&variant.title, &context),
            text: fill_placeholders(&variant.text, &context),
            advice: fill_placeholders(&variant.advice, &context),
            transit_house_note: self.house_note(aspect.transit_house, TRANSIT_HOUSE_PREFIX, rng),
            natal_house_note: self.house_note(aspect.natal_house, NATAL_HOUSE_PREFIX, rng),
            retro_note: self.retrograde_note(aspect),
        })
    }

    fn house_note<R: Rng + ?Sized>(&self, house: Option<u8>, prefix: &str, rng: &mut R) -> Option<String> {
        let meaning = self.templates.house_meaning(house?, rng)?;
        Some(format!("{}: {}", prefix, meaning))
    }

    /// Caveat shown only while the transiting body is retrograde
    pub fn retrograde_note(&self, aspect: &TransitAspect) -> Option<String> {
        if !aspect.transit_position.retrograde {
            return None;
        }
        let template = self.templates.retrograde_note(aspect.transit_planet);
        Some(fill_placeholders(template, &Self::context(aspect)))
    }

    /// Full daily forecast message
    pub fn render_forecast<R: Rng + ?Sized>(&self, forecast: &ForecastResult, rng: &mut R) -> String {
        if !forecast.ok() {
            if forecast.missing_fields.is_empty() {
                return "⚠️ Не удалось рассчитать натальную карту. Попробуйте позже.".to_string();
            }
            let missing = missing_field_labels(&forecast.missing_fields).join(", ");
            return format!("⚠️ Не хватает данных для натальной карты.\nЗаполните: {}.", missing);
        }

        let paragraphs: Vec<String> = forecast
            .aspects
            .iter()
            .filter_map(|aspect| self.render_aspect(aspect, rng))
            .map(|rendered| rendered.to_text())
            .collect();

        if paragraphs.is_empty() {
            return NO_TRANSITS_TEXT.to_string();
        }

        let heading = format!(
            "✨ Натальная карта дня на {}",
            format_date(forecast.target_date)
        );
        std::iter::once(heading)
            .chain(paragraphs)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
