use crate::interpretation::fill_placeholders;
use crate::interpretation::labels::{format_date, planet_label, pluralize_days};
use crate::retrograde::extractor::RetroPeriod;
use crate::retrograde::guides::{GuidePhase, RetrogradeGuides};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

/// Renders retrograde notifications from guide data
#[derive(Debug, Clone)]
pub struct RetroAlertFormatter {
    guides: Arc<RetrogradeGuides>,
}

impl RetroAlertFormatter {
    pub fn new(guides: Arc<RetrogradeGuides>) -> Self {
        Self { guides }
    }

    pub fn guides(&self) -> &RetrogradeGuides {
        &self.guides
    }

    fn values(&self, period: &RetroPeriod, no_end: &str) -> HashMap<&'static str, String> {
        let mut values = HashMap::new();
        values.insert("planet", planet_label(period.planet).to_string());
        values.insert("start_date", format_date(period.start));
        values.insert(
            "end_date",
            period.end.map(format_date).unwrap_or_else(|| no_end.to_string()),
        );
        values.insert("pre_alert", format_date(period.pre_alert));
        values
    }

    fn premium_text(&self, header: String, list_title: &str, items: &[String]) -> String {
        let mut lines = vec![header];
        if !items.is_empty() {
            lines.push(list_title.to_string());
            lines.extend(items.iter().map(|item| format!("• {}", item)));
        }
        lines.join("\n")
    }

    fn free_text(&self, message: String) -> String {
        let messages = &self.guides.messages;
        [message, messages.premium_only.clone(), messages.premium_cta.clone()].join("\n\n")
    }

    /// Heads-up sent `lead_days` before a station.
    pub fn format_pre_alert(&self, period: &RetroPeriod, is_premium: bool, today: NaiveDate) -> String {
        let messages = &self.guides.messages;
        let days = (period.start - today).num_days().max(0);
        let mut values = self.values(period, &messages.pre_alert_no_end);
        values.insert("days", days.to_string());
        values.insert("days_word", pluralize_days(days).to_string());

        if is_premium {
            let header = fill_placeholders(&messages.pre_alert_premium_header, &values);
            let items = self.guides.guide(period.planet, GuidePhase::Pre);
            self.premium_text(header, &messages.pre_alert_premium_list, items)
        } else {
            self.free_text(fill_placeholders(&messages.pre_alert_free, &values))
        }
    }

    /// Message for the day a period begins.
    pub fn format_start_alert(&self, period: &RetroPeriod, is_premium: bool) -> String {
        let messages = &self.guides.messages;
        let values = self.values(period, &messages.start_no_end);
        if is_premium {
            let header = fill_placeholders(&messages.start_premium_header, &values);
            let items = self.guides.guide(period.planet, GuidePhase::During);
            self.premium_text(header, &messages.start_premium_list, items)
        } else {
            self.free_text(fill_placeholders(&messages.start_free, &values))
        }
    }

    /// Status line for an active or upcoming period plus an explanation.
    pub fn format_summary(&self, period: &RetroPeriod, is_premium: bool, today: NaiveDate) -> String {
        let messages = &self.guides.messages;
        let values = self.values(period, &messages.start_no_end);
        let template = if period.contains(today) {
            &messages.summary_active
        } else {
            &messages.summary_upcoming
        };
        let mut text = fill_placeholders(template, &values);
        text.push_str(&self.guides.explanation(period.planet, is_premium));
        text
    }
}
