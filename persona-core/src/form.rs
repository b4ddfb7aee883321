//! Form-layer validation.
//!
//! This is the only place start/end ordering is enforced. A form that
//! fails here never turns into a draft, so nothing invalid reaches a
//! write call.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::error::PersonaError;
use crate::event::{Event, EventDraft, NotificationSetting, PersonaDraft, Repeat};
use crate::time::{CivilZone, parse_time_of_day};

/// Field name → message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

impl From<FormErrors> for PersonaError {
    fn from(errors: FormErrors) -> Self {
        PersonaError::Validation(errors.to_string())
    }
}

/// The create/edit event form. Times are wall-clock `HH:MM` in the
/// civil zone, both on `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub persona_id: String,
    pub date: Option<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    pub tags: Vec<String>,
    pub repeat: Repeat,
    pub notifications: Vec<NotificationSetting>,
}

impl Default for EventForm {
    fn default() -> Self {
        EventForm {
            title: String::new(),
            description: String::new(),
            persona_id: String::new(),
            date: None,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            tags: Vec::new(),
            repeat: Repeat::None,
            notifications: vec![NotificationSetting::push(30)],
        }
    }
}

impl EventForm {
    /// Pre-fill the form from a stored event, for editing.
    pub fn from_event(event: &Event, zone: &CivilZone) -> Self {
        let end = event.end.unwrap_or(event.start);
        EventForm {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            persona_id: event.persona_id.clone(),
            date: Some(zone.date_only(event.start)),
            start_time: zone.time_of_day(event.start),
            end_time: zone.time_of_day(end),
            tags: event.tags.clone(),
            repeat: event.repeat,
            notifications: event.notifications.clone(),
        }
    }

    /// Add a tag unless it is blank or already present.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.title.trim().is_empty() {
            errors.insert("title", "Please enter a title");
        }
        if self.persona_id.trim().is_empty() {
            errors.insert("persona", "Please choose a persona");
        }
        if self.date.is_none() {
            errors.insert("date", "Please choose a date");
        }

        match (
            parse_time_of_day(&self.start_time),
            parse_time_of_day(&self.end_time),
        ) {
            (Ok(start), Ok(end)) if start >= end => {
                errors.insert("time", "End time must be later than start time");
            }
            (Ok(_), Ok(_)) => {}
            _ => errors.insert("time", "Times must be HH:MM"),
        }

        errors.into_result()
    }

    /// Validate, then compose start and end in `zone`.
    pub fn into_draft(self, zone: &CivilZone) -> Result<EventDraft, FormErrors> {
        self.validate()?;

        let mut errors = FormErrors::default();
        let Some(date) = self.date else {
            errors.insert("date", "Please choose a date");
            return Err(errors);
        };
        let start = zone.compose(date, &self.start_time);
        let end = zone.compose(date, &self.end_time);

        let (start, end) = match (start, end) {
            (Ok(start), Ok(end)) => (start, end),
            (Err(e), _) | (_, Err(e)) => {
                errors.insert("time", e.to_string());
                return Err(errors);
            }
        };

        let description = self.description.trim();

        Ok(EventDraft {
            title: self.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            start,
            end: Some(end),
            persona_id: self.persona_id,
            tags: self.tags,
            repeat: self.repeat,
            notifications: self.notifications,
        })
    }
}

/// The create/edit persona form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaForm {
    pub name: String,
    pub color: String,
    pub description: String,
}

impl PersonaForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.insert("name", "Please enter a name");
        }
        if !is_hex_color(self.color.trim()) {
            errors.insert("color", "Color must look like #RRGGBB");
        }

        errors.into_result()
    }

    pub fn into_draft(self) -> Result<PersonaDraft, FormErrors> {
        self.validate()?;
        let description = self.description.trim();
        Ok(PersonaDraft {
            name: self.name.trim().to_string(),
            color: self.color.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn valid_form() -> EventForm {
        EventForm {
            title: "  Deep work ".to_string(),
            persona_id: "developer".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 1),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_form_composes_kst_times() {
        let draft = valid_form().into_draft(&CivilZone::kst()).unwrap();
        assert_eq!(draft.title, "Deep work");
        assert_eq!(draft.start, Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap());
        assert_eq!(draft.end, Some(Utc.with_ymd_and_hms(2025, 9, 1, 1, 0, 0).unwrap()));
        assert_eq!(draft.description, None);
        assert_eq!(draft.notifications, vec![NotificationSetting::push(30)]);
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let form = EventForm {
            start_time: "10:00".to_string(),
            end_time: "09:30".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("time").is_some());
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["time"]);
    }

    #[test]
    fn test_equal_start_and_end_is_rejected() {
        let form = EventForm {
            start_time: "10:00".to_string(),
            end_time: "10:00".to_string(),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = EventForm::default().validate().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["date", "persona", "title"]);
    }

    #[test]
    fn test_form_round_trips_through_event() {
        let zone = CivilZone::kst();
        let draft = valid_form().into_draft(&zone).unwrap();
        let event = Event {
            id: "e1".to_string(),
            title: draft.title.clone(),
            description: None,
            start: draft.start,
            end: draft.end,
            persona_id: draft.persona_id.clone(),
            tags: vec![],
            repeat: Repeat::None,
            notifications: vec![],
        };
        let form = EventForm::from_event(&event, &zone);
        assert_eq!(form.start_time, "09:00");
        assert_eq!(form.end_time, "10:00");
        assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 9, 1));
    }

    #[test]
    fn test_add_tag_skips_blank_and_duplicates() {
        let mut form = EventForm::default();
        form.add_tag(" focus ");
        form.add_tag("focus");
        form.add_tag("  ");
        assert_eq!(form.tags, vec!["focus".to_string()]);
    }

    #[test]
    fn test_persona_form() {
        let form = PersonaForm {
            name: "러너".to_string(),
            color: "#10b981".to_string(),
            description: String::new(),
        };
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.description, None);

        let bad = PersonaForm {
            name: String::new(),
            color: "green".to_string(),
            description: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("color").is_some());
    }
}
