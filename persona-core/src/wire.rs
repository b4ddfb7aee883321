//! The server-side representation and its translation to and from the
//! client domain types.
//!
//! Records are what the HTTP API returns: snake_case fields, upper-case
//! enums, notification settings as their own rows. Payloads are what the
//! client writes. Every read path goes through `From<…Record>` and every
//! write path goes through `to_payload`, so the two dialects never mix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PersonaError, PersonaResult};
use crate::event::{
    Event, EventDraft, NotificationChannel, NotificationSetting, Persona, PersonaDraft, Repeat,
};

// =============================================================================
// Records (server representation)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaRecord {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Only populated on single-persona reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub event_id: String,
    #[serde(rename = "type", with = "upper_channel")]
    pub channel: NotificationChannel,
    pub minutes_before: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    pub persona_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "upper_repeat")]
    pub repeat: Repeat,
    #[serde(default)]
    pub notification_settings: Vec<NotificationRecord>,
    /// The owning persona, joined in on reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personas: Option<Box<PersonaRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_calendar_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payloads (client writes)
// =============================================================================

/// Body of `POST /api/personas` and `PUT /api/personas/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `POST /api/events` and `PUT /api/events/{id}`.
///
/// Every field is optional on the wire so the server can answer a missing
/// field with a 400 instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, alias = "persona_id", skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<NotificationSetting>>,
}

/// Validated persona fields, ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPersona {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

/// Validated event fields, ready to store. Notification settings travel
/// separately because they live in their own table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub persona_id: String,
    pub tags: Vec<String>,
    pub repeat: Repeat,
}

impl PersonaPayload {
    /// Server-side presence check. Name and color are required.
    pub fn validate(self) -> PersonaResult<NewPersona> {
        let name = non_blank(self.name);
        let color = non_blank(self.color);

        match (name, color) {
            (Some(name), Some(color)) => Ok(NewPersona {
                name,
                color,
                description: self.description,
            }),
            _ => Err(PersonaError::Validation(
                "Name and color are required".to_string(),
            )),
        }
    }
}

impl EventPayload {
    /// Server-side presence check: title, start and persona are required.
    /// Start/end ordering is left to the form layer.
    pub fn validate(self) -> PersonaResult<(NewEvent, Vec<NotificationSetting>)> {
        let (Some(title), Some(start), Some(persona_id)) = (
            non_blank(self.title),
            non_blank(self.start),
            non_blank(self.persona_id),
        ) else {
            return Err(PersonaError::Validation(
                "Title, start date, and persona are required".to_string(),
            ));
        };

        let start = parse_instant(&start)?;
        let end = non_blank(self.end).map(|e| parse_instant(&e)).transpose()?;
        let repeat = match non_blank(self.repeat) {
            Some(r) => r.parse()?,
            None => Repeat::None,
        };

        Ok((
            NewEvent {
                title,
                description: self.description,
                start,
                end,
                persona_id,
                tags: self.tags.unwrap_or_default(),
                repeat,
            },
            self.notifications.unwrap_or_default(),
        ))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_instant(s: &str) -> PersonaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PersonaError::Validation(format!("Invalid timestamp '{}'", s)))
}

// =============================================================================
// Translation
// =============================================================================

impl From<PersonaRecord> for Persona {
    fn from(record: PersonaRecord) -> Self {
        Persona {
            id: record.id,
            name: record.name,
            color: record.color,
            description: record.description,
        }
    }
}

impl From<NotificationRecord> for NotificationSetting {
    fn from(record: NotificationRecord) -> Self {
        NotificationSetting {
            channel: record.channel,
            minutes_before: record.minutes_before,
        }
    }
}

impl From<EventRecord> for Event {
    fn from(record: EventRecord) -> Self {
        Event {
            id: record.id,
            title: record.title,
            description: record.description,
            start: record.start,
            end: record.end,
            persona_id: record.persona_id,
            tags: record.tags,
            repeat: record.repeat,
            notifications: record
                .notification_settings
                .into_iter()
                .map(NotificationSetting::from)
                .collect(),
        }
    }
}

impl PersonaDraft {
    pub fn to_payload(&self) -> PersonaPayload {
        PersonaPayload {
            name: Some(self.name.clone()),
            color: Some(self.color.clone()),
            description: self.description.clone(),
        }
    }
}

impl EventDraft {
    pub fn to_payload(&self) -> EventPayload {
        EventPayload {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            start: Some(self.start.to_rfc3339()),
            end: self.end.map(|e| e.to_rfc3339()),
            persona_id: Some(self.persona_id.clone()),
            tags: Some(self.tags.clone()),
            repeat: Some(self.repeat.as_upper().to_string()),
            notifications: Some(self.notifications.clone()),
        }
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        EventDraft {
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
            persona_id: event.persona_id.clone(),
            tags: event.tags.clone(),
            repeat: event.repeat,
            notifications: event.notifications.clone(),
        }
    }
}

// =============================================================================
// Serde helpers for upper-case enums
// =============================================================================

mod upper_repeat {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::event::Repeat;

    pub fn serialize<S: Serializer>(repeat: &Repeat, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(repeat.as_upper())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Repeat, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

mod upper_channel {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::event::NotificationChannel;

    pub fn serialize<S: Serializer>(channel: &NotificationChannel, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(channel.as_upper())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NotificationChannel, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_translates_to_domain() {
        let record: EventRecord = serde_json::from_value(json!({
            "id": "e1",
            "title": "Deep work",
            "description": null,
            "start": "2025-09-01T00:00:00Z",
            "end": "2025-09-01T01:00:00+00:00",
            "persona_id": "dev",
            "tags": ["focus"],
            "repeat": "WEEKLY",
            "notification_settings": [
                { "id": "n1", "event_id": "e1", "type": "PUSH", "minutes_before": 30 }
            ],
            "created_at": "2025-08-30T12:00:00Z"
        }))
        .unwrap();

        let event = Event::from(record);
        assert_eq!(event.persona_id, "dev");
        assert_eq!(event.repeat, Repeat::Weekly);
        assert_eq!(event.notifications, vec![NotificationSetting::push(30)]);
        assert_eq!(event.end.unwrap().to_rfc3339(), "2025-09-01T01:00:00+00:00");
    }

    #[test]
    fn test_record_serializes_upper_case_enums() {
        let record = EventRecord {
            id: "e1".into(),
            title: "t".into(),
            description: None,
            start: "2025-09-01T00:00:00Z".parse().unwrap(),
            end: None,
            persona_id: "p".into(),
            tags: vec![],
            repeat: Repeat::Monthly,
            notification_settings: vec![NotificationRecord {
                id: "n".into(),
                event_id: "e1".into(),
                channel: NotificationChannel::Email,
                minutes_before: 1440,
            }],
            personas: None,
            google_calendar_id: None,
            created_at: "2025-09-01T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["repeat"], "MONTHLY");
        assert_eq!(json["notification_settings"][0]["type"], "EMAIL");
        assert_eq!(json["notification_settings"][0]["minutes_before"], 1440);
        assert!(json.get("personas").is_none());
    }

    #[test]
    fn test_draft_payload_uses_server_spelling_for_repeat() {
        let draft = EventDraft {
            title: "Review".into(),
            description: None,
            start: "2025-09-01T00:00:00Z".parse().unwrap(),
            end: None,
            persona_id: "investor".into(),
            tags: vec![],
            repeat: Repeat::Daily,
            notifications: vec![NotificationSetting::email(10)],
        };
        let json = serde_json::to_value(draft.to_payload()).unwrap();
        assert_eq!(json["personaId"], "investor");
        assert_eq!(json["repeat"], "DAILY");
        assert_eq!(json["notifications"][0]["minutesBefore"], 10);
    }

    #[test]
    fn test_payload_accepts_snake_case_persona_id() {
        let payload: EventPayload = serde_json::from_value(json!({
            "title": "x",
            "start": "2025-09-01T09:00:00+09:00",
            "persona_id": "p1",
            "repeat": "weekly"
        }))
        .unwrap();
        let (new_event, notifications) = payload.validate().unwrap();
        assert_eq!(new_event.persona_id, "p1");
        assert_eq!(new_event.repeat, Repeat::Weekly);
        assert_eq!(new_event.start, "2025-09-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_payload_requires_title_start_and_persona() {
        let missing_title = EventPayload {
            title: Some("   ".into()),
            start: Some("2025-09-01T00:00:00Z".into()),
            persona_id: Some("p".into()),
            ..Default::default()
        };
        assert!(matches!(missing_title.validate(), Err(PersonaError::Validation(_))));

        let missing_persona = EventPayload {
            title: Some("t".into()),
            start: Some("2025-09-01T00:00:00Z".into()),
            ..Default::default()
        };
        assert!(matches!(missing_persona.validate(), Err(PersonaError::Validation(_))));
    }

    #[test]
    fn test_payload_does_not_check_end_after_start() {
        let payload = EventPayload {
            title: Some("t".into()),
            start: Some("2025-09-01T10:00:00Z".into()),
            end: Some("2025-09-01T09:00:00Z".into()),
            persona_id: Some("p".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_persona_payload_requires_name_and_color() {
        let ok = PersonaPayload {
            name: Some("개발자".into()),
            color: Some("#8B5CF6".into()),
            description: None,
        };
        assert_eq!(ok.validate().unwrap().name, "개발자");

        let missing_color = PersonaPayload {
            name: Some("x".into()),
            ..Default::default()
        };
        assert!(missing_color.validate().is_err());
    }
}
