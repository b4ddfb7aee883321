//! Event list filters and their query-string form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PersonaError, PersonaResult};
use crate::wire::EventRecord;

/// Narrowing applied to an event listing. Empty fields don't filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Any of these personas.
    pub persona_ids: Vec<String>,
    /// Inclusive lower bound on `start`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `start`.
    pub end_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring of title or description.
    pub search_text: Option<String>,
    /// Any of these tags.
    pub tags: Vec<String>,
}

impl EventFilter {
    pub fn is_empty(&self) -> bool {
        *self == EventFilter::default()
    }

    pub fn matches(&self, event: &EventRecord) -> bool {
        if !self.persona_ids.is_empty() && !self.persona_ids.contains(&event.persona_id) {
            return false;
        }
        if self.start_date.is_some_and(|from| event.start < from) {
            return false;
        }
        if self.end_date.is_some_and(|to| event.start > to) {
            return false;
        }
        if let Some(needle) = self.search_text.as_deref().map(str::to_lowercase) {
            let in_title = event.title.to_lowercase().contains(&needle);
            let in_description = event
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        if !self.tags.is_empty() && !event.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        true
    }
}

/// Query string of `GET /api/events`. Lists are comma separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_ids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl From<&EventFilter> for EventQuery {
    fn from(filter: &EventFilter) -> Self {
        let join = |items: &[String]| (!items.is_empty()).then(|| items.join(","));
        EventQuery {
            persona_ids: join(&filter.persona_ids),
            start_date: filter.start_date.map(|d| d.to_rfc3339()),
            end_date: filter.end_date.map(|d| d.to_rfc3339()),
            search_text: filter.search_text.clone().filter(|s| !s.is_empty()),
            tags: join(&filter.tags),
        }
    }
}

impl TryFrom<EventQuery> for EventFilter {
    type Error = PersonaError;

    fn try_from(query: EventQuery) -> PersonaResult<Self> {
        Ok(EventFilter {
            persona_ids: split_list(query.persona_ids.as_deref()),
            start_date: query.start_date.as_deref().map(parse_bound).transpose()?,
            end_date: query.end_date.as_deref().map(parse_bound).transpose()?,
            search_text: query.search_text.filter(|s| !s.is_empty()),
            tags: split_list(query.tags.as_deref()),
        })
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_bound(s: &str) -> PersonaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| PersonaError::Validation(format!("Invalid date filter '{}'", s)))
}
