//! One-way mirroring of events into an external calendar.
//!
//! Sync is an upsert keyed by the external id stored next to the event:
//! update when one is known, insert (and remember the new id) otherwise.
//! Callers that must not fail use the `*_best_effort` wrappers, which log
//! and swallow errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersonaResult;
use crate::event::{Event, Repeat};
use crate::repository::Repository;
use crate::time::CivilZone;

/// A point in time plus the zone the remote calendar should display it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTime {
    pub date_time: DateTime<Utc>,
    pub time_zone: String,
}

/// An event in the shape external calendars expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    pub summary: String,
    pub description: String,
    pub start: ExternalTime,
    pub end: ExternalTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}

impl ExternalEvent {
    /// An event without an end is sent as zero-length.
    pub fn from_event(event: &Event, zone: &CivilZone) -> Self {
        let at = |date_time| ExternalTime {
            date_time,
            time_zone: zone.name().to_string(),
        };

        ExternalEvent {
            summary: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            start: at(event.start),
            end: at(event.end.unwrap_or(event.start)),
            recurrence: recurrence_rule(event.repeat),
        }
    }
}

/// RFC 5545 recurrence lines for a repeat setting. `None` has none.
pub fn recurrence_rule(repeat: Repeat) -> Vec<String> {
    let freq = match repeat {
        Repeat::None => return Vec::new(),
        Repeat::Daily => "DAILY",
        Repeat::Weekly => "WEEKLY",
        Repeat::Monthly => "MONTHLY",
    };
    vec![format!("RRULE:FREQ={}", freq)]
}

/// A calendar that events can be pushed to.
#[async_trait]
pub trait RemoteCalendar: Send + Sync {
    fn name(&self) -> &str;

    /// Create the event remotely and return its remote id.
    async fn insert(&self, event: &ExternalEvent) -> PersonaResult<String>;

    /// Overwrite an existing remote event. Returns the remote id.
    async fn update(&self, external_id: &str, event: &ExternalEvent) -> PersonaResult<String>;

    async fn delete(&self, external_id: &str) -> PersonaResult<()>;
}

/// Push `event` to `remote`, creating or updating as needed. Returns the
/// remote id.
pub async fn sync_event(
    repo: &dyn Repository,
    remote: &dyn RemoteCalendar,
    event: &Event,
    zone: &CivilZone,
) -> PersonaResult<String> {
    let external = ExternalEvent::from_event(event, zone);

    match repo.external_id(&event.id).await? {
        Some(external_id) => {
            let id = remote.update(&external_id, &external).await?;
            tracing::debug!(event_id = %event.id, external_id = %id, calendar = remote.name(), "updated remote event");
            Ok(id)
        }
        None => {
            let id = remote.insert(&external).await?;
            if !id.is_empty() {
                repo.set_external_id(&event.id, &id).await?;
            }
            tracing::debug!(event_id = %event.id, external_id = %id, calendar = remote.name(), "created remote event");
            Ok(id)
        }
    }
}

/// Remove the remote copy of an event, if it was ever synced.
pub async fn unsync_event(
    repo: &dyn Repository,
    remote: &dyn RemoteCalendar,
    event_id: &str,
) -> PersonaResult<()> {
    if let Some(external_id) = repo.external_id(event_id).await? {
        remote.delete(&external_id).await?;
        tracing::debug!(event_id, external_id = %external_id, calendar = remote.name(), "deleted remote event");
    }
    Ok(())
}

/// [`sync_event`], with failures logged and discarded.
pub async fn sync_event_best_effort(
    repo: &dyn Repository,
    remote: &dyn RemoteCalendar,
    event: &Event,
    zone: &CivilZone,
) -> Option<String> {
    match sync_event(repo, remote, event, zone).await {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(event_id = %event.id, calendar = remote.name(), error = %e, "event sync failed");
            None
        }
    }
}

/// [`unsync_event`], with failures logged and discarded.
pub async fn unsync_event_best_effort(
    repo: &dyn Repository,
    remote: &dyn RemoteCalendar,
    event_id: &str,
) {
    if let Err(e) = unsync_event(repo, remote, event_id).await {
        tracing::warn!(event_id, calendar = remote.name(), error = %e, "remote delete failed");
    }
}
