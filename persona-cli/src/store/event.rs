use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use persona_core::constants::{UPCOMING_DAYS, UPCOMING_LIMIT};
use persona_core::form::EventForm;
use persona_core::{CivilZone, Event, EventDraft, EventFilter, EventQuery};
use tokio::sync::watch;

use crate::api::Api;
use crate::store::{Snapshot, StateCell, upsert};

pub struct EventStore {
    api: Arc<dyn Api>,
    zone: CivilZone,
    state: StateCell<Event>,
}

impl EventStore {
    pub fn new(api: Arc<dyn Api>, zone: CivilZone) -> Self {
        EventStore {
            api,
            zone,
            state: StateCell::new(),
        }
    }

    pub fn zone(&self) -> &CivilZone {
        &self.zone
    }

    pub fn snapshot(&self) -> Arc<Snapshot<Event>> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<Event>>> {
        self.state.subscribe()
    }

    /// Replace the whole collection with the server's answer to `filter`.
    ///
    /// Overlapping fetches are not sequenced: whichever response arrives
    /// last is what the store shows.
    pub async fn fetch(&self, filter: &EventFilter) -> Result<()> {
        self.state.begin();
        match self.api.list_events(&EventQuery::from(filter)).await {
            Ok(records) => {
                let events: Vec<Event> = records.into_iter().map(Event::from).collect();
                self.state.succeed(|_| events);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Validate the form and compose its times in the store's zone. An
    /// invalid form is recorded as the store's error.
    fn draft(&self, form: EventForm) -> Result<EventDraft> {
        form.into_draft(&self.zone).map_err(|errors| {
            self.state.fail(&errors);
            errors.into()
        })
    }

    /// Create an event. A form that fails validation never reaches the
    /// server.
    pub async fn add(&self, form: EventForm) -> Result<Event> {
        let draft = self.draft(form)?;
        self.add_draft(&draft).await
    }

    pub async fn add_draft(&self, draft: &EventDraft) -> Result<Event> {
        let (event, _) = self.create(draft).await?;
        Ok(event)
    }

    /// Create, then mirror to the external calendar unless the server
    /// already did so while creating. A failed mirror is logged; the
    /// created event is returned and stays in the store.
    pub async fn add_and_sync(&self, form: EventForm) -> Result<Event> {
        let draft = self.draft(form)?;
        let (event, remote_id) = self.create(&draft).await?;

        if let Some(remote_id) = remote_id {
            tracing::debug!(event_id = %event.id, %remote_id, "already synced on create");
            return Ok(event);
        }
        if let Err(e) = self.api.sync_event(&event.id).await {
            tracing::warn!(event_id = %event.id, error = %e, "Google Calendar sync failed");
        }
        Ok(event)
    }

    /// The created event and the external id the server gave it, if any.
    async fn create(&self, draft: &EventDraft) -> Result<(Event, Option<String>)> {
        self.state.begin();
        match self.api.create_event(&draft.to_payload()).await {
            Ok(record) => {
                let remote_id = record.google_calendar_id.clone();
                let event = Event::from(record);
                let added = event.clone();
                self.state
                    .succeed(|items| upsert(items, added, |e| e.id == event.id));
                Ok((event, remote_id))
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn update(&self, id: &str, form: EventForm) -> Result<Event> {
        let draft = self.draft(form)?;

        self.state.begin();
        match self.api.update_event(id, &draft.to_payload()).await {
            Ok(record) => {
                let event = Event::from(record);
                let updated = event.clone();
                self.state.succeed(|items| upsert(items, updated, |e| e.id == id));
                Ok(event)
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Removed locally only once the server confirms.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.state.begin();
        match self.api.delete_event(id).await {
            Ok(()) => {
                self.state
                    .succeed(|items| items.iter().filter(|e| e.id != id).cloned().collect());
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Explicitly mirror one event. The collection is never changed by
    /// this, whatever the outcome.
    pub async fn sync(&self, id: &str) -> Result<String> {
        self.api.sync_event(id).await.inspect_err(|e| {
            self.state.fail(e);
        })
    }

    /// Drop every event of a persona locally, after that persona was
    /// deleted on the server.
    pub fn forget_persona(&self, persona_id: &str) {
        self.state.succeed(|items| {
            items
                .iter()
                .filter(|e| e.persona_id != persona_id)
                .cloned()
                .collect()
        });
    }

    pub fn by_id(&self, id: &str) -> Option<Event> {
        self.snapshot().items.iter().find(|e| e.id == id).cloned()
    }

    pub fn by_persona(&self, persona_id: &str) -> Vec<Event> {
        self.snapshot()
            .items
            .iter()
            .filter(|e| e.persona_id == persona_id)
            .cloned()
            .collect()
    }

    /// Events starting inside `[from, to]`.
    pub fn in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Event> {
        self.snapshot()
            .items
            .iter()
            .filter(|e| e.starts_within(from, to))
            .cloned()
            .collect()
    }

    /// The next few events starting within a week of `now`, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.in_range(now, now + Duration::days(UPCOMING_DAYS));
        events.sort_by_key(|e| e.start);
        events.truncate(UPCOMING_LIMIT);
        events
    }
}
