//! Persistence seam.
//!
//! The server only talks to storage through [`Repository`]. Rows come back
//! in the server representation ([`EventRecord`], [`PersonaRecord`]).

mod memory;

pub use memory::MemoryRepository;

use async_trait::async_trait;

use crate::constants::default_persona_drafts;
use crate::error::PersonaResult;
use crate::event::NotificationSetting;
use crate::filter::EventFilter;
use crate::wire::{EventRecord, NewEvent, NewPersona, NotificationRecord, PersonaRecord};

#[async_trait]
pub trait Repository: Send + Sync {
    /// All personas, oldest first.
    async fn list_personas(&self) -> PersonaResult<Vec<PersonaRecord>>;

    async fn get_persona(&self, id: &str) -> PersonaResult<Option<PersonaRecord>>;

    async fn insert_persona(&self, persona: NewPersona) -> PersonaResult<PersonaRecord>;

    /// Fails with `PersonaNotFound` if there is no such persona.
    async fn update_persona(&self, id: &str, persona: NewPersona) -> PersonaResult<PersonaRecord>;

    /// Deletes the persona and, with it, every event it owns. Deleting a
    /// missing persona is not an error.
    async fn delete_persona(&self, id: &str) -> PersonaResult<()>;

    /// Matching events ordered by start, each with its owning persona and
    /// notification settings joined in.
    async fn list_events(&self, filter: &EventFilter) -> PersonaResult<Vec<EventRecord>>;

    async fn get_event(&self, id: &str) -> PersonaResult<Option<EventRecord>>;

    async fn insert_event(&self, event: NewEvent) -> PersonaResult<EventRecord>;

    /// Fails with `EventNotFound` if there is no such event.
    async fn update_event(&self, id: &str, event: NewEvent) -> PersonaResult<EventRecord>;

    /// Deletes the event and its notification settings. Deleting a missing
    /// event is not an error.
    async fn delete_event(&self, id: &str) -> PersonaResult<()>;

    /// Replace every notification setting of an event.
    async fn replace_notifications(
        &self,
        event_id: &str,
        settings: &[NotificationSetting],
    ) -> PersonaResult<Vec<NotificationRecord>>;

    /// The id the event was given by the external calendar, if it was
    /// ever synced.
    async fn external_id(&self, event_id: &str) -> PersonaResult<Option<String>>;

    async fn set_external_id(&self, event_id: &str, external_id: &str) -> PersonaResult<()>;
}

/// Insert the built-in personas if there are none yet. Returns how many
/// were inserted.
pub async fn seed_default_personas(repo: &dyn Repository) -> PersonaResult<usize> {
    if !repo.list_personas().await?.is_empty() {
        return Ok(0);
    }

    let drafts = default_persona_drafts();
    let count = drafts.len();
    for draft in drafts {
        repo.insert_persona(NewPersona {
            name: draft.name,
            color: draft.color,
            description: draft.description,
        })
        .await?;
    }

    tracing::info!(count, "seeded default personas");
    Ok(count)
}
