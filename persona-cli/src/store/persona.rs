use std::sync::Arc;

use anyhow::Result;
use persona_core::Persona;
use persona_core::form::PersonaForm;
use tokio::sync::watch;

use crate::api::Api;
use crate::store::{Snapshot, StateCell, upsert};

pub struct PersonaStore {
    api: Arc<dyn Api>,
    state: StateCell<Persona>,
}

impl PersonaStore {
    pub fn new(api: Arc<dyn Api>) -> Self {
        PersonaStore {
            api,
            state: StateCell::new(),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot<Persona>> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<Persona>>> {
        self.state.subscribe()
    }

    /// Replace the whole list with the server's.
    pub async fn fetch(&self) -> Result<()> {
        self.state.begin();
        match self.api.list_personas().await {
            Ok(records) => {
                let personas: Vec<Persona> = records.into_iter().map(Persona::from).collect();
                self.state.succeed(|_| personas);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn add(&self, form: PersonaForm) -> Result<Persona> {
        let draft = match form.into_draft() {
            Ok(draft) => draft,
            Err(errors) => {
                self.state.fail(&errors);
                return Err(errors.into());
            }
        };

        self.state.begin();
        match self.api.create_persona(&draft.to_payload()).await {
            Ok(record) => {
                let persona = Persona::from(record);
                let added = persona.clone();
                self.state
                    .succeed(|items| upsert(items, added, |p| p.id == persona.id));
                Ok(persona)
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn update(&self, id: &str, form: PersonaForm) -> Result<Persona> {
        let draft = match form.into_draft() {
            Ok(draft) => draft,
            Err(errors) => {
                self.state.fail(&errors);
                return Err(errors.into());
            }
        };

        self.state.begin();
        match self.api.update_persona(id, &draft.to_payload()).await {
            Ok(record) => {
                let persona = Persona::from(record);
                let updated = persona.clone();
                self.state.succeed(|items| upsert(items, updated, |p| p.id == id));
                Ok(persona)
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Removed locally only once the server confirms. The server takes the
    /// persona's events with it; refetch any event store afterwards.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.state.begin();
        match self.api.delete_persona(id).await {
            Ok(()) => {
                self.state
                    .succeed(|items| items.iter().filter(|p| p.id != id).cloned().collect());
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub fn by_id(&self, id: &str) -> Option<Persona> {
        self.snapshot().items.iter().find(|p| p.id == id).cloned()
    }

    /// Look a persona up by id, or failing that by exact name.
    pub fn resolve(&self, id_or_name: &str) -> Option<Persona> {
        let snapshot = self.snapshot();
        snapshot
            .items
            .iter()
            .find(|p| p.id == id_or_name)
            .or_else(|| snapshot.items.iter().find(|p| p.name == id_or_name))
            .cloned()
    }
}
