//! In-process repository with optional JSON write-through.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PersonaError, PersonaResult};
use crate::event::NotificationSetting;
use crate::filter::EventFilter;
use crate::repository::Repository;
use crate::wire::{EventRecord, NewEvent, NewPersona, NotificationRecord, PersonaRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    personas: Vec<PersonaRecord>,
    events: Vec<EventRecord>,
}

impl Tables {
    /// An event row with its persona joined in.
    fn joined(&self, event: &EventRecord) -> EventRecord {
        let mut event = event.clone();
        event.personas = self
            .personas
            .iter()
            .find(|p| p.id == event.persona_id)
            .cloned()
            .map(Box::new);
        event
    }

    fn event_mut(&mut self, id: &str) -> PersonaResult<&mut EventRecord> {
        self.events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| PersonaError::EventNotFound(id.to_string()))
    }
}

/// Keeps every table in memory. When opened with a path, the whole
/// dataset is rewritten to that JSON file after each mutation.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
    path: Option<PathBuf>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path` if it exists, otherwise start empty. Later
    /// mutations are written back to `path`.
    pub async fn open(path: impl Into<PathBuf>) -> PersonaResult<Self> {
        let path = path.into();

        let tables = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                PersonaError::Storage(format!("Could not parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(MemoryRepository {
            tables: RwLock::new(tables),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply `change` to a copy of the tables and write it out. The copy
    /// replaces the live tables only once the write succeeded.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Tables) -> PersonaResult<T>,
    ) -> PersonaResult<T> {
        let mut tables = self.tables.write().await;

        let mut next = tables.clone();
        let value = change(&mut next)?;
        self.persist(&next).await?;

        *tables = next;
        Ok(value)
    }

    async fn persist(&self, tables: &Tables) -> PersonaResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(tables)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

fn notification_rows(event_id: &str, settings: &[NotificationSetting]) -> Vec<NotificationRecord> {
    settings
        .iter()
        .map(|s| NotificationRecord {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            channel: s.channel,
            minutes_before: s.minutes_before,
        })
        .collect()
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_personas(&self) -> PersonaResult<Vec<PersonaRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.personas.clone())
    }

    async fn get_persona(&self, id: &str) -> PersonaResult<Option<PersonaRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.personas.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_persona(&self, persona: NewPersona) -> PersonaResult<PersonaRecord> {
        let record = PersonaRecord {
            id: Uuid::new_v4().to_string(),
            name: persona.name,
            color: persona.color,
            description: persona.description,
            created_at: Utc::now(),
            events: None,
        };

        self.commit(|tables| {
            tables.personas.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn update_persona(&self, id: &str, persona: NewPersona) -> PersonaResult<PersonaRecord> {
        self.commit(|tables| {
            let record = tables
                .personas
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| PersonaError::PersonaNotFound(id.to_string()))?;
            record.name = persona.name;
            record.color = persona.color;
            record.description = persona.description;
            Ok(record.clone())
        })
        .await
    }

    async fn delete_persona(&self, id: &str) -> PersonaResult<()> {
        self.commit(|tables| {
            tables.personas.retain(|p| p.id != id);
            tables.events.retain(|e| e.persona_id != id);
            Ok(())
        })
        .await
    }

    async fn list_events(&self, filter: &EventFilter) -> PersonaResult<Vec<EventRecord>> {
        let tables = self.tables.read().await;

        let mut events: Vec<EventRecord> = tables
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .map(|e| tables.joined(e))
            .collect();
        events.sort_by_key(|e| e.start);

        Ok(events)
    }

    async fn get_event(&self, id: &str) -> PersonaResult<Option<EventRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| tables.joined(e)))
    }

    async fn insert_event(&self, event: NewEvent) -> PersonaResult<EventRecord> {
        let record = EventRecord {
            id: Uuid::new_v4().to_string(),
            title: event.title,
            description: event.description,
            start: event.start,
            end: event.end,
            persona_id: event.persona_id,
            tags: event.tags,
            repeat: event.repeat,
            notification_settings: Vec::new(),
            personas: None,
            google_calendar_id: None,
            created_at: Utc::now(),
        };

        self.commit(|tables| {
            let joined = tables.joined(&record);
            tables.events.push(record);
            Ok(joined)
        })
        .await
    }

    async fn update_event(&self, id: &str, event: NewEvent) -> PersonaResult<EventRecord> {
        self.commit(|tables| {
            let record = tables.event_mut(id)?;
            record.title = event.title;
            record.description = event.description;
            record.start = event.start;
            record.end = event.end;
            record.persona_id = event.persona_id;
            record.tags = event.tags;
            record.repeat = event.repeat;
            let record = record.clone();
            Ok(tables.joined(&record))
        })
        .await
    }

    async fn delete_event(&self, id: &str) -> PersonaResult<()> {
        self.commit(|tables| {
            tables.events.retain(|e| e.id != id);
            Ok(())
        })
        .await
    }

    async fn replace_notifications(
        &self,
        event_id: &str,
        settings: &[NotificationSetting],
    ) -> PersonaResult<Vec<NotificationRecord>> {
        let rows = notification_rows(event_id, settings);
        self.commit(|tables| {
            tables.event_mut(event_id)?.notification_settings = rows.clone();
            Ok(rows)
        })
        .await
    }

    async fn external_id(&self, event_id: &str) -> PersonaResult<Option<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == event_id)
            .and_then(|e| e.google_calendar_id.clone()))
    }

    async fn set_external_id(&self, event_id: &str, external_id: &str) -> PersonaResult<()> {
        self.commit(|tables| {
            tables.event_mut(event_id)?.google_calendar_id = Some(external_id.to_string());
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Repeat;
    use chrono::{DateTime, Duration};

    fn persona(name: &str) -> NewPersona {
        NewPersona {
            name: name.to_string(),
            color: "#3B82F6".to_string(),
            description: None,
        }
    }

    fn event(title: &str, persona_id: &str, start: DateTime<Utc>) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: None,
            start,
            end: Some(start + Duration::hours(1)),
            persona_id: persona_id.to_string(),
            tags: vec![],
            repeat: Repeat::None,
        }
    }

    #[tokio::test]
    async fn test_events_are_listed_in_start_order_with_persona_joined() {
        let repo = MemoryRepository::new();
        let dev = repo.insert_persona(persona("개발자")).await.unwrap();
        let now = Utc::now();

        repo.insert_event(event("later", &dev.id, now + Duration::hours(5))).await.unwrap();
        repo.insert_event(event("sooner", &dev.id, now)).await.unwrap();

        let events = repo.list_events(&EventFilter::default()).await.unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["sooner", "later"]);
        assert_eq!(events[0].personas.as_ref().unwrap().name, "개발자");
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let repo = MemoryRepository::new();
        let err = repo
            .update_event("missing", event("x", "p", Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, PersonaError::EventNotFound(_)));
    }

    #[tokio::test]
    async fn test_replace_notifications_overwrites_previous_rows() {
        let repo = MemoryRepository::new();
        let p = repo.insert_persona(persona("엄마")).await.unwrap();
        let e = repo.insert_event(event("school run", &p.id, Utc::now())).await.unwrap();

        repo.replace_notifications(&e.id, &[NotificationSetting::push(10), NotificationSetting::email(60)])
            .await
            .unwrap();
        repo.replace_notifications(&e.id, &[NotificationSetting::email(1440)])
            .await
            .unwrap();

        let stored = repo.get_event(&e.id).await.unwrap().unwrap();
        assert_eq!(stored.notification_settings.len(), 1);
        assert_eq!(stored.notification_settings[0].minutes_before, 1440);
    }

    #[tokio::test]
    async fn test_delete_persona_takes_its_events() {
        let repo = MemoryRepository::new();
        let mother = repo.insert_persona(persona("엄마")).await.unwrap();
        let dev = repo.insert_persona(persona("개발자")).await.unwrap();
        let now = Utc::now();
        repo.insert_event(event("pickup", &mother.id, now)).await.unwrap();
        repo.insert_event(event("dinner", &mother.id, now)).await.unwrap();
        repo.insert_event(event("deploy", &dev.id, now)).await.unwrap();

        repo.delete_persona(&mother.id).await.unwrap();

        let events = repo.list_events(&EventFilter::default()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "deploy");
        assert!(repo.get_persona(&mother.id).await.unwrap().is_none());

        // missing ids are fine
        repo.delete_persona(&mother.id).await.unwrap();
        repo.delete_event("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_open_reloads_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let repo = MemoryRepository::open(&path).await.unwrap();
        let p = repo.insert_persona(persona("연구자")).await.unwrap();
        let e = repo.insert_event(event("paper draft", &p.id, Utc::now())).await.unwrap();
        repo.replace_notifications(&e.id, &[NotificationSetting::push(30)])
            .await
            .unwrap();
        drop(repo);

        let reopened = MemoryRepository::open(&path).await.unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        let events = reopened.list_events(&EventFilter::default()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].notification_settings.len(), 1);
        assert_eq!(events[0].personas.as_ref().unwrap().name, "연구자");
    }

    #[tokio::test]
    async fn test_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();

        let err = MemoryRepository::open(&path).await.unwrap_err();
        assert!(matches!(err, PersonaError::Storage(_)));
    }

    #[tokio::test]
    async fn test_external_id_is_remembered() {
        let repo = MemoryRepository::new();
        let p = repo.insert_persona(persona("투자자")).await.unwrap();
        let e = repo.insert_event(event("market open", &p.id, Utc::now())).await.unwrap();

        assert_eq!(repo.external_id(&e.id).await.unwrap(), None);
        repo.set_external_id(&e.id, "g-123").await.unwrap();
        assert_eq!(repo.external_id(&e.id).await.unwrap().as_deref(), Some("g-123"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_tables_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let repo = MemoryRepository::open(&path).await.unwrap();
        let p = repo.insert_persona(persona("엄마")).await.unwrap();
        repo.insert_event(event("pickup", &p.id, Utc::now())).await.unwrap();

        // a directory in place of the data file makes every write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(repo.insert_persona(persona("개발자")).await.is_err());
        assert_eq!(repo.list_personas().await.unwrap().len(), 1);

        assert!(repo.delete_persona(&p.id).await.is_err());
        assert!(repo.get_persona(&p.id).await.unwrap().is_some());
        assert_eq!(repo.list_events(&EventFilter::default()).await.unwrap().len(), 1);
    }
}
