use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use persona_cli::api::Api;
use persona_cli::store::{EventStore, PersonaStore};
use persona_core::form::{EventForm, PersonaForm};
use persona_core::market::StockQuote;
use persona_core::wire::{
    EventPayload, EventRecord, NotificationRecord, PersonaPayload, PersonaRecord,
};
use persona_core::{CivilZone, EventDraft, EventFilter, EventQuery, NotificationChannel, Repeat};

/// In-memory server that counts every call and can be told to fail.
#[derive(Default)]
struct FakeApi {
    personas: Mutex<Vec<PersonaRecord>>,
    events: Mutex<Vec<EventRecord>>,
    calls: AtomicUsize,
    fail_writes: AtomicBool,
    fail_sync: AtomicBool,
    /// Behave like a server with a remote calendar: created events come
    /// back already carrying an external id.
    sync_on_create: AtomicBool,
    sync_calls: AtomicUsize,
}

impl FakeApi {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("Internal server error");
        }
        Ok(())
    }

    fn record(id: &str, payload: &EventPayload) -> Result<EventRecord> {
        let (event, notifications) = payload.clone().validate()?;
        Ok(EventRecord {
            id: id.to_string(),
            title: event.title,
            description: event.description,
            start: event.start,
            end: event.end,
            persona_id: event.persona_id,
            tags: event.tags,
            repeat: event.repeat,
            notification_settings: notifications
                .into_iter()
                .enumerate()
                .map(|(i, n)| NotificationRecord {
                    id: format!("{}-n{}", id, i),
                    event_id: id.to_string(),
                    channel: n.channel,
                    minutes_before: n.minutes_before,
                })
                .collect(),
            personas: None,
            google_calendar_id: None,
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Api for FakeApi {
    async fn list_personas(&self) -> Result<Vec<PersonaRecord>> {
        self.tick();
        Ok(self.personas.lock().unwrap().clone())
    }

    async fn create_persona(&self, payload: &PersonaPayload) -> Result<PersonaRecord> {
        self.tick();
        self.check_writes()?;
        let persona = payload.clone().validate()?;
        let mut personas = self.personas.lock().unwrap();
        let record = PersonaRecord {
            id: format!("p{}", personas.len() + 1),
            name: persona.name,
            color: persona.color,
            description: persona.description,
            created_at: Utc::now(),
            events: None,
        };
        personas.push(record.clone());
        Ok(record)
    }

    async fn update_persona(&self, id: &str, payload: &PersonaPayload) -> Result<PersonaRecord> {
        self.tick();
        self.check_writes()?;
        let persona = payload.clone().validate()?;
        let mut personas = self.personas.lock().unwrap();
        let Some(record) = personas.iter_mut().find(|p| p.id == id) else {
            anyhow::bail!("Persona not found");
        };
        record.name = persona.name;
        record.color = persona.color;
        record.description = persona.description;
        Ok(record.clone())
    }

    async fn delete_persona(&self, id: &str) -> Result<()> {
        self.tick();
        self.check_writes()?;
        self.personas.lock().unwrap().retain(|p| p.id != id);
        self.events.lock().unwrap().retain(|e| e.persona_id != id);
        Ok(())
    }

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>> {
        self.tick();
        let filter = EventFilter::try_from(query.clone())?;
        let mut events: Vec<EventRecord> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        Ok(events)
    }

    async fn create_event(&self, payload: &EventPayload) -> Result<EventRecord> {
        self.tick();
        self.check_writes()?;
        let mut events = self.events.lock().unwrap();
        let mut record = Self::record(&format!("e{}", events.len() + 1), payload)?;
        if self.sync_on_create.load(Ordering::SeqCst) {
            record.google_calendar_id = Some(format!("g-{}", record.id));
        }
        events.push(record.clone());
        Ok(record)
    }

    async fn update_event(&self, id: &str, payload: &EventPayload) -> Result<EventRecord> {
        self.tick();
        self.check_writes()?;
        let record = Self::record(id, payload)?;
        let mut events = self.events.lock().unwrap();
        let Some(existing) = events.iter_mut().find(|e| e.id == id) else {
            anyhow::bail!("Event not found");
        };
        *existing = record.clone();
        Ok(record)
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        self.tick();
        self.check_writes()?;
        self.events.lock().unwrap().retain(|e| e.id != id);
        Ok(())
    }

    async fn sync_event(&self, id: &str) -> Result<String> {
        self.tick();
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sync.load(Ordering::SeqCst) {
            anyhow::bail!("Google authentication required");
        }
        Ok(format!("g-{}", id))
    }

    async fn stock(&self, symbols: &[String]) -> Result<StockQuote> {
        self.tick();
        Ok(StockQuote::mock(symbols))
    }
}

fn stores(api: &Arc<FakeApi>) -> (PersonaStore, EventStore) {
    (
        PersonaStore::new(api.clone()),
        EventStore::new(api.clone(), CivilZone::kst()),
    )
}

fn form(persona_id: &str, date: (i32, u32, u32), start: &str, end: &str) -> EventForm {
    EventForm {
        title: "Standup".to_string(),
        persona_id: persona_id.to_string(),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        start_time: start.to_string(),
        end_time: end.to_string(),
        ..Default::default()
    }
}

async fn add_persona(store: &PersonaStore, name: &str) -> String {
    store
        .add(PersonaForm {
            name: name.to_string(),
            color: "#3B82F6".to_string(),
            description: String::new(),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn invalid_form_never_reaches_the_server() {
    let api = Arc::new(FakeApi::default());
    let (_, events) = stores(&api);

    let result = events.add(form("p1", (2025, 9, 1), "10:00", "09:00")).await;

    assert!(result.is_err());
    assert_eq!(api.calls(), 0);
    let snapshot = events.snapshot();
    assert!(snapshot.items.is_empty());
    assert!(snapshot.error.as_deref().unwrap().contains("time"));
}

#[tokio::test]
async fn created_event_reads_back_in_civil_time() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;

    let mut standup = form(&persona_id, (2025, 9, 1), "09:00", "09:15");
    standup.repeat = Repeat::Weekly;
    let event = events.add(standup).await.unwrap();

    assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap());
    assert_eq!(events.zone().time_of_day(event.start), "09:00");
    assert_eq!(event.repeat, Repeat::Weekly);
    assert_eq!(event.notifications.len(), 1);
    assert_eq!(event.notifications[0].channel, NotificationChannel::Push);

    // server side keeps the upper-case spelling
    let stored = api.events.lock().unwrap()[0].clone();
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["repeat"], "WEEKLY");
    assert_eq!(json["notification_settings"][0]["type"], "PUSH");

    assert_eq!(events.snapshot().items, vec![event]);
}

#[tokio::test]
async fn failed_sync_keeps_the_created_event() {
    let api = Arc::new(FakeApi::default());
    api.fail_sync.store(true, Ordering::SeqCst);
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;

    let event = events
        .add_and_sync(form(&persona_id, (2025, 9, 1), "09:00", "10:00"))
        .await
        .unwrap();

    assert_eq!(events.snapshot().items, vec![event.clone()]);
    assert_eq!(api.events.lock().unwrap().len(), 1);

    // an explicit sync surfaces the error but leaves the items alone
    assert!(events.sync(&event.id).await.is_err());
    let snapshot = events.snapshot();
    assert_eq!(snapshot.items, vec![event]);
    assert!(snapshot.error.is_some());
}

#[tokio::test]
async fn add_and_sync_skips_events_synced_on_create() {
    let api = Arc::new(FakeApi::default());
    api.sync_on_create.store(true, Ordering::SeqCst);
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;

    let event = events
        .add_and_sync(form(&persona_id, (2025, 9, 1), "09:00", "10:00"))
        .await
        .unwrap();

    assert_eq!(api.sync_calls.load(Ordering::SeqCst), 0);
    assert_eq!(events.snapshot().items, vec![event]);
}

#[tokio::test]
async fn add_and_sync_pushes_unsynced_events() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;

    events
        .add_and_sync(form(&persona_id, (2025, 9, 1), "09:00", "10:00"))
        .await
        .unwrap();

    assert_eq!(api.sync_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn explicit_sync_returns_remote_id() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;
    let event = events
        .add(form(&persona_id, (2025, 9, 1), "09:00", "10:00"))
        .await
        .unwrap();

    let before = events.snapshot();
    assert_eq!(events.sync(&event.id).await.unwrap(), format!("g-{}", event.id));
    assert_eq!(events.snapshot().items, before.items);
}

#[tokio::test]
async fn failed_write_leaves_items_unchanged() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;
    let event = events
        .add(form(&persona_id, (2025, 9, 1), "09:00", "10:00"))
        .await
        .unwrap();

    api.fail_writes.store(true, Ordering::SeqCst);

    assert!(
        events
            .add(form(&persona_id, (2025, 9, 2), "09:00", "10:00"))
            .await
            .is_err()
    );
    assert!(events.delete(&event.id).await.is_err());

    let snapshot = events.snapshot();
    assert_eq!(snapshot.items, vec![event]);
    assert_eq!(snapshot.error.as_deref(), Some("Internal server error"));
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn update_replaces_in_place() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;
    let first = events
        .add(form(&persona_id, (2025, 9, 1), "09:00", "10:00"))
        .await
        .unwrap();
    events
        .add(form(&persona_id, (2025, 9, 2), "09:00", "10:00"))
        .await
        .unwrap();

    let mut edit = EventForm::from_event(&first, events.zone());
    edit.title = "Retro".to_string();
    edit.start_time = "14:00".to_string();
    edit.end_time = "15:00".to_string();
    let updated = events.update(&first.id, edit).await.unwrap();

    let items = events.snapshot().items.clone();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], updated);
    assert_eq!(items[0].title, "Retro");
    assert_eq!(events.zone().time_of_day(items[0].start), "14:00");
}

#[tokio::test]
async fn fetch_replaces_the_collection() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let work = add_persona(&personas, "Developer").await;
    let home = add_persona(&personas, "Parent").await;

    events.add(form(&work, (2025, 9, 1), "09:00", "10:00")).await.unwrap();
    events.add(form(&home, (2025, 9, 1), "18:00", "19:00")).await.unwrap();

    let filter = EventFilter {
        persona_ids: vec![home.clone()],
        ..Default::default()
    };
    events.fetch(&filter).await.unwrap();

    let items = events.snapshot().items.clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].persona_id, home);
}

#[tokio::test]
async fn persona_delete_and_forget() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let work = add_persona(&personas, "Developer").await;
    let home = add_persona(&personas, "Parent").await;
    events.add(form(&work, (2025, 9, 1), "09:00", "10:00")).await.unwrap();
    events.add(form(&home, (2025, 9, 1), "18:00", "19:00")).await.unwrap();

    personas.delete(&work).await.unwrap();
    events.forget_persona(&work);

    assert!(personas.by_id(&work).is_none());
    assert!(events.by_persona(&work).is_empty());
    assert_eq!(events.by_persona(&home).len(), 1);
    assert_eq!(api.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn persona_resolve_by_id_or_name() {
    let api = Arc::new(FakeApi::default());
    let (personas, _) = stores(&api);
    let id = add_persona(&personas, "Runner").await;

    assert_eq!(personas.resolve(&id).unwrap().name, "Runner");
    assert_eq!(personas.resolve("Runner").unwrap().id, id);
    assert!(personas.resolve("Nobody").is_none());
}

#[tokio::test]
async fn invalid_persona_form_is_not_sent() {
    let api = Arc::new(FakeApi::default());
    let (personas, _) = stores(&api);

    let result = personas
        .add(PersonaForm {
            name: " ".to_string(),
            color: "#3B82F6".to_string(),
            description: String::new(),
        })
        .await;

    assert!(result.is_err());
    assert_eq!(api.calls(), 0);
    assert!(personas.snapshot().error.as_deref().unwrap().contains("name"));
}

#[tokio::test]
async fn upcoming_is_sorted_and_bounded() {
    let api = Arc::new(FakeApi::default());
    let (personas, events) = stores(&api);
    let persona_id = add_persona(&personas, "Developer").await;
    let now = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();

    // one past, seven inside the week (added in reverse), one beyond it
    let offsets = [-1, 6, 5, 4, 3, 2, 1, 0, 8];
    for days in offsets {
        let start = now + Duration::days(days) + Duration::hours(1);
        let draft = EventDraft {
            title: format!("day {}", days),
            description: None,
            start,
            end: Some(start + Duration::hours(1)),
            persona_id: persona_id.clone(),
            tags: vec![],
            repeat: Repeat::None,
            notifications: vec![],
        };
        events.add_draft(&draft).await.unwrap();
    }

    let upcoming = events.upcoming(now);
    let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["day 0", "day 1", "day 2", "day 3", "day 4"]);
}
