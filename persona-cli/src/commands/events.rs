use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use persona_cli::api::Api;
use persona_cli::render;
use persona_cli::store::{EventStore, PersonaStore};
use persona_core::form::EventForm;
use persona_core::time::parse_date;
use persona_core::{CivilZone, EventFilter, NotificationChannel, NotificationSetting, Repeat};

pub struct ListArgs {
    pub persona: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub tags: Vec<String>,
}

pub struct AddArgs {
    pub title: String,
    pub persona: String,
    pub date: Option<String>,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub repeat: String,
    pub notify: Vec<String>,
    pub sync: bool,
}

fn print_events(events: &EventStore, personas: &PersonaStore) {
    let snapshot = events.snapshot();
    if snapshot.items.is_empty() {
        println!("{}", "No events".dimmed());
        return;
    }
    let lines = render::event_list(&snapshot.items, |id| personas.by_id(id), events.zone());
    for line in lines {
        println!("{}", line);
    }
}

pub async fn list(api: Arc<dyn Api>, args: ListArgs) -> Result<()> {
    let zone = CivilZone::kst();
    let personas = PersonaStore::new(api.clone());
    let events = EventStore::new(api, zone);

    let mut filter = EventFilter {
        search_text: args.search,
        tags: args.tags,
        ..Default::default()
    };

    match &args.persona {
        Some(id_or_name) => {
            let persona = super::require_persona(&personas, id_or_name).await?;
            filter.persona_ids.push(persona.id);
        }
        None => personas.fetch().await?,
    }

    if let Some(from) = &args.from {
        filter.start_date = Some(zone.compose(parse_date(from)?, "00:00")?);
    }
    if let Some(to) = &args.to {
        let last_minute = zone.compose(parse_date(to)?, "23:59")?;
        filter.end_date = Some(last_minute + Duration::seconds(59));
    }

    events.fetch(&filter).await?;
    print_events(&events, &personas);
    Ok(())
}

pub async fn add(api: Arc<dyn Api>, args: AddArgs) -> Result<()> {
    let zone = CivilZone::kst();
    let personas = PersonaStore::new(api.clone());
    let events = EventStore::new(api, zone);

    let persona = super::require_persona(&personas, &args.persona).await?;
    let date = match &args.date {
        Some(raw) => parse_date(raw)?,
        None => zone.now_local().date_naive(),
    };
    let notifications = args
        .notify
        .iter()
        .map(|raw| parse_notification(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut form = EventForm {
        title: args.title,
        description: args.description.unwrap_or_default(),
        persona_id: persona.id.clone(),
        date: Some(date),
        start_time: args.start,
        end_time: args.end,
        repeat: args.repeat.parse::<Repeat>()?,
        ..Default::default()
    };
    // without --notify the form's default reminder stays
    if !notifications.is_empty() {
        form.notifications = notifications;
    }
    for tag in &args.tags {
        form.add_tag(tag);
    }

    let event = if args.sync {
        events.add_and_sync(form).await?
    } else {
        events.add(form).await?
    };

    println!("{}", format!("  Created: {}", event.title).green());
    println!("{}", render::event_line(&event, Some(&persona), events.zone()));
    Ok(())
}

pub async fn remove(api: Arc<dyn Api>, id: &str) -> Result<()> {
    let events = EventStore::new(api, CivilZone::kst());
    events.delete(id).await?;
    println!("{}", format!("  Deleted: {}", id).red());
    Ok(())
}

pub async fn upcoming(api: Arc<dyn Api>) -> Result<()> {
    let zone = CivilZone::kst();
    let personas = PersonaStore::new(api.clone());
    let events = EventStore::new(api, zone);
    let now = Utc::now();

    personas.fetch().await?;
    let filter = EventFilter {
        start_date: Some(now),
        ..Default::default()
    };
    events.fetch(&filter).await?;

    let upcoming = events.upcoming(now);
    if upcoming.is_empty() {
        println!("{}", "Nothing in the next 7 days".dimmed());
        return Ok(());
    }
    let lines = render::event_list(&upcoming, |id| personas.by_id(id), events.zone());
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Parse `channel:minutes`, e.g. `push:15`.
fn parse_notification(raw: &str) -> Result<NotificationSetting> {
    let (channel, minutes) = raw
        .split_once(':')
        .with_context(|| format!("Expected channel:minutes, got '{}'", raw))?;
    let channel: NotificationChannel = channel.parse()?;
    let minutes_before: i64 = minutes
        .trim()
        .parse()
        .with_context(|| format!("Invalid minutes '{}'", minutes))?;
    Ok(NotificationSetting {
        channel,
        minutes_before,
    })
}
