use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;
use persona_cli::api::Api;
use persona_cli::store::EventStore;
use persona_core::CivilZone;

pub async fn run(api: Arc<dyn Api>, event_id: &str) -> Result<()> {
    let store = EventStore::new(api, CivilZone::kst());
    let remote_id = store.sync(event_id).await?;

    println!(
        "{} {}",
        "  Synced to Google Calendar:".green(),
        remote_id.dimmed()
    );
    Ok(())
}
