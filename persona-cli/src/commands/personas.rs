use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;
use persona_cli::api::Api;
use persona_cli::render;
use persona_cli::store::PersonaStore;
use persona_core::form::PersonaForm;

pub async fn list(api: Arc<dyn Api>) -> Result<()> {
    let store = PersonaStore::new(api);
    store.fetch().await?;

    let snapshot = store.snapshot();
    if snapshot.items.is_empty() {
        println!("{}", "No personas yet.".dimmed());
        return Ok(());
    }
    for persona in &snapshot.items {
        println!("{}", render::persona_line(persona));
    }
    Ok(())
}

pub async fn add(
    api: Arc<dyn Api>,
    name: String,
    color: String,
    description: Option<String>,
) -> Result<()> {
    let store = PersonaStore::new(api);
    let form = PersonaForm {
        name,
        color,
        description: description.unwrap_or_default(),
    };

    let persona = store.add(form).await?;
    println!("{}", format!("  Created: {}", persona.name).green());
    println!("{}", render::persona_line(&persona));
    Ok(())
}

/// Deleting a persona deletes its events on the server too.
pub async fn remove(api: Arc<dyn Api>, id_or_name: &str) -> Result<()> {
    let store = PersonaStore::new(api);
    let persona = super::require_persona(&store, id_or_name).await?;

    store.delete(&persona.id).await?;
    println!("{}", format!("  Deleted: {}", persona.name).red());
    Ok(())
}
