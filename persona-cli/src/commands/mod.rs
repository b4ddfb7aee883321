pub mod events;
pub mod holidays;
pub mod personas;
pub mod stock;
pub mod sync;

use anyhow::Result;
use persona_cli::store::PersonaStore;
use persona_core::Persona;

/// Fetch personas and resolve `id_or_name` among them.
pub async fn require_persona(store: &PersonaStore, id_or_name: &str) -> Result<Persona> {
    store.fetch().await?;
    match store.resolve(id_or_name) {
        Some(persona) => Ok(persona),
        None => {
            let available: Vec<String> =
                store.snapshot().items.iter().map(|p| p.name.clone()).collect();
            anyhow::bail!(
                "Persona '{}' not found. Available: {}",
                id_or_name,
                available.join(", ")
            )
        }
    }
}
