//! The transport seam between the client stores and the server.

use anyhow::Result;
use async_trait::async_trait;
use persona_core::EventQuery;
use persona_core::market::StockQuote;
use persona_core::wire::{EventPayload, EventRecord, PersonaPayload, PersonaRecord};

/// Everything the client asks of the server. Bodies and responses are in
/// the server representation; translation happens in the stores.
#[async_trait]
pub trait Api: Send + Sync {
    async fn list_personas(&self) -> Result<Vec<PersonaRecord>>;

    async fn create_persona(&self, payload: &PersonaPayload) -> Result<PersonaRecord>;

    async fn update_persona(&self, id: &str, payload: &PersonaPayload) -> Result<PersonaRecord>;

    async fn delete_persona(&self, id: &str) -> Result<()>;

    async fn list_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>>;

    async fn create_event(&self, payload: &EventPayload) -> Result<EventRecord>;

    async fn update_event(&self, id: &str, payload: &EventPayload) -> Result<EventRecord>;

    async fn delete_event(&self, id: &str) -> Result<()>;

    /// Push one event to the external calendar. Returns its remote id.
    async fn sync_event(&self, id: &str) -> Result<String>;

    async fn stock(&self, symbols: &[String]) -> Result<StockQuote>;
}
