//! HTTP client for persona-server

use anyhow::{Context, Result};
use async_trait::async_trait;
use persona_core::EventQuery;
use persona_core::market::StockQuote;
use persona_core::wire::{EventPayload, EventRecord, PersonaPayload, PersonaRecord};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::Api;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4100";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncResponse {
    google_event_id: String,
}

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        HttpApi {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = request.send().await.context("Failed to connect to server")?;

        if !resp.status().is_success() {
            let status = resp.status();
            match resp.json::<ErrorResponse>().await {
                Ok(err) => anyhow::bail!("{}", err.error),
                Err(_) => anyhow::bail!("Server returned {}", status),
            }
        }

        Ok(resp)
    }

    async fn json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let resp = self.send(request).await?;
        resp.json().await.context("Failed to parse server response")
    }
}

#[async_trait]
impl Api for HttpApi {
    /// GET /api/personas
    async fn list_personas(&self) -> Result<Vec<PersonaRecord>> {
        self.json(self.http.get(self.url("/api/personas"))).await
    }

    /// POST /api/personas
    async fn create_persona(&self, payload: &PersonaPayload) -> Result<PersonaRecord> {
        self.json(self.http.post(self.url("/api/personas")).json(payload))
            .await
    }

    /// PUT /api/personas/{id}
    async fn update_persona(&self, id: &str, payload: &PersonaPayload) -> Result<PersonaRecord> {
        self.json(
            self.http
                .put(self.url(&format!("/api/personas/{}", id)))
                .json(payload),
        )
        .await
    }

    /// DELETE /api/personas/{id}
    async fn delete_persona(&self, id: &str) -> Result<()> {
        self.send(self.http.delete(self.url(&format!("/api/personas/{}", id))))
            .await?;
        Ok(())
    }

    /// GET /api/events
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>> {
        self.json(self.http.get(self.url("/api/events")).query(query))
            .await
    }

    /// POST /api/events
    async fn create_event(&self, payload: &EventPayload) -> Result<EventRecord> {
        self.json(self.http.post(self.url("/api/events")).json(payload))
            .await
    }

    /// PUT /api/events/{id}
    async fn update_event(&self, id: &str, payload: &EventPayload) -> Result<EventRecord> {
        self.json(
            self.http
                .put(self.url(&format!("/api/events/{}", id)))
                .json(payload),
        )
        .await
    }

    /// DELETE /api/events/{id}
    async fn delete_event(&self, id: &str) -> Result<()> {
        self.send(self.http.delete(self.url(&format!("/api/events/{}", id))))
            .await?;
        Ok(())
    }

    /// POST /api/sync/google
    async fn sync_event(&self, id: &str) -> Result<String> {
        let resp: SyncResponse = self
            .json(
                self.http
                    .post(self.url("/api/sync/google"))
                    .json(&serde_json::json!({ "eventId": id })),
            )
            .await?;
        Ok(resp.google_event_id)
    }

    /// GET /api/stock
    async fn stock(&self, symbols: &[String]) -> Result<StockQuote> {
        let mut request = self.http.get(self.url("/api/stock"));
        if !symbols.is_empty() {
            request = request.query(&[("symbols", symbols.join(","))]);
        }
        self.json(request).await
    }
}
