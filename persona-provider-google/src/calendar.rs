//! Google Calendar as a [`RemoteCalendar`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_calendar::Client;
use google_calendar::types::SendUpdates;
use persona_core::error::{PersonaError, PersonaResult};
use persona_core::sync::{ExternalEvent, RemoteCalendar};
use persona_core::time::expiry_after;
use tokio::sync::Mutex;

use crate::to_google::ToGoogle;

/// OAuth client and tokens for one Google account.
#[derive(Clone, Default)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

struct Session {
    access_token: String,
    refresh_token: String,
    /// Unknown until the first refresh.
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

pub struct GoogleCalendar {
    client_id: String,
    client_secret: String,
    calendar_id: String,
    session: Mutex<Session>,
}

impl GoogleCalendar {
    pub fn new(credentials: GoogleCredentials, calendar_id: impl Into<String>) -> Self {
        GoogleCalendar {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            calendar_id: calendar_id.into(),
            session: Mutex::new(Session {
                access_token: credentials.access_token,
                refresh_token: credentials.refresh_token,
                expires_at: None,
            }),
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn client_for(&self, session: &Session) -> Client {
        Client::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            String::new(),
            session.access_token.clone(),
            session.refresh_token.clone(),
        )
    }

    /// A client with a usable access token, refreshing first if the last
    /// one is known to have expired.
    async fn client(&self) -> Result<Client> {
        let mut session = self.session.lock().await;

        if session.is_expired() && !session.refresh_token.is_empty() {
            let tokens = self
                .client_for(&session)
                .refresh_access_token()
                .await
                .context("Failed to refresh Google access token")?;

            session.access_token = tokens.access_token;
            // Google typically doesn't return a new refresh_token on refresh
            if !tokens.refresh_token.is_empty() {
                session.refresh_token = tokens.refresh_token;
            }
            session.expires_at = expiry_after(Utc::now(), tokens.expires_in);
            tracing::debug!("refreshed Google access token");
        }

        Ok(self.client_for(&session))
    }

    /// After a 401 the next call refreshes before trying again.
    async fn note_failure(&self, error: &anyhow::Error) {
        let text = format!("{:#}", error);
        if text.contains("401") || text.contains("Unauthorized") {
            self.session.lock().await.expires_at = Some(Utc::now());
        }
    }

    async fn run<T>(&self, result: Result<T>) -> PersonaResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                self.note_failure(&e).await;
                Err(PersonaError::Remote(format!("{:#}", e)))
            }
        }
    }

    async fn try_insert(&self, event: &ExternalEvent) -> Result<String> {
        let client = self.client().await?;
        let google_event = event.to_google();

        let response = client
            .events()
            .insert(
                &self.calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", &google_event.summary))?;

        Ok(response.body.id)
    }

    async fn try_update(&self, external_id: &str, event: &ExternalEvent) -> Result<String> {
        let client = self.client().await?;
        let google_event = event.to_google();

        let response = client
            .events()
            .update(
                &self.calendar_id,
                external_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to update event: {}", external_id))?;

        Ok(response.body.id)
    }

    async fn try_delete(&self, external_id: &str) -> Result<()> {
        let client = self.client().await?;

        let result = client
            .events()
            .delete(&self.calendar_id, external_id, false, SendUpdates::None)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                // Already gone remotely
                let error_str = e.to_string();
                if error_str.contains("410") || error_str.contains("Gone") || error_str.contains("404") {
                    Ok(())
                } else {
                    Err(e).with_context(|| format!("Failed to delete event: {}", external_id))
                }
            }
        }
    }
}

#[async_trait]
impl RemoteCalendar for GoogleCalendar {
    fn name(&self) -> &str {
        "google"
    }

    async fn insert(&self, event: &ExternalEvent) -> PersonaResult<String> {
        let result = self.try_insert(event).await;
        self.run(result).await
    }

    async fn update(&self, external_id: &str, event: &ExternalEvent) -> PersonaResult<String> {
        let result = self.try_update(external_id, event).await;
        self.run(result).await
    }

    async fn delete(&self, external_id: &str) -> PersonaResult<()> {
        let result = self.try_delete(external_id).await;
        self.run(result).await
    }
}
