//! Explicit external calendar sync

use axum::{Json, Router, extract::State, routing::post};
use persona_core::sync::sync_event;
use persona_core::{Event, PersonaError};
use serde::{Deserialize, Serialize};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/sync/google", post(sync_google))
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub event_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub google_event_id: String,
}

/// POST /api/sync/google - unlike the sync after create, errors here are
/// reported to the caller
async fn sync_google(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let remote = state.remote.as_ref().ok_or_else(|| {
        PersonaError::Unauthorized("Google authentication required".to_string())
    })?;

    let event_id = req
        .event_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| PersonaError::Validation("Event ID is required".to_string()))?;

    let record = state
        .repo
        .get_event(&event_id)
        .await?
        .ok_or_else(|| PersonaError::EventNotFound(event_id.clone()))?;

    let google_event_id = sync_event(
        state.repo.as_ref(),
        remote.as_ref(),
        &Event::from(record),
        &state.zone,
    )
    .await?;

    Ok(Json(SyncResponse {
        success: true,
        google_event_id,
    }))
}
