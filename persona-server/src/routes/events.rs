//! Event endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use persona_core::event::NotificationSetting;
use persona_core::sync::{sync_event_best_effort, unsync_event_best_effort};
use persona_core::wire::{EventPayload, EventRecord, NewEvent};
use persona_core::{Event, EventFilter, EventQuery, PersonaError};

use crate::routes::{AppError, SuccessResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}

/// GET /api/events?personaIds=&startDate=&endDate=&searchText=&tags=
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<EventRecord>>, AppError> {
    let filter = EventFilter::try_from(query)?;
    Ok(Json(state.repo.list_events(&filter).await?))
}

/// Title, start and persona must be present and the persona must exist.
async fn checked(
    state: &AppState,
    payload: EventPayload,
) -> Result<(NewEvent, Vec<NotificationSetting>), AppError> {
    let (event, notifications) = payload.validate()?;

    if state.repo.get_persona(&event.persona_id).await?.is_none() {
        return Err(PersonaError::PersonaNotFound(event.persona_id).into());
    }

    Ok((event, notifications))
}

/// Notification rows are secondary; a failure here doesn't fail the write.
async fn store_notifications(state: &AppState, event_id: &str, settings: &[NotificationSetting]) {
    if let Err(e) = state.repo.replace_notifications(event_id, settings).await {
        tracing::error!(event_id, error = %e, "Error creating notifications");
    }
}

async fn fetch(state: &AppState, id: &str) -> Result<EventRecord, AppError> {
    state
        .repo
        .get_event(id)
        .await?
        .ok_or_else(|| PersonaError::EventNotFound(id.to_string()).into())
}

/// POST /api/events
async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<EventPayload>,
) -> Result<(StatusCode, Json<EventRecord>), AppError> {
    let (event, notifications) = checked(&state, payload).await?;

    let record = state.repo.insert_event(event).await?;
    if !notifications.is_empty() {
        store_notifications(&state, &record.id, &notifications).await;
    }
    tracing::info!(event_id = %record.id, title = %record.title, "created event");

    if let Some(remote) = &state.remote {
        let event = Event::from(fetch(&state, &record.id).await?);
        sync_event_best_effort(state.repo.as_ref(), remote.as_ref(), &event, &state.zone).await;
    }

    let record = fetch(&state, &record.id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/events/{id}
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventRecord>, AppError> {
    Ok(Json(fetch(&state, &id).await?))
}

/// PUT /api/events/{id} - notification settings are replaced wholesale
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<EventRecord>, AppError> {
    let (event, notifications) = checked(&state, payload).await?;

    state.repo.update_event(&id, event).await?;
    store_notifications(&state, &id, &notifications).await;

    Ok(Json(fetch(&state, &id).await?))
}

/// DELETE /api/events/{id}
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    // The remote id lives on the row, so this has to happen first
    if let Some(remote) = &state.remote {
        unsync_event_best_effort(state.repo.as_ref(), remote.as_ref(), &id).await;
    }

    state.repo.delete_event(&id).await?;
    tracing::info!(event_id = %id, "deleted event");
    Ok(Json(SuccessResponse { success: true }))
}
