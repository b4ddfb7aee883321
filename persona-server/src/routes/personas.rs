//! Persona endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use persona_core::wire::{PersonaPayload, PersonaRecord};
use persona_core::{EventFilter, PersonaError};

use crate::routes::{AppError, SuccessResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/personas", get(list_personas).post(create_persona))
        .route(
            "/api/personas/{id}",
            get(get_persona).put(update_persona).delete(delete_persona),
        )
}

/// GET /api/personas
async fn list_personas(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonaRecord>>, AppError> {
    Ok(Json(state.repo.list_personas().await?))
}

/// POST /api/personas
async fn create_persona(
    State(state): State<AppState>,
    Json(payload): Json<PersonaPayload>,
) -> Result<(StatusCode, Json<PersonaRecord>), AppError> {
    let persona = payload.validate()?;
    let record = state.repo.insert_persona(persona).await?;
    tracing::info!(persona_id = %record.id, name = %record.name, "created persona");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/personas/{id} - the persona with its events
async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonaRecord>, AppError> {
    let mut record = state
        .repo
        .get_persona(&id)
        .await?
        .ok_or_else(|| PersonaError::PersonaNotFound(id.clone()))?;

    let filter = EventFilter {
        persona_ids: vec![id],
        ..Default::default()
    };
    record.events = Some(state.repo.list_events(&filter).await?);

    Ok(Json(record))
}

/// PUT /api/personas/{id}
async fn update_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PersonaPayload>,
) -> Result<Json<PersonaRecord>, AppError> {
    let persona = payload.validate()?;
    Ok(Json(state.repo.update_persona(&id, persona).await?))
}

/// DELETE /api/personas/{id} - its events go with it
async fn delete_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.repo.delete_persona(&id).await?;
    tracing::info!(persona_id = %id, "deleted persona");
    Ok(Json(SuccessResponse { success: true }))
}
