//! Actor CRUD handlers.
//!
//! Every handler sits behind a [`PermissionGate`](crate::middleware::PermissionGate)
//! route layer, so it only runs for tokens holding the route's permission.

use crate::errors::CastingError;
use crate::handlers::{parse_body, parse_id};
use crate::models::{
    ActorResponse, ActorsResponse, CreateActorRequest, DeleteResponse, UpdateActorRequest,
};
use crate::repositories::ActorsRepository;
use crate::routes::AppState;
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/actors
#[instrument(skip_all, name = "casting.actors.list")]
pub async fn list_actors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActorsResponse>, CastingError> {
    let actors = ActorsRepository::list(&state.pool).await?;
    Ok(Json(ActorsResponse::new(actors)))
}

/// Handler for GET /api/actors/{id}
///
/// # Response
///
/// - 200 OK: `{"success": true, "actor": {...}}`
/// - 404 Not Found: no actor with this id
#[instrument(skip_all, name = "casting.actors.get")]
pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ActorResponse>, CastingError> {
    let id = parse_id(id, "Actor")?;

    let actor = ActorsRepository::get(&state.pool, id)
        .await?
        .ok_or_else(|| CastingError::NotFound(format!("Actor with id: {id} not found")))?;

    Ok(Json(ActorResponse::new(actor)))
}

/// Handler for POST /api/actors
///
/// # Request Body
///
/// ```json
/// {"name": "Tilda Swinton", "age": 62, "gender": "F"}
/// ```
///
/// # Response
///
/// - 200 OK: `{"success": true, "actor": {...}}`
/// - 400 Bad Request: invalid JSON or field validation failure
#[instrument(skip_all, name = "casting.actors.create")]
pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ActorResponse>, CastingError> {
    let request: CreateActorRequest = parse_body(&body)?;
    request.validate().map_err(CastingError::BadRequest)?;

    let actor = ActorsRepository::create(&state.pool, &request).await?;

    Ok(Json(ActorResponse::new(actor)))
}

/// Handler for PATCH /api/actors/{id}
///
/// Only the supplied fields are changed. Responds with the updated actor
/// wrapped in a one-element `actors` list.
#[instrument(skip_all, name = "casting.actors.update")]
pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Result<Json<ActorsResponse>, CastingError> {
    let id = parse_id(id, "Actor")?;
    let request: UpdateActorRequest = parse_body(&body)?;

    if !request.has_changes() {
        return Err(CastingError::BadRequest("No changes provided".to_string()));
    }
    request.validate().map_err(CastingError::BadRequest)?;

    let actor = ActorsRepository::update(&state.pool, id, &request)
        .await?
        .ok_or_else(|| CastingError::NotFound("Actor not found".to_string()))?;

    Ok(Json(ActorsResponse::new(vec![actor])))
}

/// Handler for DELETE /api/actors/{id}
#[instrument(skip_all, name = "casting.actors.delete")]
pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeleteResponse>, CastingError> {
    let id = parse_id(id, "Actor")?;

    if !ActorsRepository::delete(&state.pool, id).await? {
        return Err(CastingError::NotFound("Actor not found.".to_string()));
    }

    Ok(Json(DeleteResponse::new(id)))
}
