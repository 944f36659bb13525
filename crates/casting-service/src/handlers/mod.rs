//! HTTP request handlers for the casting service.

pub mod actors;
pub mod health;
pub mod metrics;
pub mod movies;

pub use actors::{create_actor, delete_actor, get_actor, list_actors, update_actor};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use movies::{create_movie, delete_movie, get_movie, list_movies, update_movie};

use crate::errors::CastingError;
use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use serde::de::DeserializeOwned;

/// Deserialize a JSON request body.
///
/// Done by hand so malformed bodies get the service's 400 envelope rather
/// than Axum's default 422 plain-text rejection.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CastingError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "casting.handlers", error = %e, "Invalid request body");
        CastingError::BadRequest("Invalid request body".to_string())
    })
}

/// Resolve a record id path segment. A non-integer id names no record.
pub(crate) fn parse_id(
    id: Result<Path<i32>, PathRejection>,
    resource: &str,
) -> Result<i32, CastingError> {
    id.map(|Path(id)| id).map_err(|e| {
        tracing::debug!(target: "casting.handlers", error = %e, "Invalid record id");
        CastingError::NotFound(format!("{resource} not found"))
    })
}
