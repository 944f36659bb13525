//! Movie CRUD handlers.

use crate::errors::CastingError;
use crate::handlers::{parse_body, parse_id};
use crate::models::{
    CreateMovieRequest, DeleteResponse, MovieResponse, MoviesResponse, UpdateMovieRequest,
};
use crate::repositories::MoviesRepository;
use crate::routes::AppState;
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/movies
#[instrument(skip_all, name = "casting.movies.list")]
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MoviesResponse>, CastingError> {
    let movies = MoviesRepository::list(&state.pool).await?;
    Ok(Json(MoviesResponse::new(movies)))
}

/// Handler for GET /api/movies/{id}
#[instrument(skip_all, name = "casting.movies.get")]
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MovieResponse>, CastingError> {
    let id = parse_id(id, "Movie")?;

    let movie = MoviesRepository::get(&state.pool, id)
        .await?
        .ok_or_else(|| CastingError::NotFound(format!("Movie with id: {id} not found")))?;

    Ok(Json(MovieResponse::new(movie)))
}

/// Handler for POST /api/movies
///
/// # Request Body
///
/// ```json
/// {"title": "Orlando", "release_date": "1992-09-01"}
/// ```
///
/// `release_date` is optional.
#[instrument(skip_all, name = "casting.movies.create")]
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<MovieResponse>, CastingError> {
    let request: CreateMovieRequest = parse_body(&body)?;
    request.validate().map_err(CastingError::BadRequest)?;

    let movie = MoviesRepository::create(&state.pool, &request).await?;

    Ok(Json(MovieResponse::new(movie)))
}

/// Handler for PATCH /api/movies/{id}
#[instrument(skip_all, name = "casting.movies.update")]
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Result<Json<MoviesResponse>, CastingError> {
    let id = parse_id(id, "Movie")?;
    let request: UpdateMovieRequest = parse_body(&body)?;

    if !request.has_changes() {
        return Err(CastingError::BadRequest("No changes provided".to_string()));
    }
    request.validate().map_err(CastingError::BadRequest)?;

    let movie = MoviesRepository::update(&state.pool, id, &request)
        .await?
        .ok_or_else(|| CastingError::NotFound("Movie not found".to_string()))?;

    Ok(Json(MoviesResponse::new(vec![movie])))
}

/// Handler for DELETE /api/movies/{id}
#[instrument(skip_all, name = "casting.movies.delete")]
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeleteResponse>, CastingError> {
    let id = parse_id(id, "Movie")?;

    if !MoviesRepository::delete(&state.pool, id).await? {
        return Err(CastingError::NotFound("Movie not found.".to_string()));
    }

    Ok(Json(DeleteResponse::new(id)))
}
