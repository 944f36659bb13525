//! Movies repository for database operations.

use crate::errors::CastingError;
use crate::models::{CreateMovieRequest, Movie, UpdateMovieRequest};
use crate::observability::metrics;
use sqlx::{PgPool, Row};
use std::time::Instant;
use tracing::instrument;

/// Movies repository for database operations.
pub struct MoviesRepository;

impl MoviesRepository {
    /// List all movies ordered by id.
    #[instrument(skip_all, name = "casting.repo.list_movies")]
    pub async fn list(pool: &PgPool) -> Result<Vec<Movie>, CastingError> {
        let start = Instant::now();

        let rows = sqlx::query("SELECT id, title, release_date FROM movies ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("list_movies", "error", start.elapsed());
                CastingError::from(e)
            })?;

        metrics::record_db_query("list_movies", "success", start.elapsed());

        Ok(rows.into_iter().map(map_row_to_movie).collect())
    }

    /// Fetch one movie by id.
    #[instrument(skip_all, name = "casting.repo.get_movie", fields(movie_id = id))]
    pub async fn get(pool: &PgPool, id: i32) -> Result<Option<Movie>, CastingError> {
        let start = Instant::now();

        let row = sqlx::query("SELECT id, title, release_date FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("get_movie", "error", start.elapsed());
                CastingError::from(e)
            })?;

        metrics::record_db_query("get_movie", "success", start.elapsed());

        Ok(row.map(map_row_to_movie))
    }

    /// Insert a new movie and return the stored row.
    #[instrument(skip_all, name = "casting.repo.create_movie")]
    pub async fn create(pool: &PgPool, request: &CreateMovieRequest) -> Result<Movie, CastingError> {
        let start = Instant::now();

        let row = sqlx::query(
            r#"
            INSERT INTO movies (title, release_date)
            VALUES ($1, $2)
            RETURNING id, title, release_date
            "#,
        )
        .bind(request.title.trim()) // $1
        .bind(request.release_date) // $2
        .fetch_one(pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("create_movie", "error", start.elapsed());
            CastingError::from(e)
        })?;

        metrics::record_db_query("create_movie", "success", start.elapsed());

        let movie = map_row_to_movie(row);
        tracing::info!(target: "casting.repo.movies", movie_id = movie.id, "Movie created");
        Ok(movie)
    }

    /// Apply the supplied fields to a movie. Absent fields keep their value.
    #[instrument(skip_all, name = "casting.repo.update_movie", fields(movie_id = id))]
    pub async fn update(
        pool: &PgPool,
        id: i32,
        request: &UpdateMovieRequest,
    ) -> Result<Option<Movie>, CastingError> {
        let start = Instant::now();

        let row = sqlx::query(
            r#"
            UPDATE movies
            SET title = COALESCE($2, title),
                release_date = COALESCE($3, release_date)
            WHERE id = $1
            RETURNING id, title, release_date
            "#,
        )
        .bind(id) // $1
        .bind(request.title.as_deref().map(str::trim)) // $2
        .bind(request.release_date) // $3
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("update_movie", "error", start.elapsed());
            CastingError::from(e)
        })?;

        metrics::record_db_query("update_movie", "success", start.elapsed());

        Ok(row.map(map_row_to_movie))
    }

    /// Delete a movie. Returns `false` if no such movie exists.
    #[instrument(skip_all, name = "casting.repo.delete_movie", fields(movie_id = id))]
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, CastingError> {
        let start = Instant::now();

        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("delete_movie", "error", start.elapsed());
                CastingError::from(e)
            })?;

        metrics::record_db_query("delete_movie", "success", start.elapsed());

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(target: "casting.repo.movies", movie_id = id, "Movie deleted");
        }
        Ok(deleted)
    }
}

fn map_row_to_movie(row: sqlx::postgres::PgRow) -> Movie {
    Movie {
        id: row.get("id"),
        title: row.get("title"),
        release_date: row.get("release_date"),
    }
}
