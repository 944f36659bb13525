//! Actors repository for database operations.
//!
//! All queries use parameterized statements.

use crate::errors::CastingError;
use crate::models::{Actor, CreateActorRequest, UpdateActorRequest};
use crate::observability::metrics;
use sqlx::{PgPool, Row};
use std::time::Instant;
use tracing::instrument;

/// Actors repository for database operations.
pub struct ActorsRepository;

impl ActorsRepository {
    /// List all actors ordered by id.
    #[instrument(skip_all, name = "casting.repo.list_actors")]
    pub async fn list(pool: &PgPool) -> Result<Vec<Actor>, CastingError> {
        let start = Instant::now();

        let rows = sqlx::query("SELECT id, name, age, gender FROM actors ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("list_actors", "error", start.elapsed());
                CastingError::from(e)
            })?;

        metrics::record_db_query("list_actors", "success", start.elapsed());

        Ok(rows.into_iter().map(map_row_to_actor).collect())
    }

    /// Fetch one actor by id.
    ///
    /// Returns `None` if no such actor exists.
    #[instrument(skip_all, name = "casting.repo.get_actor", fields(actor_id = id))]
    pub async fn get(pool: &PgPool, id: i32) -> Result<Option<Actor>, CastingError> {
        let start = Instant::now();

        let row = sqlx::query("SELECT id, name, age, gender FROM actors WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("get_actor", "error", start.elapsed());
                CastingError::from(e)
            })?;

        metrics::record_db_query("get_actor", "success", start.elapsed());

        Ok(row.map(map_row_to_actor))
    }

    /// Insert a new actor and return the stored row.
    ///
    /// The request must already be validated.
    #[instrument(skip_all, name = "casting.repo.create_actor")]
    pub async fn create(pool: &PgPool, request: &CreateActorRequest) -> Result<Actor, CastingError> {
        let start = Instant::now();

        let row = sqlx::query(
            r#"
            INSERT INTO actors (name, age, gender)
            VALUES ($1, $2, $3)
            RETURNING id, name, age, gender
            "#,
        )
        .bind(request.name.trim()) // $1
        .bind(request.age) // $2
        .bind(&request.gender) // $3
        .fetch_one(pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("create_actor", "error", start.elapsed());
            CastingError::from(e)
        })?;

        metrics::record_db_query("create_actor", "success", start.elapsed());

        let actor = map_row_to_actor(row);
        tracing::info!(target: "casting.repo.actors", actor_id = actor.id, "Actor created");
        Ok(actor)
    }

    /// Apply the supplied fields to an actor.
    ///
    /// Absent fields keep their stored value. Returns `None` if no such
    /// actor exists.
    #[instrument(skip_all, name = "casting.repo.update_actor", fields(actor_id = id))]
    pub async fn update(
        pool: &PgPool,
        id: i32,
        request: &UpdateActorRequest,
    ) -> Result<Option<Actor>, CastingError> {
        let start = Instant::now();

        let row = sqlx::query(
            r#"
            UPDATE actors
            SET name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender)
            WHERE id = $1
            RETURNING id, name, age, gender
            "#,
        )
        .bind(id) // $1
        .bind(request.name.as_deref().map(str::trim)) // $2
        .bind(request.age) // $3
        .bind(request.gender.as_deref()) // $4
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("update_actor", "error", start.elapsed());
            CastingError::from(e)
        })?;

        metrics::record_db_query("update_actor", "success", start.elapsed());

        Ok(row.map(map_row_to_actor))
    }

    /// Delete an actor.
    ///
    /// Returns `false` if no such actor exists.
    #[instrument(skip_all, name = "casting.repo.delete_actor", fields(actor_id = id))]
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, CastingError> {
        let start = Instant::now();

        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("delete_actor", "error", start.elapsed());
                CastingError::from(e)
            })?;

        metrics::record_db_query("delete_actor", "success", start.elapsed());

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(target: "casting.repo.actors", actor_id = id, "Actor deleted");
        }
        Ok(deleted)
    }
}

fn map_row_to_actor(row: sqlx::postgres::PgRow) -> Actor {
    Actor {
        id: row.get("id"),
        name: row.get("name"),
        age: row.get("age"),
        gender: row.get("gender"),
    }
}
