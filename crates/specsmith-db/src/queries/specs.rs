//! Database query functions for the `specs` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Spec;

/// Insert a new spec row. Returns the inserted spec with server-generated
/// defaults (id, created_at).
pub async fn insert_spec(
    pool: &PgPool,
    goal: &str,
    users: &str,
    constraints: &str,
    template: &str,
) -> Result<Spec> {
    let spec = sqlx::query_as::<_, Spec>(
        "INSERT INTO specs (goal, users, constraints, template) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(goal)
    .bind(users)
    .bind(constraints)
    .bind(template)
    .fetch_one(pool)
    .await
    .context("failed to insert spec")?;

    Ok(spec)
}

/// Fetch a spec by its ID.
pub async fn get_spec(pool: &PgPool, id: Uuid) -> Result<Option<Spec>> {
    let spec = sqlx::query_as::<_, Spec>("SELECT * FROM specs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch spec")?;

    Ok(spec)
}

/// List the most recent specs, newest first.
///
/// Ties on `created_at` are broken by id so the order is stable.
pub async fn list_recent_specs(pool: &PgPool, limit: i64) -> Result<Vec<Spec>> {
    let specs = sqlx::query_as::<_, Spec>(
        "SELECT * FROM specs ORDER BY created_at DESC, id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to list specs")?;

    Ok(specs)
}
