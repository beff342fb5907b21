//! Database query functions for the three child-item tables.
//!
//! Each spec owns three item collections (user stories, engineering
//! tasks, risks). Rows come back in insertion order (`created_at`, then
//! id as tiebreaker). The `*_for_specs` variants fetch children for a
//! whole batch of specs in one query so listing does not issue a query
//! per parent row.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EngineeringTaskRow, RiskRow, UserStoryRow};

/// Insert one user story for a spec.
pub async fn insert_user_story(
    pool: &PgPool,
    spec_id: Uuid,
    external_id: Option<&str>,
    content: &str,
) -> Result<UserStoryRow> {
    let row = sqlx::query_as::<_, UserStoryRow>(
        "INSERT INTO user_stories (external_id, content, spec_id) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(external_id)
    .bind(content)
    .bind(spec_id)
    .fetch_one(pool)
    .await
    .context("failed to insert user story")?;

    Ok(row)
}

/// Insert one engineering task for a spec.
pub async fn insert_engineering_task(
    pool: &PgPool,
    spec_id: Uuid,
    external_id: Option<&str>,
    content: &str,
) -> Result<EngineeringTaskRow> {
    let row = sqlx::query_as::<_, EngineeringTaskRow>(
        "INSERT INTO engineering_tasks (external_id, content, spec_id) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(external_id)
    .bind(content)
    .bind(spec_id)
    .fetch_one(pool)
    .await
    .context("failed to insert engineering task")?;

    Ok(row)
}

/// Insert one risk (with mitigation) for a spec.
pub async fn insert_risk(
    pool: &PgPool,
    spec_id: Uuid,
    external_id: Option<&str>,
    risk: &str,
    mitigation: &str,
) -> Result<RiskRow> {
    let row = sqlx::query_as::<_, RiskRow>(
        "INSERT INTO risks (external_id, risk, mitigation, spec_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(external_id)
    .bind(risk)
    .bind(mitigation)
    .bind(spec_id)
    .fetch_one(pool)
    .await
    .context("failed to insert risk")?;

    Ok(row)
}

/// Fetch all user stories for one spec, in insertion order.
pub async fn list_user_stories_for_spec(pool: &PgPool, spec_id: Uuid) -> Result<Vec<UserStoryRow>> {
    let rows = sqlx::query_as::<_, UserStoryRow>(
        "SELECT * FROM user_stories WHERE spec_id = $1 ORDER BY created_at, id",
    )
    .bind(spec_id)
    .fetch_all(pool)
    .await
    .context("failed to list user stories")?;

    Ok(rows)
}

/// Fetch all engineering tasks for one spec, in insertion order.
pub async fn list_engineering_tasks_for_spec(
    pool: &PgPool,
    spec_id: Uuid,
) -> Result<Vec<EngineeringTaskRow>> {
    let rows = sqlx::query_as::<_, EngineeringTaskRow>(
        "SELECT * FROM engineering_tasks WHERE spec_id = $1 ORDER BY created_at, id",
    )
    .bind(spec_id)
    .fetch_all(pool)
    .await
    .context("failed to list engineering tasks")?;

    Ok(rows)
}

/// Fetch all risks for one spec, in insertion order.
pub async fn list_risks_for_spec(pool: &PgPool, spec_id: Uuid) -> Result<Vec<RiskRow>> {
    let rows = sqlx::query_as::<_, RiskRow>(
        "SELECT * FROM risks WHERE spec_id = $1 ORDER BY created_at, id",
    )
    .bind(spec_id)
    .fetch_all(pool)
    .await
    .context("failed to list risks")?;

    Ok(rows)
}

/// Fetch user stories for a batch of specs in one query.
pub async fn user_stories_for_specs(
    pool: &PgPool,
    spec_ids: &[Uuid],
) -> Result<Vec<UserStoryRow>> {
    let rows = sqlx::query_as::<_, UserStoryRow>(
        "SELECT * FROM user_stories WHERE spec_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(spec_ids)
    .fetch_all(pool)
    .await
    .context("failed to batch-fetch user stories")?;

    Ok(rows)
}

/// Fetch engineering tasks for a batch of specs in one query.
pub async fn engineering_tasks_for_specs(
    pool: &PgPool,
    spec_ids: &[Uuid],
) -> Result<Vec<EngineeringTaskRow>> {
    let rows = sqlx::query_as::<_, EngineeringTaskRow>(
        "SELECT * FROM engineering_tasks WHERE spec_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(spec_ids)
    .fetch_all(pool)
    .await
    .context("failed to batch-fetch engineering tasks")?;

    Ok(rows)
}

/// Fetch risks for a batch of specs in one query.
pub async fn risks_for_specs(pool: &PgPool, spec_ids: &[Uuid]) -> Result<Vec<RiskRow>> {
    let rows = sqlx::query_as::<_, RiskRow>(
        "SELECT * FROM risks WHERE spec_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(spec_ids)
    .fetch_all(pool)
    .await
    .context("failed to batch-fetch risks")?;

    Ok(rows)
}
