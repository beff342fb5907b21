//! Spec service layer.
//!
//! Orchestrates the creation pipeline (validate, insert the parent spec,
//! prompt the model, extract and normalize its output, persist the item
//! collections) and composite retrieval for listing.
//!
//! The parent spec is committed before the model is invoked, so a
//! persisted id exists even when generation later fails: a spec with
//! zero children is a legitimate outcome, not an error state. The child
//! inserts for one creation run inside a single transaction, so a
//! failure there rolls back every child rather than leaving a partially
//! populated collection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use specsmith_db::models::Spec;
use specsmith_db::queries::{items, specs};

use super::extract::extract_json_object;
use super::normalize::{GeneratedPlan, normalize_plan};
use super::prompt::{SYSTEM_PROMPT, build_prompt};
use super::request::CreateSpecRequest;
use crate::error::ApiError;
use crate::llm::ModelClient;

/// How many specs a listing returns at most.
pub const LIST_LIMIT: i64 = 5;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Response for a successful creation: the new spec id plus the
/// normalized items exactly as persisted.
#[derive(Debug, Serialize)]
pub struct CreateSpecResponse {
    #[serde(rename = "specsId")]
    pub specs_id: Uuid,
    #[serde(flatten)]
    pub plan: GeneratedPlan,
}

/// A persisted user story in the client-facing shape.
#[derive(Debug, Serialize)]
pub struct StoryView {
    pub id: Uuid,
    pub story: String,
}

/// A persisted engineering task in the client-facing shape.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub id: Uuid,
    pub task: String,
}

/// A persisted risk in the client-facing shape.
#[derive(Debug, Serialize)]
pub struct RiskView {
    pub id: Uuid,
    pub risk: String,
    pub mitigation: String,
}

/// One spec with its three item collections, as returned by listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecComposite {
    pub specs_id: Uuid,
    pub goal: String,
    pub users: String,
    pub constraints: String,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub user_stories: Vec<StoryView>,
    pub engineering_tasks: Vec<TaskView>,
    pub risks: Vec<RiskView>,
}

// ---------------------------------------------------------------------------
// Creation pipeline
// ---------------------------------------------------------------------------

/// Run the full creation pipeline for one brief.
///
/// Order matters: validation happens before any side effect, and the
/// spec row is committed before the model call so the caller always has
/// a durable id once validation passed. Errors from the model,
/// extraction, or normalization stages leave the parent row in place
/// with zero children.
pub async fn create_spec(
    pool: &PgPool,
    model: &dyn ModelClient,
    req: &CreateSpecRequest,
) -> Result<CreateSpecResponse, ApiError> {
    req.validate()?;

    let spec = specs::insert_spec(pool, &req.goal, &req.users, &req.constraints, &req.template)
        .await
        .map_err(ApiError::from_db_anyhow)?;

    info!(spec_id = %spec.id, "spec created, requesting decomposition");

    let prompt = build_prompt(req);
    let raw = model.complete(SYSTEM_PROMPT, &prompt).await?;

    let candidate = extract_json_object(&raw)?;
    let plan = normalize_plan(candidate)?;

    if plan.is_empty() {
        warn!(spec_id = %spec.id, "model output normalized to zero items");
    }

    persist_plan(pool, spec.id, &plan).await?;

    info!(
        spec_id = %spec.id,
        stories = plan.user_stories.len(),
        tasks = plan.engineering_tasks.len(),
        risks = plan.risks.len(),
        "generated plan persisted"
    );

    Ok(CreateSpecResponse {
        specs_id: spec.id,
        plan,
    })
}

/// Insert every item of a normalized plan, in originating order, inside
/// one transaction. A failure rolls the whole item set back; the parent
/// spec (committed earlier) is unaffected.
async fn persist_plan(pool: &PgPool, spec_id: Uuid, plan: &GeneratedPlan) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    for story in &plan.user_stories {
        sqlx::query(
            "INSERT INTO user_stories (external_id, content, spec_id) VALUES ($1, $2, $3)",
        )
        .bind(&story.external_id)
        .bind(&story.story)
        .bind(spec_id)
        .execute(&mut *tx)
        .await?;
    }

    for task in &plan.engineering_tasks {
        sqlx::query(
            "INSERT INTO engineering_tasks (external_id, content, spec_id) VALUES ($1, $2, $3)",
        )
        .bind(&task.external_id)
        .bind(&task.task)
        .bind(spec_id)
        .execute(&mut *tx)
        .await?;
    }

    for risk in &plan.risks {
        sqlx::query(
            "INSERT INTO risks (external_id, risk, mitigation, spec_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(&risk.external_id)
        .bind(&risk.risk)
        .bind(&risk.mitigation)
        .bind(spec_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// Fetch the most recent specs and assemble each with its item
/// collections.
///
/// Children for all listed specs are loaded in three batched queries and
/// grouped in memory, so the query count stays constant regardless of
/// how many specs the listing returns.
pub async fn list_specs(pool: &PgPool) -> Result<Vec<SpecComposite>, ApiError> {
    let recent = specs::list_recent_specs(pool, LIST_LIMIT)
        .await
        .map_err(ApiError::from_db_anyhow)?;

    if recent.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<Uuid> = recent.iter().map(|s| s.id).collect();

    let mut stories_by_spec: HashMap<Uuid, Vec<StoryView>> = HashMap::new();
    for row in items::user_stories_for_specs(pool, &ids)
        .await
        .map_err(ApiError::from_db_anyhow)?
    {
        stories_by_spec
            .entry(row.spec_id)
            .or_default()
            .push(StoryView {
                id: row.id,
                story: row.content,
            });
    }

    let mut tasks_by_spec: HashMap<Uuid, Vec<TaskView>> = HashMap::new();
    for row in items::engineering_tasks_for_specs(pool, &ids)
        .await
        .map_err(ApiError::from_db_anyhow)?
    {
        tasks_by_spec.entry(row.spec_id).or_default().push(TaskView {
            id: row.id,
            task: row.content,
        });
    }

    let mut risks_by_spec: HashMap<Uuid, Vec<RiskView>> = HashMap::new();
    for row in items::risks_for_specs(pool, &ids)
        .await
        .map_err(ApiError::from_db_anyhow)?
    {
        risks_by_spec.entry(row.spec_id).or_default().push(RiskView {
            id: row.id,
            risk: row.risk,
            mitigation: row.mitigation,
        });
    }

    let mut composites = Vec::with_capacity(recent.len());
    for spec in recent {
        composites.push(assemble(
            spec,
            &mut stories_by_spec,
            &mut tasks_by_spec,
            &mut risks_by_spec,
        ));
    }
    Ok(composites)
}

fn assemble(
    spec: Spec,
    stories: &mut HashMap<Uuid, Vec<StoryView>>,
    tasks: &mut HashMap<Uuid, Vec<TaskView>>,
    risks: &mut HashMap<Uuid, Vec<RiskView>>,
) -> SpecComposite {
    SpecComposite {
        user_stories: stories.remove(&spec.id).unwrap_or_default(),
        engineering_tasks: tasks.remove(&spec.id).unwrap_or_default(),
        risks: risks.remove(&spec.id).unwrap_or_default(),
        specs_id: spec.id,
        goal: spec.goal,
        users: spec.users,
        constraints: spec.constraints,
        template: spec.template,
        created_at: spec.created_at,
    }
}
