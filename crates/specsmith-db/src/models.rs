//! Row types mapped from the four tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A specification: one persisted planning request.
///
/// Immutable once created; this crate exposes no update or delete path
/// for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Spec {
    pub id: Uuid,
    pub goal: String,
    pub users: String,
    pub constraints: String,
    pub template: String,
    pub created_at: DateTime<Utc>,
}

/// A user story generated by the model for one spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserStoryRow {
    pub id: Uuid,
    /// Item id as supplied by the model. Display data only, not unique.
    pub external_id: Option<String>,
    pub content: String,
    pub spec_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An engineering task generated by the model for one spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EngineeringTaskRow {
    pub id: Uuid,
    /// Item id as supplied by the model. Display data only, not unique.
    pub external_id: Option<String>,
    pub content: String,
    pub spec_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A risk (with mitigation) generated by the model for one spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RiskRow {
    pub id: Uuid,
    /// Item id as supplied by the model. Display data only, not unique.
    pub external_id: Option<String>,
    pub risk: String,
    pub mitigation: String,
    pub spec_id: Uuid,
    pub created_at: DateTime<Utc>,
}
