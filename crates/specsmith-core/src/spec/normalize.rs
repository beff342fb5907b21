//! Parsing and structural normalization of the extracted candidate.
//!
//! The candidate comes from an untrusted generator, so nothing about its
//! shape is assumed: the three collection keys default to empty when
//! absent or mistyped, and items missing their required content fields
//! are dropped deterministically (with a warning) instead of flowing
//! null content into storage.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;

/// A user story as normalized from model output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryItem {
    /// Model-supplied item id (or 1-based position when absent).
    #[serde(rename = "id")]
    pub external_id: String,
    pub story: String,
}

/// An engineering task as normalized from model output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskItem {
    #[serde(rename = "id")]
    pub external_id: String,
    pub task: String,
}

/// A risk with its mitigation as normalized from model output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskItem {
    #[serde(rename = "id")]
    pub external_id: String,
    pub risk: String,
    pub mitigation: String,
}

/// The normalized triple of item collections for one brief.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub user_stories: Vec<StoryItem>,
    pub engineering_tasks: Vec<TaskItem>,
    pub risks: Vec<RiskItem>,
}

impl GeneratedPlan {
    pub fn is_empty(&self) -> bool {
        self.user_stories.is_empty() && self.engineering_tasks.is_empty() && self.risks.is_empty()
    }
}

/// Parse the candidate substring as JSON and normalize it into a
/// [`GeneratedPlan`].
///
/// Fails with [`ApiError::MalformedResponse`] when the candidate is not
/// valid JSON. Structural deviations do not fail: missing or mistyped
/// collections become empty, malformed items are dropped.
pub fn normalize_plan(candidate: &str) -> Result<GeneratedPlan, ApiError> {
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

    let mut plan = GeneratedPlan::default();

    for (index, item) in items_of(&value, "userStories").iter().enumerate() {
        match string_field(item, "story") {
            Some(story) => plan.user_stories.push(StoryItem {
                external_id: external_id_of(item, index),
                story,
            }),
            None => warn!(index, "dropping user story without a \"story\" field"),
        }
    }

    for (index, item) in items_of(&value, "engineeringTasks").iter().enumerate() {
        match string_field(item, "task") {
            Some(task) => plan.engineering_tasks.push(TaskItem {
                external_id: external_id_of(item, index),
                task,
            }),
            None => warn!(index, "dropping engineering task without a \"task\" field"),
        }
    }

    for (index, item) in items_of(&value, "risks").iter().enumerate() {
        match (string_field(item, "risk"), string_field(item, "mitigation")) {
            (Some(risk), Some(mitigation)) => plan.risks.push(RiskItem {
                external_id: external_id_of(item, index),
                risk,
                mitigation,
            }),
            _ => warn!(index, "dropping risk without \"risk\" and \"mitigation\" fields"),
        }
    }

    Ok(plan)
}

/// The array under `key`, or empty when the key is absent or not an array.
fn items_of<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    match value.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            warn!(key, "collection is not an array; treating as empty");
            &[]
        }
        None => &[],
    }
}

/// A required string field of an item. `None` when absent, null, or not
/// a string.
fn string_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

/// The model-supplied item id, accepted as number or string and
/// normalized to a string. Falls back to the 1-based position.
fn external_id_of(item: &Value, index: usize) -> String {
    match item.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => (index + 1).to_string(),
    }
}
