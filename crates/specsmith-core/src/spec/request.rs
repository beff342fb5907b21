//! The creation request and its validation.

use serde::Deserialize;

use crate::error::ApiError;

/// A planning brief: the four inputs the model decomposes.
///
/// Fields default to empty when absent from the request body so a
/// missing field and a blank field fail validation identically.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSpecRequest {
    pub goal: String,
    pub users: String,
    pub constraints: String,
    pub template: String,
}

impl CreateSpecRequest {
    /// Check that all four fields are present and non-blank after
    /// trimming. Must pass before any side effect: no spec row is
    /// inserted and no model call is made for an invalid request.
    pub fn validate(&self) -> Result<(), ApiError> {
        let fields = [
            ("goal", &self.goal),
            ("users", &self.users),
            ("constraints", &self.constraints),
            ("template", &self.template),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!(
                    "field {name:?} is required and must not be blank"
                )));
            }
        }
        Ok(())
    }
}
