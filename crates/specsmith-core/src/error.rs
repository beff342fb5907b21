//! Error taxonomy for the generation-and-persistence pipeline.
//!
//! Every error carries an HTTP status so the serving layer can render a
//! uniform `{message, statusCode}` envelope without inspecting error
//! internals. Database errors are classified by Postgres SQLSTATE:
//! unique violations map to 409, foreign-key and not-null violations to
//! 400, anything else to a generic 400 (or 500 when the failure happened
//! outside the database itself).

use thiserror::Error;

/// SQLSTATE codes we map to specific HTTP statuses.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";

/// Errors that can occur anywhere in the create/list pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request field is missing or blank. Raised before any
    /// side effect.
    #[error("{0}")]
    Validation(String),

    /// The model service failed: missing credential, transport failure,
    /// non-success response, or a response with no completion text.
    #[error("model service error: {0}")]
    Upstream(String),

    /// The model output contained no JSON object candidate.
    #[error("no JSON object found in model output")]
    Extraction,

    /// The extracted candidate is not valid JSON.
    #[error("model returned invalid JSON: {0}")]
    MalformedResponse(String),

    /// A database operation failed. `code` is the Postgres SQLSTATE when
    /// the failure came from the database itself.
    #[error("database error: {message}")]
    Database {
        code: Option<String>,
        message: String,
    },
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Upstream(_) => 502,
            Self::Extraction | Self::MalformedResponse(_) => 500,
            Self::Database { code, .. } => match code.as_deref() {
                Some(UNIQUE_VIOLATION) => 409,
                Some(FOREIGN_KEY_VIOLATION) | Some(NOT_NULL_VIOLATION) => 400,
                Some(_) => 400,
                None => 500,
            },
        }
    }

    /// Classify an error from a query-layer call (which reports through
    /// `anyhow`). Walks the source chain looking for a `sqlx::Error` so
    /// the SQLSTATE survives any context wrapping.
    pub fn from_db_anyhow(err: anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
            .and_then(|sqlx_err| sqlx_err.as_database_error())
            .and_then(|db_err| db_err.code())
            .map(|c| c.to_string());

        Self::Database {
            code,
            message: format!("{err:#}"),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|c| c.to_string());
        Self::Database {
            code,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError::Validation("field \"goal\" is required".into());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn upstream_maps_to_502() {
        let err = ApiError::Upstream("connection refused".into());
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn extraction_and_malformed_map_to_500() {
        assert_eq!(ApiError::Extraction.status_code(), 500);
        assert_eq!(
            ApiError::MalformedResponse("expected value".into()).status_code(),
            500
        );
    }

    #[test]
    fn unique_violation_maps_to_409() {
        let err = ApiError::Database {
            code: Some("23505".into()),
            message: "duplicate key".into(),
        };
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn constraint_violations_map_to_400() {
        for code in ["23503", "23502"] {
            let err = ApiError::Database {
                code: Some(code.into()),
                message: "constraint".into(),
            };
            assert_eq!(err.status_code(), 400, "code {code}");
        }
    }

    #[test]
    fn other_database_codes_map_to_400() {
        let err = ApiError::Database {
            code: Some("42P01".into()),
            message: "relation does not exist".into(),
        };
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn non_database_sqlx_errors_map_to_500() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn from_db_anyhow_preserves_sqlstate_through_context() {
        use anyhow::Context;

        let inner: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        let wrapped = inner.context("failed to fetch spec").unwrap_err();
        let err = ApiError::from_db_anyhow(wrapped);
        match &err {
            ApiError::Database { code, message } => {
                assert!(code.is_none());
                assert!(message.contains("failed to fetch spec"));
            }
            other => panic!("expected Database, got: {other}"),
        }
    }
}
