use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::FieldErrors;

/// Application error taxonomy. Repositories surface these unmodified; the
/// `IntoResponse` impl maps them to client-facing JSON at the boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Authentication required")]
    Unauthorized,

    #[error("validation failed")]
    Validation(FieldErrors),

    /// Storage-level uniqueness violation, reported against the offending field.
    #[error("{field} is already in use")]
    Conflict { field: &'static str },

    /// Foreign-key violation: the referenced row does not exist.
    #[error("referenced record does not exist")]
    InvalidReference,

    #[error(transparent)]
    Database(sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Classifies a sqlx error into the taxonomy. Unique violations are mapped
    /// to a field name via the constraint that fired.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    let field = match db.constraint() {
                        Some(c) if c.contains("email") => "email",
                        Some(c) if c.contains("username") => "username",
                        Some(c) if c.contains("ratings") => "rating",
                        _ => "record",
                    };
                    return AppError::Conflict { field };
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return AppError::InvalidReference;
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }

    pub fn conflict_message(field: &str) -> String {
        match field {
            "email" => "Email already in use".into(),
            "username" => "Username already in use".into(),
            other => format!("{other} already in use"),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::from_db(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "status": "error", "message": message })),
            )
                .into_response(),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "status": "error", "message": "Authentication required" })),
            )
                .into_response(),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "status": "error", "errors": errors })),
            )
                .into_response(),
            AppError::Conflict { field } => (
                StatusCode::CONFLICT,
                Json(json!({
                    "status": "error",
                    "errors": [{ "field": field, "message": Self::conflict_message(field) }],
                })),
            )
                .into_response(),
            AppError::InvalidReference => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "status": "error", "message": "Referenced record does not exist" })),
            )
                .into_response(),
            AppError::Database(e) => {
                error!(error = %e, "database error");
                generic_failure()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                generic_failure()
            }
        }
    }
}

// Infrastructure detail never reaches the client.
fn generic_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": "Something went wrong" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::NotFound("Recipe not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let resp = AppError::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn validation_maps_to_422() {
        let errors = FieldErrors::single("title", "Title is required");
        let resp = AppError::Validation(errors).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn conflict_maps_to_409_with_field_message() {
        let resp = AppError::Conflict { field: "email" }.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::conflict_message("email"), "Email already in use");
    }

    #[test]
    fn infrastructure_errors_stay_generic() {
        let resp = AppError::Internal(anyhow::anyhow!("pool exhausted")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
