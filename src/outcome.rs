//! Response shaping for the JSON boundary.
//!
//! `Envelope` is the `{"status":"success","data":...}` wrapper API consumers
//! receive. `FormOutcome` is the tagged result of a form submission; the
//! `Invalid` variant carries the submitted input back alongside the error map
//! so the rendering boundary can round-trip both.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::validation::FieldErrors;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Json<Envelope<T>> {
        Json(Envelope {
            status: "success",
            data,
        })
    }
}

/// Payload acknowledging an ownership-scoped delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

#[derive(Debug)]
pub enum FormOutcome<T, F> {
    Success(T),
    Created(T),
    Invalid { form: F, errors: FieldErrors },
    Denied(&'static str),
    Missing(&'static str),
}

impl<T, F> FormOutcome<T, F> {
    /// Validation failure that echoes the submitted form back to the caller.
    pub fn rejected(form: F, errors: FieldErrors) -> Self {
        FormOutcome::Invalid { form, errors }
    }
}

impl<T: Serialize, F: Serialize> IntoResponse for FormOutcome<T, F> {
    fn into_response(self) -> Response {
        match self {
            FormOutcome::Success(data) => Envelope::success(data).into_response(),
            FormOutcome::Created(data) => {
                (StatusCode::CREATED, Envelope::success(data)).into_response()
            }
            FormOutcome::Invalid { form, errors } => {
                let body = json!({
                    "status": "error",
                    "errors": errors,
                    "form": serde_json::to_value(form).unwrap_or(Value::Null),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            FormOutcome::Denied(message) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "status": "error", "message": message })),
            )
                .into_response(),
            FormOutcome::Missing(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "status": "error", "message": message })),
            )
                .into_response(),
        }
    }
}
