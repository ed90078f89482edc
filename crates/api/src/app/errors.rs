use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use printfleet_forecast::ForecastError;
use printfleet_infra::DispatchError;

/// HTTP status and stable error code for a rejected command.
fn classify(err: &DispatchError) -> (StatusCode, &'static str) {
    match err {
        DispatchError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DispatchError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        DispatchError::Concurrency(_) => (StatusCode::CONFLICT, "conflict"),
        DispatchError::InvariantViolation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation"),
        DispatchError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
    }
}

pub fn dispatch_error_to_response(err: DispatchError) -> Response {
    let (status, code) = classify(&err);
    tracing::warn!(status = status.as_u16(), code, error = %err, "command rejected");

    let message = match err {
        DispatchError::Validation(msg)
        | DispatchError::Concurrency(msg)
        | DispatchError::InvariantViolation(msg)
        | DispatchError::Store(msg) => msg,
        DispatchError::NotFound => "not found".to_string(),
    };
    json_error(status, code, message)
}

pub fn forecast_error_to_response(err: ForecastError) -> Response {
    let ForecastError::InvalidArgument(msg) = err;
    json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg)
}

/// `{ "error": code, "message": text }` with the given status.
pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let body = json!({ "error": code, "message": message.into() });
    (status, axum::Json(body)).into_response()
}

/// Malformed query string (missing field, non-numeric value, bad date).
pub fn query_rejection(rejection: QueryRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}

/// Unreadable JSON body; keeps axum's status (400, 415 or 422).
pub fn json_rejection(rejection: JsonRejection) -> Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn not_found(what: &str) -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}

pub fn invalid_id(what: &str) -> Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
}
