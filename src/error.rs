use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repository::RepoError;

/// ApiError
///
/// The complete failure taxonomy exposed by the HTTP surface. Every handler returns
/// `Result<_, ApiError>`, and this enum's `IntoResponse` impl is the single place
/// where failures are shaped into status codes and JSON bodies.
///
/// Clients only ever see the fixed messages below; internal detail (database errors,
/// token encoding failures) is logged server-side and surfaced as `Internal`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One message per failing field, in fixed field order.
    #[error("validación fallida")]
    Validation(Vec<String>),
    /// Missing/malformed credentials, bad signature, or expired token.
    #[error("no autorizado")]
    Unauthenticated,
    /// Valid token, but the carried role lacks the required privilege.
    #[error("prohibido")]
    Forbidden,
    #[error("no encontrado")]
    NotFound,
    /// Duplicate `cedula` (unique-key violation).
    #[error("la cédula ya existe")]
    Conflict,
    #[error("error interno")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Validation failures carry the full list of messages, not just the first.
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "No autorizado" })),
            )
                .into_response(),
            ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": "Prohibido" }))).into_response()
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "No encontrado" })),
            )
                .into_response(),
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "La cédula ya existe" })),
            )
                .into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Error interno" })),
            )
                .into_response(),
        }
    }
}

/// Maps repository failures into the public taxonomy. Unique-key violations become
/// 409 Conflict; unmatched rows become 404; everything else is logged and reported
/// as a generic 500 with no internal detail exposed to the caller.
impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation => ApiError::Conflict,
            RepoError::NotFound => ApiError::NotFound,
            RepoError::Database(e) => {
                tracing::error!("repository error: {:?}", e);
                ApiError::Internal
            }
        }
    }
}
