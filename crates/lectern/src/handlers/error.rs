use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use lectern_core::events::ValidationError;
use lectern_core::search::SearchError;
use lectern_core::storage::{repository_error_to_status_code, RepositoryError};

/// Application error type that wraps `anyhow::Error`.
///
/// This allows using `?` on functions that return `Result<_, anyhow::Error>`
/// to automatically convert them into `Result<_, AppError>`. Known error
/// types are mapped to their HTTP status; everything else is a 500.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(validation) = self.0.downcast_ref::<ValidationError>() {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": validation.to_string() })),
            )
                .into_response();
        }

        if let Some(search) = self.0.downcast_ref::<SearchError>() {
            tracing::warn!(error = %search, "Search index unavailable");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": search.to_string() })),
            )
                .into_response();
        }

        let status_code = if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status_code.is_server_error() {
            tracing::error!(error = %self.0, "Application error");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
