use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docbot::search::SearchError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application, converted into an
/// appropriate HTTP response per variant.
pub enum AppError {
    /// Errors from the retrieval pipeline (the `/retrieve` debug endpoint).
    Search(SearchError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::Search(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Search(err) => {
                error!("SearchError: {:?}", err);
                match err {
                    SearchError::Embedding(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Query embedding failed: {e}"),
                    ),
                    SearchError::ModelMismatch { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Index/embedder configuration mismatch: {err}"),
                    ),
                    SearchError::Index(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Vector index error: {e}"),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
