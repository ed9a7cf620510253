use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docgate_core::ClassifyResponse;

/// Request failures, rendered in the same body shape as a classification.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No image data provided")]
    MissingImage,
    #[error("Image too large. Maximum size is 10MB.")]
    TooLarge,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::MissingImage => (
                StatusCode::BAD_REQUEST,
                Json(ClassifyResponse::failure("No image data provided", self.to_string())),
            )
                .into_response(),
            ApiError::TooLarge => (
                StatusCode::BAD_REQUEST,
                Json(ClassifyResponse::failure("Image too large", self.to_string())),
            )
                .into_response(),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(ClassifyResponse::failure(detail.clone(), self.to_string())),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "Classification request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "Internal server error",
                        "message": detail,
                        "is_academic": false,
                        "score": 0,
                        "text": "",
                        "reason": format!("Server error: {detail}"),
                    })),
                )
                    .into_response()
            }
        }
    }
}
