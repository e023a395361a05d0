use crate::domain::EntityDescriptor;
use crate::errors::Error;
use crate::transport::http::alerts::Alerts;
use crate::transport::http::types::ApiResponse;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        message: String,
        entity_name: &'static str,
        error_key: &'static str,
        headers: HeaderMap,
    },
    NotFound(String),
    UnsupportedMediaType(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a store-level failure. Bad sort directives are the client's
    /// fault; everything else surfaces as an opaque server error.
    pub fn from_store(alerts: &Alerts, descriptor: &'static EntityDescriptor, err: Error) -> Self {
        match err {
            Error::InvalidSort(msg) => alerts.bad_request(descriptor, msg, "invalidsort"),
            other => {
                tracing::warn!(entity = descriptor.entity_name, error = %other, "store operation failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::BadRequest {
                message,
                entity_name,
                error_key,
                headers,
            } => (
                status,
                headers,
                Json(ApiResponse {
                    success: false,
                    data: Some(serde_json::json!({
                        "entityName": entity_name,
                        "errorKey": error_key
                    })),
                    error: Some(message),
                }),
            )
                .into_response(),
            ApiError::NotFound(message)
            | ApiError::UnsupportedMediaType(message)
            | ApiError::Internal(message) => (
                status,
                Json(ApiResponse {
                    success: false,
                    data: None,
                    error: Some(message),
                }),
            )
                .into_response(),
        }
    }
}
