use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_core::errors::{ApplicationError, InterfaceError};
use catalog_db::StoreError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Every failure leaving the HTTP surface goes through here so the body is always
/// `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    pub fn not_found() -> Self {
        Self(InterfaceError::not_found("Not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(InterfaceError::bad_request(message))
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self(InterfaceError::internal(detail))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self(InterfaceError::from(ApplicationError::from(value)))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(InterfaceError::bad_request(value.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self(InterfaceError::bad_request(value.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self(InterfaceError::bad_request(value.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            InterfaceError::Internal { message } => {
                error!(event_name = "http.request.internal_error", detail = %message, "request failed");
            }
            InterfaceError::BadRequest { message } => {
                warn!(event_name = "http.request.rejected", detail = %message, "request rejected");
            }
            InterfaceError::NotFound { .. } | InterfaceError::Conflict { .. } => {}
        }

        (status, Json(ErrorBody { error: self.0.user_message().to_owned() })).into_response()
    }
}
