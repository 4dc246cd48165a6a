//! HTTP error mapping
//!
//! Every failure leaves the server as `{ "code": "ERR_…", "message": "…" }`
//! with a status derived from the error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ruledesk_core::errors::{ExError, ExErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug)]
pub struct ApiError(ExError);

impl ApiError {
    pub fn inner(&self) -> &ExError {
        &self.0
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind())
    }
}

pub fn status_for(kind: ExErrorKind) -> StatusCode {
    match kind {
        ExErrorKind::NotFound => StatusCode::NOT_FOUND,
        ExErrorKind::Parse => StatusCode::UNPROCESSABLE_ENTITY,
        ExErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ExErrorKind::Conflict => StatusCode::CONFLICT,
        ExErrorKind::Allocation => StatusCode::SERVICE_UNAVAILABLE,
        ExErrorKind::Persistence
        | ExErrorKind::Serialization
        | ExErrorKind::Io
        | ExErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ExError> for ApiError {
    fn from(err: ExError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(err_code = self.0.code(), error = %self.0, "request failed");
        } else {
            tracing::debug!(err_code = self.0.code(), error = %self.0, "request rejected");
        }
        let message = if self.0.message().is_empty() {
            self.0.to_string()
        } else {
            self.0.message().to_string()
        };
        let body = ErrorBody {
            code: self.0.code().to_string(),
            message,
            request_id: self.0.request_id().map(|id| id.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ExErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ExErrorKind::Parse), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ExErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ExErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ExErrorKind::Allocation), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_for(ExErrorKind::Persistence),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
