//! HTTP错误响应

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use palm_core::{PalmError, RejectionReason};
use serde_json::json;
use tracing::error;

/// 接口错误
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    /// 上传被拒绝，消息为面向用户的提示
    pub fn rejected(reason: RejectionReason) -> Self {
        let error = match reason {
            RejectionReason::InvalidType => "invalid_type",
            RejectionReason::TooLarge => "too_large",
        };
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, error, reason.user_message())
    }
}

impl From<PalmError> for ApiError {
    fn from(err: PalmError) -> Self {
        match err {
            PalmError::NotFound(msg) => Self::not_found(msg),
            PalmError::Upload(reason) => Self::rejected(reason),
            PalmError::InvalidStateTransition { .. } => Self::conflict(err.to_string()),
            other => {
                error!("Request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error,
            "message": self.message,
            "status": self.status.as_u16(),
        }));

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let err: ApiError = PalmError::NotFound("disease".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = PalmError::Upload(RejectionReason::TooLarge).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "File size must be less than 10MB");

        let err: ApiError = PalmError::Io(std::io::Error::other("disk")).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
