use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: ApiErrorInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorInfo {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

/// Closed set of client-visible error kinds. Every domain error converts
/// into one of these, and the HTTP status is decided here and nowhere else.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        code: String,
        message: String,
        details: Option<String>,
    },
    Unauthenticated {
        code: String,
        message: String,
        details: Option<String>,
    },
    Unauthorized {
        code: String,
        message: String,
        details: Option<String>,
    },
    NotFound {
        code: String,
        message: String,
        details: Option<String>,
    },
    Conflict {
        code: String,
        message: String,
        details: Option<String>,
    },
    UnprocessableEntity {
        code: String,
        message: String,
        details: Option<String>,
    },
    InternalServerError {
        code: String,
        message: String,
        details: Option<String>,
    },
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::BadRequest {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn bad_request_with_details(
        code: &str, message: &str, details: &str,
    ) -> Self {
        Self::BadRequest {
            code: code.to_string(),
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    pub fn unauthenticated(message: &str) -> Self {
        Self::Unauthenticated {
            code: "UNAUTHENTICATED".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn unauthorized(code: &str, message: &str) -> Self {
        Self::Unauthorized {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn not_found(code: &str, message: &str) -> Self {
        Self::NotFound {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self::Conflict {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn unprocessable_entity(code: &str, message: &str) -> Self {
        Self::UnprocessableEntity {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn internal_server_error(message: &str) -> Self {
        Self::InternalServerError {
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UnprocessableEntity { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::InternalServerError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn parts(&self) -> (&String, &String, &Option<String>) {
        match self {
            Self::BadRequest {
                code,
                message,
                details,
            }
            | Self::Unauthenticated {
                code,
                message,
                details,
            }
            | Self::Unauthorized {
                code,
                message,
                details,
            }
            | Self::NotFound {
                code,
                message,
                details,
            }
            | Self::Conflict {
                code,
                message,
                details,
            }
            | Self::UnprocessableEntity {
                code,
                message,
                details,
            }
            | Self::InternalServerError {
                code,
                message,
                details,
            } => (code, message, details),
        }
    }

    fn to_response_data(&self) -> ApiErrorResponse {
        let (code, message, details) = self.parts();

        ApiErrorResponse {
            error: ApiErrorInfo {
                code: code.clone(),
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, message, _) = self.parts();
        write!(f, "{}", message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let response_data = self.to_response_data();
        (status, Json(response_data)).into_response()
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for AppError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::internal_server_error(&format!(
            "An unexpected error occurred: {}",
            err
        ))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal_server_error(&format!(
            "An unexpected error occurred: {}",
            err
        ))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_kinds() {
        assert_eq!(
            AppError::not_found("X", "x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthenticated("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::unauthorized("X", "x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::conflict("X", "x").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::bad_request("X", "x").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_data_carries_code_and_message() {
        let err = AppError::conflict("STATUS_UNCHANGED", "statuses matched");
        let data = err.to_response_data();
        assert_eq!(data.error.code, "STATUS_UNCHANGED");
        assert_eq!(data.error.message, "statuses matched");
        assert!(data.error.details.is_none());
    }
}
