use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::repository::{REQUIRED_FIELDS, RepositoryError, UPDATABLE_FIELDS};
use crate::role::Role;
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Access token required")]
    Unauthenticated,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Access denied for role {role}")]
    Forbidden { role: Role, required: Vec<Role> },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid(_) => Self::InvalidOrExpiredToken,
            TokenError::Signing(msg) => Self::Internal(msg),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::InvalidOrExpiredToken | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Repository(err) => match err {
                RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
                RepositoryError::DuplicateEmail(_) => StatusCode::CONFLICT,
                RepositoryError::MissingRequiredFields | RepositoryError::NoFieldsProvided => {
                    StatusCode::BAD_REQUEST
                }
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Unauthenticated => json!({
                "error": "Access token required",
                "message": "Please provide Bearer token in Authorization header",
            }),
            ApiError::InvalidOrExpiredToken => json!({
                "error": "Invalid or expired token",
                "message": "Please login again to get a new token",
            }),
            ApiError::Forbidden { role, required } => {
                let names: Vec<String> = required
                    .iter()
                    .map(|r| r.as_str().to_uppercase())
                    .collect();
                json!({
                    "error": "Access denied",
                    "message": format!("{} role required", names.join(" or ")),
                    "yourRole": role,
                })
            }
            ApiError::InvalidCredentials => json!({ "error": "Invalid credentials" }),
            ApiError::Validation(msg) => json!({ "error": msg }),
            ApiError::Repository(err) => match err {
                RepositoryError::NotFound(_) => json!({
                    "error": "Employee not found",
                    "message": err.to_string(),
                }),
                RepositoryError::MissingRequiredFields => json!({
                    "error": err.to_string(),
                    "required": REQUIRED_FIELDS,
                }),
                RepositoryError::DuplicateEmail(_) => json!({
                    "error": "Email already exists",
                    "message": err.to_string(),
                }),
                RepositoryError::NoFieldsProvided => json!({
                    "error": err.to_string(),
                    "allowedFields": UPDATABLE_FIELDS,
                }),
            },
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error occurred");
                json!({
                    "error": "Internal server error",
                    "message": msg,
                })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
