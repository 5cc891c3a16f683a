/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - IdentityError / RepoError を統一的に変換 (identity 系はすべて fail-closed)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::identity::IdentityError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {reason}")]
    Forbidden { reason: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn forbidden(reason: &'static str) -> Self {
        Self::Forbidden { reason }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "unauthorized".into(),
            ),
            AppError::Forbidden { reason } => (StatusCode::FORBIDDEN, "FORBIDDEN", reason.into()),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            // Malformed ticket: the credential is unusable.
            IdentityError::InvalidArgument(_) => AppError::Unauthorized,
            // Claims could not be completed; never proceed with partial trust.
            IdentityError::DependencyFailure(_) => AppError::Unauthorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::claim_store::ClaimStoreError;

    #[test]
    fn dependency_failure_fails_closed() {
        let err: AppError = IdentityError::DependencyFailure(ClaimStoreError::Timeout).into();

        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let res = AppError::forbidden("household membership required").into_response();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
