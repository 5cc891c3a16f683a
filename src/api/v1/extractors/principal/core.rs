use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::{CurrentPrincipal, MaybePrincipal};
use crate::error::AppError;
use crate::services::identity::SecurityContext;

// SecurityContext が無い = identity middleware 未設定。anonymous と同じく principal なし扱い
fn installed(parts: &Parts) -> Option<CurrentPrincipal> {
    parts
        .extensions
        .get::<SecurityContext>()
        .and_then(SecurityContext::shared_principal)
        .map(CurrentPrincipal)
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        installed(parts).ok_or(AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(installed(parts).map(|p| p.0)))
    }
}
