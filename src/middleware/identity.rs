//! ticket 読み取り → identity pipeline 実行 → SecurityContext を extensions に入れる
//!
//! - ticket は auth cookie を優先し、なければ `Authorization: Bearer <ticket>` を見る
//! - 検証に失敗した ticket は「ticket なし」として扱う (anonymous)
//! - pipeline のエラーはここで log し、fail-closed (401) で返す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, error, warn};

use crate::error::AppError;
use crate::services::identity::{IdentityError, SecurityContext};
use crate::services::ticket::AuthenticationTicket;
use crate::state::AppState;

/// `/api/v1/*` に identity pipeline を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = middleware::identity::apply(api::v1::routes(), state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, identity_middleware))
}

async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ticket = read_ticket(&state, req.headers());

    let mut ctx = SecurityContext::new();
    match state.pipeline.run(ticket.as_ref(), &mut ctx).await {
        Ok(pipeline_state) => {
            debug!(state = ?pipeline_state, "identity pipeline finished");
        }
        Err(err) => {
            match &err {
                IdentityError::DependencyFailure(cause) => {
                    error!(error = %cause, "claim augmentation failed; rejecting request");
                }
                IdentityError::InvalidArgument(reason) => {
                    warn!(reason = %reason, "unusable authentication ticket");
                }
            }
            return Err(err.into());
        }
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

fn read_ticket(state: &AppState, headers: &HeaderMap) -> Option<AuthenticationTicket> {
    let raw = ticket_from_cookie(headers, &state.ticket_cookie_name)
        .or_else(|| ticket_from_bearer(headers))?;

    match state.tickets.decode(raw) {
        Ok(ticket) => Some(ticket),
        Err(err) => {
            warn!(error = %err, "ticket verification failed; continuing as anonymous");
            None
        }
    }
}

fn ticket_from_cookie<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value)
}

fn ticket_from_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
