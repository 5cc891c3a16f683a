/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - identity middleware は app 側で v1 全体に掛ける
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{households::current_household, me::me, session::session};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(session))
        .route("/me", get(me))
        .route("/households/current", get(current_household))
}
