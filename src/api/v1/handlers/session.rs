/*
 * Responsibility
 * - GET /session: anonymous でも 200 を返す
 * - 認証済みかどうかと name だけを返す (layout の login 表示用)
 */
use axum::Json;

use crate::api::v1::dto::session::SessionResponse;
use crate::api::v1::extractors::MaybePrincipal;
use crate::error::AppError;
use crate::services::identity::reader;

pub async fn session(
    MaybePrincipal(principal): MaybePrincipal,
) -> Result<Json<SessionResponse>, AppError> {
    let Some(principal) = principal else {
        return Ok(Json(SessionResponse::anonymous()));
    };

    Ok(Json(SessionResponse {
        authenticated: true,
        name: reader::get_name(&*principal)?.map(str::to_string),
        display_name: reader::get_display_name(&*principal)?.map(str::to_string),
    }))
}
