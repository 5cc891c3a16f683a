/*
 * Responsibility
 * - GET /me: 現在の principal の claim を返す
 * - 値の取り出しは reader 経由のみ (claim が無ければ null)
 */
use axum::Json;

use crate::api::v1::dto::me::{ClaimResponse, MeResponse};
use crate::api::v1::extractors::CurrentPrincipal;
use crate::error::AppError;
use crate::services::identity::reader;

pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Result<Json<MeResponse>, AppError> {
    let identity = principal.identity().ok_or(AppError::Unauthorized)?;

    Ok(Json(MeResponse {
        name: reader::get_name(identity)?.map(str::to_string),
        user_identifier: reader::get_user_identifier(identity)?.map(str::to_string),
        mail_address: reader::get_mail_address(identity)?.map(str::to_string),
        display_name: reader::get_display_name(identity)?.map(str::to_string),
        authentication_type: identity.authentication_type().to_string(),
        claims: identity.claims().iter().map(ClaimResponse::from).collect(),
    }))
}
