/*
 * Responsibility
 * - GET /households/current: household claim を持つ principal だけ通す
 * - claim が欠けていれば 403 (401 ではない。認証は済んでいる)
 */
use axum::Json;

use crate::api::v1::dto::households::HouseholdResponse;
use crate::api::v1::extractors::CurrentPrincipal;
use crate::error::AppError;
use crate::services::identity::reader;

pub async fn current_household(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<HouseholdResponse>, AppError> {
    let household_id = reader::get_household_id(&*principal)?
        .ok_or(AppError::forbidden("household membership required"))?;
    let role = reader::get_household_role(&*principal)?
        .ok_or(AppError::forbidden("household role required"))?;

    Ok(Json(HouseholdResponse {
        household_id: household_id.to_string(),
        role: role.to_string(),
    }))
}
