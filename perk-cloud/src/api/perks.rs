//! Public perk card and the caller's own pass

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{MyClaim, PerkCard};

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::state::AppState;

/// GET /perks/{perk_id}
pub async fn perk_card(
    State(state): State<AppState>,
    Path(perk_id): Path<String>,
) -> ApiResult<PerkCard> {
    let card = state
        .service
        .perk_card(&perk_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PerkNotFound))?;
    Ok(Json(card))
}

/// GET /perks/{perk_id}/claim
pub async fn my_claim(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(perk_id): Path<String>,
) -> ApiResult<MyClaim> {
    let claim = state
        .service
        .my_claim(&perk_id, &identity.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ClaimNotFound))?;
    Ok(Json(claim))
}
