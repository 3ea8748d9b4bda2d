//! Admin perk lifecycle
//!
//! Every route here sits behind the admin gate, which supplies [`Admin`].

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{AdminPerkSummary, PerkCreate, PerkCreated, SetActive, UnlockRegenerated};

use super::ApiResult;
use super::extract::AppJson;
use crate::perk::Admin;
use crate::state::AppState;

/// GET /admin/perks
pub async fn list_perks(
    State(state): State<AppState>,
    Extension(admin): Extension<Admin>,
) -> ApiResult<Vec<AdminPerkSummary>> {
    Ok(Json(state.service.admin_summaries(&admin).await?))
}

/// POST /admin/perks/new
pub async fn create_perk(
    State(state): State<AppState>,
    Extension(admin): Extension<Admin>,
    AppJson(req): AppJson<PerkCreate>,
) -> ApiResult<PerkCreated> {
    Ok(Json(state.service.create_perk(&admin, req).await?))
}

/// POST /admin/perks/{perk_id}/active
pub async fn set_active(
    State(state): State<AppState>,
    Extension(admin): Extension<Admin>,
    Path(perk_id): Path<String>,
    AppJson(req): AppJson<SetActive>,
) -> ApiResult<serde_json::Value> {
    state.service.set_active(&admin, &perk_id, req.active).await?;
    Ok(Json(serde_json::json!({ "ok": true, "active": req.active })))
}

/// POST /admin/perks/{perk_id}/regenerate-unlock
pub async fn regenerate_unlock(
    State(state): State<AppState>,
    Extension(admin): Extension<Admin>,
    Path(perk_id): Path<String>,
) -> ApiResult<UnlockRegenerated> {
    Ok(Json(state.service.regenerate_unlock(&admin, &perk_id).await?))
}
