//! Staff unlock link and scanner counters

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::StaffProgress;

use super::ApiResult;
use crate::auth::staff::{session_cookie, session_from_headers};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UnlockQuery {
    pub t: Option<String>,
}

/// GET /perks/{perk_id}/staff/unlock?t={staffUnlockToken}
///
/// On a match, sets the staff session cookie and redirects to the scanner.
pub async fn unlock(
    State(state): State<AppState>,
    Path(perk_id): Path<String>,
    Query(query): Query<UnlockQuery>,
) -> Result<Response, AppError> {
    let presented = query.t.unwrap_or_default();
    let session = state
        .service
        .open_staff_session(&perk_id, presented.trim())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UnlockTokenInvalid))?;

    let cookie = session_cookie(&session, state.service.signer().ttl(), state.cookie_secure)
        .map_err(|e| {
            tracing::error!(perk_id = %perk_id, error = %e, "Session cookie rejected");
            AppError::new(ErrorCode::InternalError)
        })?;

    Ok((
        [(http::header::SET_COOKIE, cookie)],
        Redirect::to(&state.staff_page_url(&perk_id)),
    )
        .into_response())
}

/// GET /perks/{perk_id}/staff/progress
pub async fn progress(
    State(state): State<AppState>,
    Path(perk_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StaffProgress> {
    let session = session_from_headers(&headers);
    if !state.service.staff_authorized(session.as_deref(), &perk_id) {
        return Err(AppError::session_expired());
    }
    let progress = state
        .service
        .staff_progress(&perk_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PerkNotFound))?;
    Ok(Json(progress))
}
