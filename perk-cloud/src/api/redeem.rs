//! Staff redemption by scanned token

use axum::{Json, extract::State, http::HeaderMap};
use shared::error::{AppError, ErrorCode};
use shared::models::{RedeemRequest, RedeemResponse};

use super::ApiResult;
use super::extract::AppJson;
use crate::auth::staff::session_from_headers;
use crate::perk::{RedeemOutcome, RedeemRejection};
use crate::state::AppState;

/// POST /perks/redeem-by-token
pub async fn redeem_by_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(req): AppJson<RedeemRequest>,
) -> ApiResult<RedeemResponse> {
    let token = required(req.token, "token")?.to_ascii_uppercase();
    let perk_id = required(req.perk_id, "perkId")?;

    let session = session_from_headers(&headers);
    let outcome = state
        .service
        .redeem(session.as_deref(), &perk_id, &token)
        .await?;

    match outcome {
        RedeemOutcome::Redeemed(count) => Ok(Json(RedeemResponse::redeemed(count))),
        RedeemOutcome::AlreadyRedeemed(count) => Ok(Json(RedeemResponse::already_redeemed(count))),
        RedeemOutcome::Rejected(RedeemRejection::SessionExpired) => {
            Err(AppError::session_expired())
        }
        RedeemOutcome::Rejected(RedeemRejection::InvalidToken) => {
            Err(AppError::new(ErrorCode::RedeemTokenInvalid))
        }
        RedeemOutcome::Rejected(RedeemRejection::WrongPerk) => {
            Err(AppError::new(ErrorCode::WrongPerk))
        }
    }
}

/// Trimmed, non-empty field or a 400
fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::required(field))
}
