//! Guest check-in

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{CheckinPerk, CheckinRequest, CheckinResponse};

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::perk::geo::{FenceCheck, check_fence};
use crate::perk::{ClaimOutcome, ClaimRejection};
use crate::state::AppState;

/// POST /perks/{perk_id}/checkin
///
/// The body is optional; without coordinates the geofence is not enforced.
pub async fn check_in(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(perk_id): Path<String>,
    body: Bytes,
) -> ApiResult<CheckinResponse> {
    let req: CheckinRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CheckinRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::invalid_request(format!("Invalid check-in body: {e}")))?
    };

    let perk = state
        .service
        .perk(&perk_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PerkNotFound))?;

    let base = CheckinPerk {
        title: perk.title.clone(),
        total: perk.max_claims,
        ..Default::default()
    };

    if let FenceCheck::TooFar { distance_m } = check_fence(req.coords, perk.geofence.as_ref()) {
        return Ok(acknowledged(CheckinPerk {
            too_far: Some(true),
            distance_m: Some(distance_m.round()),
            ..base
        }));
    }

    match state.service.claim(&perk_id, &identity.user_id).await? {
        ClaimOutcome::Reserved(reserved) => {
            let order = state.service.claim_order(&reserved.claim).await?;
            Ok(acknowledged(CheckinPerk {
                already_claimed: reserved.already_claimed.then_some(true),
                status: Some(reserved.status()),
                token: Some(reserved.claim.redeem_token),
                order: Some(order),
                ..base
            }))
        }
        ClaimOutcome::Rejected(ClaimRejection::NotFound) => {
            Err(AppError::new(ErrorCode::PerkNotFound))
        }
        ClaimOutcome::Rejected(ClaimRejection::Inactive) => Ok(acknowledged(CheckinPerk {
            inactive: Some(true),
            ..base
        })),
        ClaimOutcome::Rejected(ClaimRejection::OutsideWindow) => Ok(acknowledged(CheckinPerk {
            outside_window: Some(true),
            ..base
        })),
        ClaimOutcome::Rejected(ClaimRejection::SoldOut) => Ok(acknowledged(CheckinPerk {
            sold_out: Some(true),
            ..base
        })),
    }
}

fn acknowledged(perk: CheckinPerk) -> Json<CheckinResponse> {
    Json(CheckinResponse {
        checked_in: true,
        perk,
    })
}
