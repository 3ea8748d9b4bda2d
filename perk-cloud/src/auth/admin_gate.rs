//! Admin gate for the `/admin` router
//!
//! Runs after [`user_auth_middleware`](super::user_auth::user_auth_middleware)
//! and inserts an [`Admin`] capability for the handlers.

use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use super::UserIdentity;
use crate::state::AppState;

pub async fn admin_gate_middleware(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let admin = state
        .service
        .authorize_admin(&identity.user_id, identity.admin_claim)
        .await?
        .ok_or_else(|| {
            tracing::info!(user_id = %identity.user_id, "Admin route refused");
            AppError::admin_required()
        })?;

    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}
