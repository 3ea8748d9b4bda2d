//! HTTP routes for perk-cloud

pub mod admin;
pub mod checkin;
pub mod extract;
pub mod health;
pub mod perks;
pub mod redeem;
pub mod staff;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::admin_gate::admin_gate_middleware;
use crate::auth::rate_limit::{checkin_rate_limit, unlock_rate_limit};
use crate::auth::user_auth::user_auth_middleware;
use crate::state::AppState;

pub(crate) type ApiResult<T> = Result<Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Signed-in guests
    let checkin = Router::new()
        .route("/perks/{perk_id}/checkin", post(checkin::check_in))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            checkin_rate_limit,
        ));
    let guest = Router::new()
        .route("/perks/{perk_id}/claim", get(perks::my_claim))
        .merge(checkin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    // Staff devices (session cookie checked per handler)
    let unlock = Router::new()
        .route("/perks/{perk_id}/staff/unlock", get(staff::unlock))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            unlock_rate_limit,
        ));
    let staff = Router::new()
        .route("/perks/{perk_id}/staff/progress", get(staff::progress))
        .route("/perks/redeem-by-token", post(redeem::redeem_by_token))
        .merge(unlock);

    // Admin lifecycle: identity first, then the admin gate
    let admin = Router::new()
        .route("/admin/perks", get(admin::list_perks))
        .route("/admin/perks/new", post(admin::create_perk))
        .route("/admin/perks/{perk_id}/active", post(admin::set_active))
        .route(
            "/admin/perks/{perk_id}/regenerate-unlock",
            post(admin::regenerate_unlock),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_gate_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/perks/{perk_id}", get(perks::perk_card))
        .merge(guest)
        .merge(staff)
        .merge(admin)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
