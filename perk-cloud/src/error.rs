//! Unified service-layer error type for perk-cloud
//!
//! `ServiceError` bridges the gap between store errors (`StoreError`)
//! and the API-layer error (`AppError`). It enables `?` propagation without manual
//! `.map_err(|e| { tracing::error!(...); AppError::new(...) })` boilerplate.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::StoreError;

/// Service-layer error — only two variants, keeps things simple.
///
/// - `Store`: Database/infrastructure errors (logged here, mapped to DatabaseError)
/// - `App`: Validation / auth errors (transparent pass-through to client)
///
/// Workflow outcomes such as sold out or already redeemed never appear here.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Store or infrastructure error
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Request-level error (already an AppError with the correct ErrorCode)
    #[error(transparent)]
    App(#[from] AppError),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store(store_err) => {
                tracing::error!(error = %store_err, "Service store error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e).into()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
