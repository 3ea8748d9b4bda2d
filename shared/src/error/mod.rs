//! Unified error system for the perk service
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: The JSON body every error response carries
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Perk errors
//! - 4xxx: Claim errors
//! - 9xxx: System errors
//!
//! Expected workflow outcomes (sold out, already claimed, already redeemed,
//! outside the window, too far away) are not errors and never pass through
//! this module; they are ordinary response fields.
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::SessionExpired);
//! let err = AppError::required("token");
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, ErrorCode::RequiredField.code());
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody};
