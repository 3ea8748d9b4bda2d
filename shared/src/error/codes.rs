//! Unified error codes for the perk service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Perk errors
//! - 4xxx: Claim / redemption errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that scanner and
/// check-in clients can branch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Too many requests from this client
    RateLimited = 9,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Staff session missing, expired, or issued for another perk
    SessionExpired = 1005,

    // ==================== 2xxx: Permission ====================
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Perk ====================
    /// Perk not found
    PerkNotFound = 3001,
    /// Geofence fields are incomplete or out of range
    GeofenceInvalid = 3005,
    /// Staff unlock token does not match the perk
    UnlockTokenInvalid = 3006,

    // ==================== 4xxx: Claim ====================
    /// Caller has no claim for this perk
    ClaimNotFound = 4001,
    /// Redeem token is unknown
    RedeemTokenInvalid = 4002,
    /// Redeem token belongs to a different perk
    WrongPerk = 4003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the user-facing message for this error code.
    ///
    /// Messages always carry a next step for the person holding the phone.
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::RateLimited => "Too many requests. Wait a moment and try again.",

            // Auth
            ErrorCode::NotAuthenticated => "Sign in to continue",
            ErrorCode::TokenExpired => "Your sign-in has expired. Sign in again.",
            ErrorCode::TokenInvalid => "Your sign-in is invalid. Sign in again.",
            ErrorCode::SessionExpired => "Staff session expired. Scan the unlock QR again.",

            // Permission
            ErrorCode::AdminRequired => "Administrator access is required",

            // Perk
            ErrorCode::PerkNotFound => "Perk not found",
            ErrorCode::GeofenceInvalid => "Geofence needs latitude, longitude and radius",
            ErrorCode::UnlockTokenInvalid => "Unlock link is invalid. Ask the host for a new one.",

            // Claim
            ErrorCode::ClaimNotFound => "You have not claimed this perk yet",
            ErrorCode::RedeemTokenInvalid => "Pass not recognised. Ask the guest to reopen it.",
            ErrorCode::WrongPerk => "This pass is for a different perk",

            // System
            ErrorCode::InternalError => "Internal server error. Try again.",
            ErrorCode::DatabaseError => "Temporary storage problem. Try again.",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            9 => Ok(ErrorCode::RateLimited),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),

            // Permission
            2003 => Ok(ErrorCode::AdminRequired),

            // Perk
            3001 => Ok(ErrorCode::PerkNotFound),
            3005 => Ok(ErrorCode::GeofenceInvalid),
            3006 => Ok(ErrorCode::UnlockTokenInvalid),

            // Claim
            4001 => Ok(ErrorCode::ClaimNotFound),
            4002 => Ok(ErrorCode::RedeemTokenInvalid),
            4003 => Ok(ErrorCode::WrongPerk),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::RateLimited.code(), 9);
        assert_eq!(ErrorCode::SessionExpired.code(), 1005);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::PerkNotFound.code(), 3001);
        assert_eq!(ErrorCode::GeofenceInvalid.code(), 3005);
        assert_eq!(ErrorCode::WrongPerk.code(), 4003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(3006), Ok(ErrorCode::UnlockTokenInvalid));
        assert_eq!(ErrorCode::try_from(4002), Ok(ErrorCode::RedeemTokenInvalid));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(6), Err(InvalidErrorCode(6)));
        assert_eq!(ErrorCode::try_from(3004), Err(InvalidErrorCode(3004)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::WrongPerk).unwrap();
        assert_eq!(json, "4003");
        let back: ErrorCode = serde_json::from_str("1005").unwrap();
        assert_eq!(back, ErrorCode::SessionExpired);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_staff_messages_are_actionable() {
        assert!(ErrorCode::SessionExpired.message().contains("unlock QR"));
        assert!(ErrorCode::InternalError.message().contains("Try again"));
    }
}
