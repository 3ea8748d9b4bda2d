//! Request authentication
//!
//! - [`user_auth`]: caller identity from a bearer JWT
//! - [`admin_gate`]: single admin capability check for `/admin`
//! - [`staff`]: staff session cookie
//! - [`rate_limit`]: per-IP limits on check-in and unlock

pub mod admin_gate;
pub mod rate_limit;
pub mod staff;
pub mod user_auth;

pub use user_auth::UserIdentity;
