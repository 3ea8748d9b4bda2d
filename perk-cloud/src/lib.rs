//! perk-cloud: limited-inventory perk check-in and staff redemption
//!
//! - Guests check in to a perk and receive a redeem token (`/perks/{id}/checkin`)
//! - Staff devices unlock a perk with its unlock link and scan tokens
//! - Admins create perks, toggle them and rotate unlock links

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod perk;
pub mod state;

pub use config::Config;
pub use state::AppState;
