//! Data models
//!
//! Shared between the perk service and its clients (via API).
//! All IDs are UUID strings; all instants are Unix milliseconds.

pub mod claim;
pub mod perk;

// Re-exports
pub use claim::*;
pub use perk::*;
