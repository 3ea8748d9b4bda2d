//! Shared types for the perk service
//!
//! Wire models and the unified error system used by the server and by
//! any client talking to it.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
