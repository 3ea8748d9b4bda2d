//! Database access layer
//!
//! [`PerkStore`] is the transactional store contract the claim ledger and
//! redemption machine run against. Two backends implement it:
//! - [`postgres::PgPerkStore`]: production, row lock + unique constraints
//! - [`memory::MemoryPerkStore`]: single-process, one mutex over all state
//!
//! Claims are only ever created by [`PerkStore::reserve`] and only ever
//! updated by [`PerkStore::mark_redeemed`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use shared::models::{Claim, Perk};

pub use memory::MemoryPerkStore;
pub use postgres::PgPerkStore;

/// Infrastructure failure talking to the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A claim the ledger wants to insert if the user has none yet
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub id: String,
    pub redeem_token: String,
    pub created_at: i64,
}

/// Result of the atomic reserve step
#[derive(Debug, Clone, PartialEq)]
pub enum ReserveResult {
    /// The user already holds a claim; nothing was written
    Existing(Claim),
    /// A new claim was durably committed
    Created(Claim),
    /// Claim count already reached `max_claims`; nothing was written
    SoldOut,
    /// The perk row vanished between the precheck and the lock
    PerkMissing,
}

#[async_trait]
pub trait PerkStore: Send + Sync {
    // ── Perks ──

    async fn insert_perk(&self, perk: &Perk) -> StoreResult<()>;

    async fn get_perk(&self, perk_id: &str) -> StoreResult<Option<Perk>>;

    /// All perks, newest first
    async fn list_perks(&self) -> StoreResult<Vec<Perk>>;

    /// Returns false when the perk does not exist
    async fn set_active(&self, perk_id: &str, active: bool) -> StoreResult<bool>;

    /// Returns false when the perk does not exist
    async fn set_unlock_token(&self, perk_id: &str, token: &str) -> StoreResult<bool>;

    // ── Claims ──

    /// Atomically: return the user's existing claim, or reject when the
    /// perk is full, or insert `candidate`. Linearized per perk.
    async fn reserve(
        &self,
        perk_id: &str,
        user_id: &str,
        candidate: NewClaim,
    ) -> StoreResult<ReserveResult>;

    async fn find_claim_by_token(&self, token: &str) -> StoreResult<Option<Claim>>;

    async fn claim_for_user(&self, perk_id: &str, user_id: &str) -> StoreResult<Option<Claim>>;

    /// Compare-and-set `reserved -> redeemed`. Returns true only for the
    /// caller whose update changed the row.
    async fn mark_redeemed(&self, token: &str, at: i64, by: &str) -> StoreResult<bool>;

    // ── Counters ──

    async fn claimed_count(&self, perk_id: &str) -> StoreResult<i64>;

    async fn redeemed_count(&self, perk_id: &str) -> StoreResult<i64>;

    /// 1-based position of `claim` among its perk's claims by creation order
    async fn claim_position(&self, claim: &Claim) -> StoreResult<i64>;

    // ── Identity ──

    async fn is_admin(&self, user_id: &str) -> StoreResult<bool>;
}
