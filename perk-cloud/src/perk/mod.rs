//! Perk allocation core
//!
//! - [`token`]: opaque redeem / unlock tokens
//! - [`session`]: stateless HMAC staff sessions
//! - [`geo`]: haversine geofence gate
//! - [`ledger`]: atomic claim against `max_claims`
//! - [`redeem`]: `reserved -> redeemed`, exactly once
//! - [`progress`]: claimed / redeemed counters
//! - [`admin`]: perk lifecycle behind the admin capability
//!
//! Expected outcomes (sold out, already redeemed, ...) are return values.
//! Only store failures travel the error path.

pub mod admin;
pub mod geo;
pub mod ledger;
pub mod progress;
pub mod redeem;
pub mod session;
pub mod token;

use std::sync::Arc;

use shared::models::Perk;

use crate::db::{PerkStore, StoreResult};

pub use admin::Admin;
pub use ledger::{ClaimOutcome, ClaimRejection, Reserved};
pub use redeem::{RedeemOutcome, RedeemRejection};
pub use session::StaffSessionSigner;

/// Actor marker written to `redeemed_by` by the scanner path
pub const REDEEMED_BY_STAFF: &str = "staff";

/// Entry point for every perk operation
#[derive(Clone)]
pub struct PerkService {
    store: Arc<dyn PerkStore>,
    signer: StaffSessionSigner,
    default_max_claims: i64,
}

impl PerkService {
    pub fn new(
        store: Arc<dyn PerkStore>,
        signer: StaffSessionSigner,
        default_max_claims: i64,
    ) -> Self {
        Self {
            store,
            signer,
            default_max_claims,
        }
    }

    pub async fn perk(&self, perk_id: &str) -> StoreResult<Option<Perk>> {
        self.store.get_perk(perk_id).await
    }

    pub fn signer(&self) -> &StaffSessionSigner {
        &self.signer
    }
}
