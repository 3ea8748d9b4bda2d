//! In-memory store
//!
//! Every operation takes the single state lock once, so `reserve` and
//! `mark_redeemed` are linearized exactly like the row-locked Postgres path.
//! Used for local development without a database and by the test suite.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{Claim, ClaimStatus, Perk};
use tokio::sync::Mutex;

use super::{NewClaim, PerkStore, ReserveResult, StoreResult};

#[derive(Default)]
struct Inner {
    perks: HashMap<String, Perk>,
    /// Append-only, creation order
    claims: Vec<Claim>,
    by_token: HashMap<String, usize>,
    by_user: HashMap<(String, String), usize>,
    admins: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct MemoryPerkStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryPerkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a user as administrator
    pub async fn add_admin(&self, user_id: &str) {
        self.inner.lock().await.admins.insert(user_id.to_owned());
    }

    /// Total claim rows across all perks
    pub async fn claim_rows(&self) -> usize {
        self.inner.lock().await.claims.len()
    }
}

#[async_trait]
impl PerkStore for MemoryPerkStore {
    async fn insert_perk(&self, perk: &Perk) -> StoreResult<()> {
        self.inner
            .lock()
            .await
            .perks
            .insert(perk.id.clone(), perk.clone());
        Ok(())
    }

    async fn get_perk(&self, perk_id: &str) -> StoreResult<Option<Perk>> {
        Ok(self.inner.lock().await.perks.get(perk_id).cloned())
    }

    async fn list_perks(&self) -> StoreResult<Vec<Perk>> {
        let inner = self.inner.lock().await;
        let mut perks: Vec<Perk> = inner.perks.values().cloned().collect();
        perks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(perks)
    }

    async fn set_active(&self, perk_id: &str, active: bool) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.perks.get_mut(perk_id) {
            Some(perk) => {
                perk.active = active;
                true
            }
            None => false,
        })
    }

    async fn set_unlock_token(&self, perk_id: &str, token: &str) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.perks.get_mut(perk_id) {
            Some(perk) => {
                perk.staff_unlock_token = token.to_owned();
                true
            }
            None => false,
        })
    }

    async fn reserve(
        &self,
        perk_id: &str,
        user_id: &str,
        candidate: NewClaim,
    ) -> StoreResult<ReserveResult> {
        let mut inner = self.inner.lock().await;

        let Some(max_claims) = inner.perks.get(perk_id).map(|p| p.max_claims) else {
            return Ok(ReserveResult::PerkMissing);
        };

        let key = (perk_id.to_owned(), user_id.to_owned());
        if let Some(&idx) = inner.by_user.get(&key) {
            return Ok(ReserveResult::Existing(inner.claims[idx].clone()));
        }

        let count = inner.claims.iter().filter(|c| c.perk_id == perk_id).count() as i64;
        if count >= max_claims {
            return Ok(ReserveResult::SoldOut);
        }

        let claim = Claim {
            id: candidate.id,
            perk_id: perk_id.to_owned(),
            user_id: user_id.to_owned(),
            status: ClaimStatus::Reserved,
            redeem_token: candidate.redeem_token,
            created_at: candidate.created_at,
            redeemed_at: None,
            redeemed_by: None,
        };
        let idx = inner.claims.len();
        inner.by_token.insert(claim.redeem_token.clone(), idx);
        inner.by_user.insert(key, idx);
        inner.claims.push(claim.clone());
        Ok(ReserveResult::Created(claim))
    }

    async fn find_claim_by_token(&self, token: &str) -> StoreResult<Option<Claim>> {
        let inner = self.inner.lock().await;
        Ok(inner.by_token.get(token).map(|&idx| inner.claims[idx].clone()))
    }

    async fn claim_for_user(&self, perk_id: &str, user_id: &str) -> StoreResult<Option<Claim>> {
        let inner = self.inner.lock().await;
        let key = (perk_id.to_owned(), user_id.to_owned());
        Ok(inner.by_user.get(&key).map(|&idx| inner.claims[idx].clone()))
    }

    async fn mark_redeemed(&self, token: &str, at: i64, by: &str) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        let Some(&idx) = inner.by_token.get(token) else {
            return Ok(false);
        };
        let claim = &mut inner.claims[idx];
        if claim.status != ClaimStatus::Reserved {
            return Ok(false);
        }
        claim.status = ClaimStatus::Redeemed;
        claim.redeemed_at = Some(at);
        claim.redeemed_by = Some(by.to_owned());
        Ok(true)
    }

    async fn claimed_count(&self, perk_id: &str) -> StoreResult<i64> {
        let inner = self.inner.lock().await;
        Ok(inner.claims.iter().filter(|c| c.perk_id == perk_id).count() as i64)
    }

    async fn redeemed_count(&self, perk_id: &str) -> StoreResult<i64> {
        let inner = self.inner.lock().await;
        Ok(inner
            .claims
            .iter()
            .filter(|c| c.perk_id == perk_id && c.status == ClaimStatus::Redeemed)
            .count() as i64)
    }

    async fn claim_position(&self, claim: &Claim) -> StoreResult<i64> {
        let inner = self.inner.lock().await;
        let Some(&idx) = inner.by_token.get(&claim.redeem_token) else {
            return Ok(0);
        };
        Ok(inner.claims[..=idx]
            .iter()
            .filter(|c| c.perk_id == claim.perk_id)
            .count() as i64)
    }

    async fn is_admin(&self, user_id: &str) -> StoreResult<bool> {
        Ok(self.inner.lock().await.admins.contains(user_id))
    }
}
