//! Perk claim ledger
//!
//! `claim` admits or rejects a check-in against a perk's capacity. The
//! precondition reads (exists, active, window) are plain reads; the
//! existing-claim lookup, count and insert happen inside one
//! [`PerkStore::reserve`](crate::db::PerkStore::reserve) call, which the
//! store linearizes per perk.

use shared::models::{Claim, ClaimStatus};

use super::PerkService;
use super::token::generate_token;
use crate::db::{NewClaim, ReserveResult, StoreResult};

/// A claim the caller holds after check-in
#[derive(Debug, Clone, PartialEq)]
pub struct Reserved {
    pub claim: Claim,
    /// True when the claim predates this call (idempotent re-tap)
    pub already_claimed: bool,
}

impl Reserved {
    pub fn token(&self) -> &str {
        &self.claim.redeem_token
    }

    pub fn status(&self) -> ClaimStatus {
        self.claim.status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimRejection {
    NotFound,
    Inactive,
    OutsideWindow,
    SoldOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Reserved(Reserved),
    Rejected(ClaimRejection),
}

impl PerkService {
    /// Check `user_id` in to `perk_id`.
    ///
    /// At most one claim per (perk, user) and at most `max_claims` claims
    /// per perk are ever created, however many callers race. The returned
    /// token always belongs to a committed claim.
    pub async fn claim(&self, perk_id: &str, user_id: &str) -> StoreResult<ClaimOutcome> {
        let now = shared::util::now_millis();

        let Some(perk) = self.store.get_perk(perk_id).await? else {
            return Ok(ClaimOutcome::Rejected(ClaimRejection::NotFound));
        };
        if !perk.active {
            return Ok(ClaimOutcome::Rejected(ClaimRejection::Inactive));
        }
        if !perk.in_window(now) {
            return Ok(ClaimOutcome::Rejected(ClaimRejection::OutsideWindow));
        }

        let candidate = NewClaim {
            id: uuid::Uuid::new_v4().to_string(),
            redeem_token: generate_token(),
            created_at: now,
        };

        let outcome = match self.store.reserve(perk_id, user_id, candidate).await? {
            ReserveResult::Created(claim) => {
                tracing::info!(perk_id, claim_id = %claim.id, "Perk claimed");
                ClaimOutcome::Reserved(Reserved {
                    claim,
                    already_claimed: false,
                })
            }
            ReserveResult::Existing(claim) => {
                tracing::debug!(perk_id, claim_id = %claim.id, "Repeat check-in");
                ClaimOutcome::Reserved(Reserved {
                    claim,
                    already_claimed: true,
                })
            }
            ReserveResult::SoldOut => {
                tracing::debug!(perk_id, "Check-in on sold out perk");
                ClaimOutcome::Rejected(ClaimRejection::SoldOut)
            }
            ReserveResult::PerkMissing => ClaimOutcome::Rejected(ClaimRejection::NotFound),
        };
        Ok(outcome)
    }

    /// The caller's own claim, if any
    pub async fn claim_for_user(&self, perk_id: &str, user_id: &str) -> StoreResult<Option<Claim>> {
        self.store.claim_for_user(perk_id, user_id).await
    }

    /// 1-based position of a claim within its perk
    pub async fn claim_order(&self, claim: &Claim) -> StoreResult<i64> {
        self.store.claim_position(claim).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perk::test_support::{perk, seeded};
    use std::collections::HashSet;

    fn reserved(outcome: ClaimOutcome) -> Reserved {
        match outcome {
            ClaimOutcome::Reserved(r) => r,
            other => panic!("expected Reserved, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_perk_is_not_found() {
        let (svc, _) = seeded(&[]).await;
        let outcome = svc.claim("missing", "u1").await.unwrap();
        assert_eq!(outcome, ClaimOutcome::Rejected(ClaimRejection::NotFound));
    }

    #[tokio::test]
    async fn inactive_perk_rejects_regardless_of_capacity() {
        let mut p = perk("p1", 100);
        p.active = false;
        p.start_at = Some(0);
        let (svc, store) = seeded(&[p]).await;

        for user in ["u1", "u2", "u3"] {
            let outcome = svc.claim("p1", user).await.unwrap();
            assert_eq!(outcome, ClaimOutcome::Rejected(ClaimRejection::Inactive));
        }
        assert_eq!(store.claim_rows().await, 0);
    }

    #[tokio::test]
    async fn window_enforcement() {
        let now = shared::util::now_millis();
        let hour = 3_600_000;

        let mut future = perk("future", 5);
        future.start_at = Some(now + hour);
        let mut past = perk("past", 5);
        past.end_at = Some(now - hour);
        let mut open = perk("open", 5);
        open.start_at = Some(now - hour);
        open.end_at = Some(now + hour);
        let unbounded = perk("unbounded", 5);

        let (svc, _) = seeded(&[future, past, open, unbounded]).await;

        assert_eq!(
            svc.claim("future", "u1").await.unwrap(),
            ClaimOutcome::Rejected(ClaimRejection::OutsideWindow)
        );
        assert_eq!(
            svc.claim("past", "u1").await.unwrap(),
            ClaimOutcome::Rejected(ClaimRejection::OutsideWindow)
        );
        reserved(svc.claim("open", "u1").await.unwrap());
        reserved(svc.claim("unbounded", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn repeat_check_in_returns_same_token() {
        let (svc, store) = seeded(&[perk("p1", 5)]).await;

        let first = reserved(svc.claim("p1", "u1").await.unwrap());
        let second = reserved(svc.claim("p1", "u1").await.unwrap());

        assert!(!first.already_claimed);
        assert!(second.already_claimed);
        assert_eq!(first.token(), second.token());
        assert_eq!(store.claim_rows().await, 1);
    }

    #[tokio::test]
    async fn repeat_check_in_on_full_perk_is_not_sold_out() {
        let (svc, _) = seeded(&[perk("p1", 1)]).await;

        let first = reserved(svc.claim("p1", "u1").await.unwrap());
        let again = reserved(svc.claim("p1", "u1").await.unwrap());
        assert_eq!(first.token(), again.token());

        assert_eq!(
            svc.claim("p1", "u2").await.unwrap(),
            ClaimOutcome::Rejected(ClaimRejection::SoldOut)
        );
    }

    #[tokio::test]
    async fn concurrent_claims_never_oversell() {
        const CAPACITY: i64 = 10;
        const CALLERS: usize = 50;

        let (svc, store) = seeded(&[perk("p1", CAPACITY)]).await;

        let handles: Vec<_> = (0..CALLERS)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.claim("p1", &format!("user-{i}")).await.unwrap() })
            })
            .collect();

        let mut tokens = HashSet::new();
        let mut sold_out = 0;
        for handle in handles {
            match handle.await.unwrap() {
                ClaimOutcome::Reserved(r) => {
                    assert!(tokens.insert(r.claim.redeem_token));
                }
                ClaimOutcome::Rejected(ClaimRejection::SoldOut) => sold_out += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(tokens.len() as i64, CAPACITY);
        assert_eq!(sold_out, CALLERS - CAPACITY as usize);
        assert_eq!(store.claim_rows().await, CAPACITY as usize);
    }

    #[tokio::test]
    async fn concurrent_claims_by_one_user_create_one_row() {
        let (svc, store) = seeded(&[perk("p1", 5)]).await;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.claim("p1", "same-user").await.unwrap() })
            })
            .collect();

        let mut tokens = HashSet::new();
        for handle in handles {
            tokens.insert(reserved(handle.await.unwrap()).claim.redeem_token);
        }
        assert_eq!(tokens.len(), 1);
        assert_eq!(store.claim_rows().await, 1);
    }

    #[tokio::test]
    async fn claim_order_counts_from_one() {
        let (svc, _) = seeded(&[perk("p1", 5)]).await;

        let a = reserved(svc.claim("p1", "a").await.unwrap());
        let b = reserved(svc.claim("p1", "b").await.unwrap());
        assert_eq!(svc.claim_order(&a.claim).await.unwrap(), 1);
        assert_eq!(svc.claim_order(&b.claim).await.unwrap(), 2);
    }
}
