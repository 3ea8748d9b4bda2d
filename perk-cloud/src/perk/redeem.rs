//! Redemption state machine: `reserved -> redeemed`, at most once per claim

use shared::models::ClaimStatus;

use super::{PerkService, REDEEMED_BY_STAFF};
use crate::db::StoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemRejection {
    /// No valid staff session for this perk
    SessionExpired,
    /// No claim carries this token
    InvalidToken,
    /// Token belongs to a different perk's claim
    WrongPerk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// This call performed the transition; carries the fresh redeemed count
    Redeemed(i64),
    /// Someone redeemed it first (double scan); carries the current count
    AlreadyRedeemed(i64),
    Rejected(RedeemRejection),
}

impl PerkService {
    /// Redeem `token` from a scanner authorized for `perk_id`.
    ///
    /// Concurrent calls with the same token converge: exactly one sees
    /// `Redeemed`, the rest see `AlreadyRedeemed`.
    pub async fn redeem(
        &self,
        session: Option<&str>,
        perk_id: &str,
        token: &str,
    ) -> StoreResult<RedeemOutcome> {
        if !self.staff_authorized(session, perk_id) {
            return Ok(RedeemOutcome::Rejected(RedeemRejection::SessionExpired));
        }

        let Some(claim) = self.store.find_claim_by_token(token).await? else {
            return Ok(RedeemOutcome::Rejected(RedeemRejection::InvalidToken));
        };
        if claim.perk_id != perk_id {
            tracing::debug!(perk_id, claim_perk = %claim.perk_id, "Token scanned at wrong perk");
            return Ok(RedeemOutcome::Rejected(RedeemRejection::WrongPerk));
        }

        if claim.status == ClaimStatus::Redeemed {
            let count = self.store.redeemed_count(perk_id).await?;
            return Ok(RedeemOutcome::AlreadyRedeemed(count));
        }

        let now = shared::util::now_millis();
        let won = self
            .store
            .mark_redeemed(token, now, REDEEMED_BY_STAFF)
            .await?;
        let count = self.store.redeemed_count(perk_id).await?;

        if won {
            tracing::info!(perk_id, claim_id = %claim.id, redeemed = count, "Claim redeemed");
            Ok(RedeemOutcome::Redeemed(count))
        } else {
            Ok(RedeemOutcome::AlreadyRedeemed(count))
        }
    }

    /// Trade a perk's current unlock token for a fresh staff session.
    ///
    /// Returns `None` for an unknown perk or a stale/wrong unlock token.
    pub async fn open_staff_session(
        &self,
        perk_id: &str,
        unlock_token: &str,
    ) -> StoreResult<Option<String>> {
        let Some(perk) = self.store.get_perk(perk_id).await? else {
            return Ok(None);
        };
        if !self
            .signer
            .unlock_matches(unlock_token, &perk.staff_unlock_token)
        {
            return Ok(None);
        }
        tracing::info!(perk_id, "Staff session opened");
        Ok(Some(self.signer.mint(perk_id)))
    }

    /// Whether `session` currently authorizes scanning for `perk_id`
    pub fn staff_authorized(&self, session: Option<&str>, perk_id: &str) -> bool {
        session.is_some_and(|s| self.signer.verify(s, perk_id))
    }
}
