//! Read-only counters derived from the claim set

use shared::models::{AdminPerkSummary, MyClaim, Perk, PerkCard, StaffProgress};

use super::{Admin, PerkService};
use crate::db::StoreResult;

impl PerkService {
    pub async fn claimed_count(&self, perk_id: &str) -> StoreResult<i64> {
        self.store.claimed_count(perk_id).await
    }

    pub async fn redeemed_count(&self, perk_id: &str) -> StoreResult<i64> {
        self.store.redeemed_count(perk_id).await
    }

    /// Public perk card with live counters; `None` for an unknown perk
    pub async fn perk_card(&self, perk_id: &str) -> StoreResult<Option<PerkCard>> {
        let Some(perk) = self.store.get_perk(perk_id).await? else {
            return Ok(None);
        };
        let claimed = self.store.claimed_count(perk_id).await?;
        let redeemed = self.store.redeemed_count(perk_id).await?;
        let now = shared::util::now_millis();

        Ok(Some(PerkCard {
            live: perk.is_live(now),
            has_geofence: perk.geofence.is_some(),
            claimed,
            redeemed,
            total: perk.max_claims,
            id: perk.id,
            title: perk.title,
            venue_name: perk.venue_name,
            neighborhood: perk.neighborhood,
            kind: perk.kind,
            sponsor_tag: perk.sponsor_tag,
            fine_print: perk.fine_print,
            start_at: perk.start_at,
            end_at: perk.end_at,
            active: perk.active,
        }))
    }

    /// Scanner counters; `None` for an unknown perk
    pub async fn staff_progress(&self, perk_id: &str) -> StoreResult<Option<StaffProgress>> {
        let Some(perk) = self.store.get_perk(perk_id).await? else {
            return Ok(None);
        };
        Ok(Some(StaffProgress {
            claimed: self.store.claimed_count(perk_id).await?,
            redeemed: self.store.redeemed_count(perk_id).await?,
            total: perk.max_claims,
        }))
    }

    /// The caller's pass with its position; `None` if they never claimed
    pub async fn my_claim(&self, perk_id: &str, user_id: &str) -> StoreResult<Option<MyClaim>> {
        let Some(perk) = self.store.get_perk(perk_id).await? else {
            return Ok(None);
        };
        let Some(claim) = self.store.claim_for_user(perk_id, user_id).await? else {
            return Ok(None);
        };
        let order = self.store.claim_position(&claim).await?;
        Ok(Some(MyClaim {
            token: claim.redeem_token,
            status: claim.status,
            order,
            total: perk.max_claims,
        }))
    }

    /// Admin dashboard rows, newest perk first
    pub async fn admin_summaries(&self, _admin: &Admin) -> StoreResult<Vec<AdminPerkSummary>> {
        let perks = self.store.list_perks().await?;
        let mut rows = Vec::with_capacity(perks.len());
        for perk in perks {
            rows.push(self.summarize(perk).await?);
        }
        Ok(rows)
    }

    async fn summarize(&self, perk: Perk) -> StoreResult<AdminPerkSummary> {
        let claimed = self.store.claimed_count(&perk.id).await?;
        let redeemed = self.store.redeemed_count(&perk.id).await?;
        Ok(AdminPerkSummary {
            id: perk.id,
            title: perk.title,
            venue_name: perk.venue_name,
            kind: perk.kind,
            active: perk.active,
            start_at: perk.start_at,
            end_at: perk.end_at,
            staff_unlock_token: perk.staff_unlock_token,
            claimed,
            redeemed,
            total: perk.max_claims,
            created_at: perk.created_at,
        })
    }
}
