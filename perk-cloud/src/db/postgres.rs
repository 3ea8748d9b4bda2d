//! PostgreSQL store
//!
//! `reserve` locks the perk row (`SELECT ... FOR UPDATE`) for the
//! count-then-insert, so concurrent check-ins for one perk are serialized
//! across every server instance. `(perk_id, user_id)` and `redeem_token`
//! carry unique constraints as the last line of defence.

use async_trait::async_trait;
use shared::models::{Claim, ClaimStatus, Geofence, Perk, PerkKind};
use sqlx::PgPool;

use super::{NewClaim, PerkStore, ReserveResult, StoreError, StoreResult};

const PERK_COLUMNS: &str = "id, title, venue_name, neighborhood, kind, max_claims, active, \
     start_at, end_at, geo_lat, geo_lng, geo_radius_m, staff_unlock_token, sponsor_tag, \
     fine_print, created_at";

const CLAIM_COLUMNS: &str =
    "id, perk_id, user_id, status, redeem_token, created_at, redeemed_at, redeemed_by";

#[derive(Clone)]
pub struct PgPerkStore {
    pool: PgPool,
}

impl PgPerkStore {
    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl PerkStore for PgPerkStore {
    async fn insert_perk(&self, perk: &Perk) -> StoreResult<()> {
        let fence = perk.geofence;
        sqlx::query(
            r#"
            INSERT INTO perks (
                id, title, venue_name, neighborhood, kind, max_claims, active,
                start_at, end_at, geo_lat, geo_lng, geo_radius_m, staff_unlock_token,
                sponsor_tag, fine_print, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&perk.id)
        .bind(&perk.title)
        .bind(&perk.venue_name)
        .bind(&perk.neighborhood)
        .bind(perk.kind.as_str())
        .bind(perk.max_claims)
        .bind(perk.active)
        .bind(perk.start_at)
        .bind(perk.end_at)
        .bind(fence.map(|f| f.center.lat))
        .bind(fence.map(|f| f.center.lng))
        .bind(fence.map(|f| f.radius_m))
        .bind(&perk.staff_unlock_token)
        .bind(&perk.sponsor_tag)
        .bind(&perk.fine_print)
        .bind(perk.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_perk(&self, perk_id: &str) -> StoreResult<Option<Perk>> {
        let row: Option<PerkRow> =
            sqlx::query_as(&format!("SELECT {PERK_COLUMNS} FROM perks WHERE id = $1"))
                .bind(perk_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Perk::try_from).transpose()
    }

    async fn list_perks(&self) -> StoreResult<Vec<Perk>> {
        let rows: Vec<PerkRow> = sqlx::query_as(&format!(
            "SELECT {PERK_COLUMNS} FROM perks ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Perk::try_from).collect()
    }

    async fn set_active(&self, perk_id: &str, active: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE perks SET active = $1 WHERE id = $2")
            .bind(active)
            .bind(perk_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_unlock_token(&self, perk_id: &str, token: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE perks SET staff_unlock_token = $1 WHERE id = $2")
            .bind(token)
            .bind(perk_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reserve(
        &self,
        perk_id: &str,
        user_id: &str,
        candidate: NewClaim,
    ) -> StoreResult<ReserveResult> {
        let mut tx = self.pool.begin().await?;

        // Serializes every reserve for this perk until commit
        let locked: Option<(i64,)> =
            sqlx::query_as("SELECT max_claims FROM perks WHERE id = $1 FOR UPDATE")
                .bind(perk_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((max_claims,)) = locked else {
            return Ok(ReserveResult::PerkMissing);
        };

        let existing: Option<ClaimRow> = sqlx::query_as(&format!(
            "SELECT {CLAIM_COLUMNS} FROM perk_claims WHERE perk_id = $1 AND user_id = $2"
        ))
        .bind(perk_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(row) = existing {
            tx.commit().await?;
            return Ok(ReserveResult::Existing(row.try_into()?));
        }

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM perk_claims WHERE perk_id = $1")
            .bind(perk_id)
            .fetch_one(&mut *tx)
            .await?;
        if count >= max_claims {
            tx.commit().await?;
            return Ok(ReserveResult::SoldOut);
        }

        let inserted: Option<ClaimRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO perk_claims (id, perk_id, user_id, status, redeem_token, created_at)
            VALUES ($1, $2, $3, 'reserved', $4, $5)
            ON CONFLICT (perk_id, user_id) DO NOTHING
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(&candidate.id)
        .bind(perk_id)
        .bind(user_id)
        .bind(&candidate.redeem_token)
        .bind(candidate.created_at)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(row) => ReserveResult::Created(row.try_into()?),
            None => {
                // Same user committed first
                let row: ClaimRow = sqlx::query_as(&format!(
                    "SELECT {CLAIM_COLUMNS} FROM perk_claims WHERE perk_id = $1 AND user_id = $2"
                ))
                .bind(perk_id)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
                ReserveResult::Existing(row.try_into()?)
            }
        };

        // Token is only handed out after this commit succeeds
        tx.commit().await?;
        Ok(result)
    }

    async fn find_claim_by_token(&self, token: &str) -> StoreResult<Option<Claim>> {
        let row: Option<ClaimRow> = sqlx::query_as(&format!(
            "SELECT {CLAIM_COLUMNS} FROM perk_claims WHERE redeem_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Claim::try_from).transpose()
    }

    async fn claim_for_user(&self, perk_id: &str, user_id: &str) -> StoreResult<Option<Claim>> {
        let row: Option<ClaimRow> = sqlx::query_as(&format!(
            "SELECT {CLAIM_COLUMNS} FROM perk_claims WHERE perk_id = $1 AND user_id = $2"
        ))
        .bind(perk_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Claim::try_from).transpose()
    }

    async fn mark_redeemed(&self, token: &str, at: i64, by: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE perk_claims
            SET status = 'redeemed', redeemed_at = $2, redeemed_by = $3
            WHERE redeem_token = $1 AND status = 'reserved'
            "#,
        )
        .bind(token)
        .bind(at)
        .bind(by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn claimed_count(&self, perk_id: &str) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM perk_claims WHERE perk_id = $1")
            .bind(perk_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn redeemed_count(&self, perk_id: &str) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM perk_claims WHERE perk_id = $1 AND status = 'redeemed'",
        )
        .bind(perk_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn claim_position(&self, claim: &Claim) -> StoreResult<i64> {
        let (position,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM perk_claims
            WHERE perk_id = $1 AND (created_at, id) <= ($2, $3)
            "#,
        )
        .bind(&claim.perk_id)
        .bind(claim.created_at)
        .bind(&claim.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(position)
    }

    async fn is_admin(&self, user_id: &str) -> StoreResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM admins WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

// ── Row types ──

#[derive(sqlx::FromRow)]
struct PerkRow {
    id: String,
    title: String,
    venue_name: Option<String>,
    neighborhood: Option<String>,
    kind: String,
    max_claims: i64,
    active: bool,
    start_at: Option<i64>,
    end_at: Option<i64>,
    geo_lat: Option<f64>,
    geo_lng: Option<f64>,
    geo_radius_m: Option<f64>,
    staff_unlock_token: String,
    sponsor_tag: Option<String>,
    fine_print: Option<String>,
    created_at: i64,
}

impl TryFrom<PerkRow> for Perk {
    type Error = StoreError;

    fn try_from(row: PerkRow) -> Result<Self, Self::Error> {
        let kind: PerkKind = row.kind.parse().map_err(StoreError::Corrupt)?;
        let geofence = Geofence::from_parts(row.geo_lat, row.geo_lng, row.geo_radius_m)
            .map_err(|e| StoreError::Corrupt(format!("perk {}: {e}", row.id)))?;
        Ok(Perk {
            id: row.id,
            title: row.title,
            venue_name: row.venue_name,
            neighborhood: row.neighborhood,
            kind,
            max_claims: row.max_claims,
            active: row.active,
            start_at: row.start_at,
            end_at: row.end_at,
            geofence,
            staff_unlock_token: row.staff_unlock_token,
            sponsor_tag: row.sponsor_tag,
            fine_print: row.fine_print,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ClaimRow {
    id: String,
    perk_id: String,
    user_id: String,
    status: String,
    redeem_token: String,
    created_at: i64,
    redeemed_at: Option<i64>,
    redeemed_by: Option<String>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = StoreError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let status: ClaimStatus = row.status.parse().map_err(StoreError::Corrupt)?;
        Ok(Claim {
            id: row.id,
            perk_id: row.perk_id,
            user_id: row.user_id,
            status,
            redeem_token: row.redeem_token,
            created_at: row.created_at,
            redeemed_at: row.redeemed_at,
            redeemed_by: row.redeemed_by,
        })
    }
}
