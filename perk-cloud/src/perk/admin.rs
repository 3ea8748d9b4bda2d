//! Admin lifecycle operations
//!
//! Every write here takes an [`Admin`], which only [`PerkService::authorize_admin`]
//! can produce. The HTTP layer obtains one once in the admin gate middleware.

use shared::error::{AppError, ErrorCode};
use shared::models::{Geofence, Perk, PerkCreate, PerkCreated, PerkKind, UnlockRegenerated};

use super::PerkService;
use super::token::generate_token;
use crate::db::StoreResult;
use crate::error::ServiceResult;

const TITLE_MAX_LEN: usize = 200;

/// Proof that the caller passed the admin check
#[derive(Debug, Clone)]
pub struct Admin {
    user_id: String,
}

impl Admin {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl PerkService {
    /// Admit `user_id` as administrator when the identity token says so or
    /// when the store lists them.
    pub async fn authorize_admin(
        &self,
        user_id: &str,
        token_says_admin: bool,
    ) -> StoreResult<Option<Admin>> {
        if token_says_admin || self.store.is_admin(user_id).await? {
            return Ok(Some(Admin {
                user_id: user_id.to_owned(),
            }));
        }
        Ok(None)
    }

    pub async fn create_perk(&self, admin: &Admin, req: PerkCreate) -> ServiceResult<PerkCreated> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(AppError::required("title").into());
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(
                AppError::validation(format!("title exceeds {TITLE_MAX_LEN} characters")).into(),
            );
        }
        if let (Some(start), Some(end)) = (req.start_at, req.end_at)
            && end <= start
        {
            return Err(AppError::validation("endAt must be after startAt").into());
        }
        let geofence = Geofence::from_parts(req.geo_lat, req.geo_lng, req.geo_radius_m)
            .map_err(|msg| AppError::with_message(ErrorCode::GeofenceInvalid, msg))?;

        let max_claims = req
            .max_claims
            .filter(|n| *n > 0)
            .unwrap_or(self.default_max_claims);

        let perk = Perk {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_owned(),
            venue_name: non_blank(req.venue_name),
            neighborhood: non_blank(req.neighborhood),
            kind: req.kind.unwrap_or(PerkKind::Checkin),
            max_claims,
            active: true,
            start_at: req.start_at,
            end_at: req.end_at,
            geofence,
            staff_unlock_token: generate_token(),
            sponsor_tag: non_blank(req.sponsor_tag),
            fine_print: non_blank(req.fine_print),
            created_at: shared::util::now_millis(),
        };
        self.store.insert_perk(&perk).await?;

        tracing::info!(perk_id = %perk.id, admin = admin.user_id(), max_claims, "Perk created");
        Ok(PerkCreated {
            id: perk.id,
            staff_unlock_token: perk.staff_unlock_token,
        })
    }

    pub async fn set_active(&self, admin: &Admin, perk_id: &str, active: bool) -> ServiceResult<()> {
        if !self.store.set_active(perk_id, active).await? {
            return Err(AppError::not_found(format!("Perk {perk_id}")).into());
        }
        tracing::info!(perk_id, admin = admin.user_id(), active, "Perk active flag changed");
        Ok(())
    }

    /// Rotate the unlock token. Sessions already minted stay valid until
    /// their own expiry.
    pub async fn regenerate_unlock(
        &self,
        admin: &Admin,
        perk_id: &str,
    ) -> ServiceResult<UnlockRegenerated> {
        let token = generate_token();
        if !self.store.set_unlock_token(perk_id, &token).await? {
            return Err(AppError::not_found(format!("Perk {perk_id}")).into());
        }
        tracing::info!(perk_id, admin = admin.user_id(), "Staff unlock token rotated");
        Ok(UnlockRegenerated {
            id: perk_id.to_owned(),
            staff_unlock_token: token,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryPerkStore, PerkStore};
    use crate::error::ServiceError;
    use crate::perk::test_support::{perk, seeded, service_with};
    use crate::perk::token::TOKEN_LEN;

    async fn admin(svc: &PerkService) -> Admin {
        svc.authorize_admin("root", true).await.unwrap().unwrap()
    }

    fn app_code(err: ServiceError) -> ErrorCode {
        match err {
            ServiceError::App(e) => e.code,
            other => panic!("expected App error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn admin_from_token_claim_or_store() {
        let store = MemoryPerkStore::new();
        store.add_admin("listed").await;
        let svc = service_with(store);

        assert!(svc.authorize_admin("anyone", true).await.unwrap().is_some());
        assert!(svc.authorize_admin("listed", false).await.unwrap().is_some());
        assert!(svc.authorize_admin("anyone", false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let (svc, store) = seeded(&[]).await;
        let admin = admin(&svc).await;

        let created = svc
            .create_perk(
                &admin,
                PerkCreate {
                    title: "  Free drink  ".into(),
                    max_claims: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.staff_unlock_token.len(), TOKEN_LEN);

        let perk = store.get_perk(&created.id).await.unwrap().unwrap();
        assert_eq!(perk.title, "Free drink");
        assert_eq!(perk.kind, PerkKind::Checkin);
        assert_eq!(perk.max_claims, 25);
        assert!(perk.active);
        assert_eq!(perk.staff_unlock_token, created.staff_unlock_token);
    }

    #[tokio::test]
    async fn create_validates_input() {
        let (svc, store) = seeded(&[]).await;
        let admin = admin(&svc).await;

        let blank = svc.create_perk(&admin, PerkCreate::default()).await;
        assert_eq!(app_code(blank.unwrap_err()), ErrorCode::RequiredField);

        let backwards = svc
            .create_perk(
                &admin,
                PerkCreate {
                    title: "x".into(),
                    start_at: Some(2_000),
                    end_at: Some(1_000),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(app_code(backwards.unwrap_err()), ErrorCode::ValidationFailed);

        let partial_fence = svc
            .create_perk(
                &admin,
                PerkCreate {
                    title: "x".into(),
                    geo_lat: Some(40.0),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(app_code(partial_fence.unwrap_err()), ErrorCode::GeofenceInvalid);

        assert!(store.list_perks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_active_toggles_and_reports_missing() {
        let (svc, store) = seeded(&[perk("p", 5)]).await;
        let admin = admin(&svc).await;

        svc.set_active(&admin, "p", false).await.unwrap();
        assert!(!store.get_perk("p").await.unwrap().unwrap().active);

        let missing = svc.set_active(&admin, "nope", true).await;
        assert_eq!(app_code(missing.unwrap_err()), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn regenerated_unlock_stops_old_links_but_not_live_sessions() {
        let (svc, _) = seeded(&[perk("p", 5)]).await;
        let admin = admin(&svc).await;

        let session = svc.open_staff_session("p", "UNLOCK").await.unwrap().unwrap();
        let rotated = svc.regenerate_unlock(&admin, "p").await.unwrap();

        assert_eq!(svc.open_staff_session("p", "UNLOCK").await.unwrap(), None);
        assert!(
            svc.open_staff_session("p", &rotated.staff_unlock_token)
                .await
                .unwrap()
                .is_some()
        );
        assert!(svc.staff_authorized(Some(&session), "p"));
    }
}
