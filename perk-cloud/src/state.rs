//! Application state for perk-cloud

use std::sync::Arc;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::db::{MemoryPerkStore, PerkStore, PgPerkStore};
use crate::perk::{PerkService, StaffSessionSigner};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Perk allocation core
    pub service: PerkService,
    /// HS256 secret for caller identity tokens
    pub jwt_secret: String,
    /// Mark the staff cookie `Secure` (off only in development)
    pub cookie_secure: bool,
    /// Prefix for the scanner redirect target
    pub app_base_url: String,
    /// Rate limiter for check-in and unlock routes
    pub rate_limiter: RateLimiter,
    /// Key IP buckets on `X-Forwarded-For` instead of the peer address
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Build state, connecting to Postgres when `DATABASE_URL` is set
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn PerkStore> = match &config.database_url {
            Some(url) => {
                let store = PgPerkStore::connect(url).await?;
                tracing::info!("Connected to PostgreSQL, migrations applied");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
                Arc::new(MemoryPerkStore::new())
            }
        };
        Self::with_store(config, store)
    }

    /// Build state over an existing store
    pub fn with_store(config: &Config, store: Arc<dyn PerkStore>) -> Result<Self, BoxError> {
        let signer = StaffSessionSigner::new(
            &config.staff_session_secret,
            chrono::Duration::minutes(config.staff_session_ttl_minutes),
        )
        .map_err(|e| format!("STAFF_SESSION_SECRET unusable: {e}"))?;
        Ok(Self {
            service: PerkService::new(store, signer, config.default_max_claims),
            jwt_secret: config.jwt_secret.clone(),
            cookie_secure: !config.is_development(),
            app_base_url: config.app_base_url.clone(),
            rate_limiter: RateLimiter::new(),
            trust_forwarded_for: config.trust_proxy_headers,
        })
    }

    /// Where the scanner UI for a perk lives
    pub fn staff_page_url(&self, perk_id: &str) -> String {
        format!("{}/perks/{perk_id}/staff", self.app_base_url)
    }
}
