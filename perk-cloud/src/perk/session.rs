//! Staff session signing
//!
//! A staff session is `{perkId}.{expiryEpochSeconds}.{base64url(HMAC-SHA256)}`.
//! Nothing is stored server-side: any instance holding the secret can verify
//! a session minted by any other instance.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime
pub const DEFAULT_TTL_MINUTES: i64 = 120;

#[derive(Clone)]
pub struct StaffSessionSigner {
    /// Keyed, unused MAC state; cloned for every signature
    keyed: HmacSha256,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for StaffSessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffSessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl StaffSessionSigner {
    pub fn new(
        secret: impl AsRef<[u8]>,
        ttl: chrono::Duration,
    ) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret.as_ref())?,
            ttl,
        })
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Mint a session for `perk_id` with the configured lifetime
    pub fn mint(&self, perk_id: &str) -> String {
        self.mint_with_ttl(perk_id, self.ttl)
    }

    pub fn mint_with_ttl(&self, perk_id: &str, ttl: chrono::Duration) -> String {
        let expiry = shared::util::now_secs() + ttl.num_seconds();
        self.mint_until(perk_id, expiry)
    }

    /// Mint a session that expires at `expiry` (Unix seconds)
    pub fn mint_until(&self, perk_id: &str, expiry: i64) -> String {
        let payload = format!("{perk_id}.{expiry}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes()).finalize().into_bytes());
        format!("{payload}.{signature}")
    }

    /// Check `session` against `perk_id` at the current time
    pub fn verify(&self, session: &str, perk_id: &str) -> bool {
        self.verify_at(session, perk_id, shared::util::now_secs())
    }

    /// Check `session` against `perk_id` at `now` (Unix seconds).
    ///
    /// Malformed input is simply invalid; this never panics or errors.
    pub fn verify_at(&self, session: &str, perk_id: &str, now: i64) -> bool {
        let mut parts = session.rsplitn(3, '.');
        let (Some(signature), Some(expiry), Some(session_perk)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        if session_perk != perk_id {
            return false;
        }
        let Ok(expiry_secs) = expiry.parse::<i64>() else {
            return false;
        };
        if now >= expiry_secs {
            return false;
        }
        let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };

        let payload = format!("{session_perk}.{expiry}");
        // Constant-time comparison via hmac::verify_slice
        self.mac(payload.as_bytes()).verify_slice(&signature).is_ok()
    }

    /// Constant-time equality for a presented unlock token.
    ///
    /// Both sides are MACed first so the comparison time does not depend on
    /// where the strings first differ.
    pub fn unlock_matches(&self, presented: &str, expected: &str) -> bool {
        if expected.is_empty() {
            return false;
        }
        let expected_tag = self.mac(expected.as_bytes()).finalize().into_bytes();
        self.mac(presented.as_bytes())
            .verify_slice(&expected_tag)
            .is_ok()
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(data);
        mac
    }
}
