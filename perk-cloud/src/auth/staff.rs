//! Staff session cookie

use http::HeaderMap;
use http::header::{COOKIE, HeaderValue};

pub const STAFF_COOKIE: &str = "perk_staff";

/// Read the staff session from the request's `Cookie` headers
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == STAFF_COOKIE)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a freshly minted session
pub fn session_cookie(
    session: &str,
    max_age: chrono::Duration,
    secure: bool,
) -> Result<HeaderValue, http::header::InvalidHeaderValue> {
    let mut cookie = format!(
        "{STAFF_COOKIE}={session}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        max_age.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
