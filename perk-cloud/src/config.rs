//! Perk service configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Perk service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL (None = in-memory store, development only)
    pub database_url: Option<String>,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for caller identity tokens
    pub jwt_secret: String,
    /// HMAC secret for staff sessions
    pub staff_session_secret: String,
    /// Staff session lifetime (minutes); also the cookie Max-Age
    pub staff_session_ttl_minutes: i64,
    /// Prefix for the scanner redirect target
    pub app_base_url: String,
    /// Capacity applied when a new perk has none
    pub default_max_claims: i64,
    /// Honour `X-Forwarded-For` (only behind a proxy that overwrites it)
    pub trust_proxy_headers: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        Ok(Self {
            database_url,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            staff_session_secret: Self::require_secret("STAFF_SESSION_SECRET", &environment)?,
            staff_session_ttl_minutes: std::env::var("STAFF_SESSION_TTL_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|m| *m > 0)
                .unwrap_or(120),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            default_max_claims: std::env::var("DEFAULT_MAX_CLAIMS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(25),
            trust_proxy_headers: std::env::var("TRUST_PROXY_HEADERS")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            environment,
        })
    }

    /// Fixed configuration for tests and local tooling
    pub fn for_development() -> Self {
        Self {
            database_url: None,
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            staff_session_secret: "dev-STAFF_SESSION_SECRET-not-for-production".into(),
            staff_session_ttl_minutes: 120,
            app_base_url: String::new(),
            default_max_claims: 25,
            trust_proxy_headers: false,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_placeholder_for_missing_secret() {
        let secret = Config::require_secret("PERK_TEST_UNSET_SECRET_A", "development").unwrap();
        assert_eq!(secret, "dev-PERK_TEST_UNSET_SECRET_A-not-for-production");
    }

    #[test]
    fn production_requires_secret() {
        let err = Config::require_secret("PERK_TEST_UNSET_SECRET_B", "production").unwrap_err();
        assert!(err.to_string().contains("must be set"));
    }

    #[test]
    fn development_defaults() {
        let config = Config::for_development();
        assert!(config.is_development());
        assert!(config.database_url.is_none());
        assert_eq!(config.staff_session_ttl_minutes, 120);
        assert_eq!(config.default_max_claims, 25);
        assert!(!config.trust_proxy_headers);
    }
}
