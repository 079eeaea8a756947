use serde::Deserialize;

/// Which field(s) identify a user at registration and login.
///
/// The journaling app historically shipped two parallel auth paths: one keyed
/// on email only with short-lived tokens, one keyed on email-or-username with
/// week-long tokens. Both behaviors survive here, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierMode {
    Email,
    EmailOrUsername,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub identifier_mode: IdentifierMode,
    /// Whether registration also issues a token (auto-login).
    pub auto_login: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let identifier_mode = match std::env::var("AUTH_IDENTIFIER_MODE").as_deref() {
            Ok("email-or-username") => IdentifierMode::EmailOrUsername,
            _ => IdentifierMode::Email,
        };

        // Per-mode defaults match the two original flows: 1 hour and no
        // auto-login for email mode, 7 days and auto-login for
        // email-or-username mode. Env vars override either.
        let (default_ttl, default_auto_login) = match identifier_mode {
            IdentifierMode::Email => (60, false),
            IdentifierMode::EmailOrUsername => (60 * 24 * 7, true),
        };

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mindlog".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mindlog-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(default_ttl),
        };

        let auth = AuthConfig {
            identifier_mode,
            auto_login: std::env::var("AUTH_AUTO_LOGIN")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(default_auto_login),
        };

        Ok(Self {
            database_url,
            jwt,
            auth,
        })
    }
}
