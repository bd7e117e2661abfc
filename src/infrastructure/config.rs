use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Clone)]
pub struct VisionConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
    pub cookie_secure: bool,
    pub upload_dir: PathBuf,
    pub smtp: Option<SmtpConfig>,
    pub order_notify_email: Option<String>,
    pub vision: Option<VisionConfig>,
    pub admin: Option<AdminCredentials>,
    pub seed_demo: bool,
}

pub const DEFAULT_VISION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/sefer_store".to_string(),
            port: 3001,
            cors_allowed_origins: Vec::new(),
            session_secret: uuid::Uuid::new_v4().to_string(),
            session_ttl: chrono::Duration::hours(168),
            cookie_secure: false,
            upload_dir: PathBuf::from("uploads"),
            smtp: None,
            order_notify_email: None,
            vision: None,
            admin: None,
            seed_demo: false,
        }
    }
}

/// Non-empty, trimmed environment value.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(name: &str) -> bool {
    var(name).is_some_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Longest accepted session lifetime, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Positive hour count, capped at [`MAX_SESSION_TTL_HOURS`].
fn session_ttl_hours(raw: &str) -> Option<chrono::Duration> {
    raw.parse::<i64>()
        .ok()
        .filter(|h| *h > 0)
        .map(|h| h.min(MAX_SESSION_TTL_HOURS))
        .and_then(chrono::Duration::try_hours)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let session_secret = var("SESSION_SECRET").unwrap_or_else(|| {
            tracing::warn!(
                "SESSION_SECRET is not set; using a random secret, sessions will not survive a restart"
            );
            defaults.session_secret.clone()
        });

        let smtp = var("SMTP_HOST").and_then(|host| {
            let Some(from) = var("SMTP_FROM").or_else(|| var("SMTP_USERNAME")) else {
                tracing::warn!("SMTP_HOST is set without SMTP_FROM; email is disabled");
                return None;
            };
            Some(SmtpConfig {
                host,
                port: var("SMTP_PORT").and_then(|p| p.parse().ok()).unwrap_or(587),
                username: var("SMTP_USERNAME"),
                password: var("SMTP_PASSWORD"),
                from,
            })
        });

        let vision = var("VISION_API_KEY").map(|api_key| VisionConfig {
            api_key,
            api_url: var("VISION_API_URL").unwrap_or_else(|| DEFAULT_VISION_URL.to_string()),
            model: var("VISION_MODEL").unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        });

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            _ => None,
        };

        Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            session_secret,
            session_ttl: var("SESSION_TTL_HOURS")
                .and_then(|h| session_ttl_hours(&h))
                .unwrap_or(defaults.session_ttl),
            cookie_secure: flag("COOKIE_SECURE"),
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            smtp,
            order_notify_email: var("ORDER_NOTIFY_EMAIL"),
            vision,
            admin,
            seed_demo: flag("SEED_DEMO"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_is_positive_and_capped() {
        assert_eq!(session_ttl_hours("24"), Some(chrono::Duration::hours(24)));
        assert_eq!(session_ttl_hours("0"), None);
        assert_eq!(session_ttl_hours("-5"), None);
        assert_eq!(session_ttl_hours("week"), None);
        assert_eq!(
            session_ttl_hours("9223372036854775807"),
            Some(chrono::Duration::hours(MAX_SESSION_TTL_HOURS))
        );
    }

    #[test]
    fn only_affirmative_flags_are_true() {
        for yes in ["1", "true", "TRUE", "yes"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off"] {
            assert!(!is_truthy(no), "{no}");
        }
    }
}
