use std::net::IpAddr;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    /// Prefix for links sent by email.
    pub base_url: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub reset_timeout: Duration,
    pub session_ttl: Duration,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

/// Three days.
pub const DEFAULT_RESET_TIMEOUT_SECS: i64 = 259_200;
/// Two weeks.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 1_209_600;

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("ROOMHUB_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid ROOMHUB_HOST: {e}"))?;

        let port: u16 = env_or("ROOMHUB_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid ROOMHUB_PORT: {e}"))?;

        let base_url = env_or("ROOMHUB_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let max_body_size: usize = env_or("ROOMHUB_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid ROOMHUB_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("ROOMHUB_LOG_LEVEL", "info");

        let reset_timeout = env_seconds("ROOMHUB_RESET_TIMEOUT_SECS", DEFAULT_RESET_TIMEOUT_SECS)?;
        let session_ttl = env_seconds("ROOMHUB_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;

        let smtp = match (
            std::env::var("ROOMHUB_SMTP_HOST").ok(),
            std::env::var("ROOMHUB_SMTP_PORT").ok(),
            std::env::var("ROOMHUB_SMTP_USER").ok(),
            std::env::var("ROOMHUB_SMTP_PASS").ok(),
            std::env::var("ROOMHUB_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid ROOMHUB_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            max_body_size,
            log_level,
            reset_timeout,
            session_ttl,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Upper bound for configured lifetimes: ten years.
pub const MAX_LIFETIME_SECS: i64 = 315_360_000;

fn env_seconds(key: &str, default: i64) -> Result<Duration, String> {
    parse_seconds(key, &env_or(key, &default.to_string()))
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration, String> {
    let secs: i64 = raw.parse().map_err(|e| format!("Invalid {key}: {e}"))?;
    if secs <= 0 {
        return Err(format!("Invalid {key}: must be positive"));
    }
    if secs > MAX_LIFETIME_SECS {
        return Err(format!("Invalid {key}: must be at most {MAX_LIFETIME_SECS} seconds"));
    }
    Duration::try_seconds(secs).ok_or_else(|| format!("Invalid {key}: out of range"))
}
