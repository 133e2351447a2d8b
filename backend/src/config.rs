//! Runtime configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env` file. Every
//! setting has a default; an unparseable number falls back to its default with a warning.

use crate::store::schema::DEFAULT_LEGACY_OWNER;
use crate::store::PoolConfig;
use chrono::Utc;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiry: chrono::Duration,
    pub log_file: Option<PathBuf>,
    pub pool: PoolConfig,
    /// Upper bound on a single request's store work.
    pub store_timeout: Duration,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub legacy_owner: String,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenv::dotenv() {
            log::debug!("no .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let pool_defaults = PoolConfig::default();
        let pool = PoolConfig {
            max_open: number(&get, "DB_MAX_OPEN_CONNS", pool_defaults.max_open),
            min_idle: number(&get, "DB_MIN_IDLE_CONNS", pool_defaults.min_idle),
            max_idle_time: minutes(&get, "DB_CONN_MAX_IDLE_MIN", pool_defaults.max_idle_time),
            max_lifetime: minutes(&get, "DB_CONN_MAX_LIFETIME_MIN", pool_defaults.max_lifetime),
            ..pool_defaults
        };

        let config = Config {
            env: text("APP_ENV", "development"),
            host: text("HOST", "127.0.0.1"),
            port: number(&get, "PORT", 8080),
            database_path: PathBuf::from(text("DATABASE_PATH", "clinic.sqlite")),
            jwt_secret: text("JWT_SECRET", DEV_JWT_SECRET),
            jwt_issuer: text("JWT_ISSUER", "phsio-track"),
            jwt_expiry: token_expiry(&get, 60),
            log_file: get("LOG_FILE").map(PathBuf::from),
            pool,
            store_timeout: Duration::from_secs(number(&get, "STORE_TIMEOUT_SECS", 10u64)),
            admin_username: get("ADMIN_USERNAME"),
            admin_password: get("ADMIN_PASSWORD"),
            legacy_owner: text("LEGACY_OWNER", DEFAULT_LEGACY_OWNER),
        };

        if config.is_production() && config.jwt_secret == DEV_JWT_SECRET {
            log::warn!("JWT_SECRET is unset in production; tokens are signed with the development secret");
        }
        config
    }

    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

fn number<T, F>(get: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy + PartialOrd + Default + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(n) if n > T::default() => n,
            _ => {
                log::warn!("{}='{}' is not a positive number, using {}", key, raw, default);
                default
            }
        },
    }
}

fn minutes<F>(get: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let default_min = default.as_secs() / 60;
    let min = number(get, key, default_min);
    match min.checked_mul(60) {
        Some(secs) => Duration::from_secs(secs),
        None => {
            log::warn!("{}={} is out of range, using {}", key, min, default_min);
            default
        }
    }
}

/// `JWT_EXPIRY_MIN`, bounded so that `now + expiry` stays representable.
fn token_expiry<F>(get: &F, default_min: i64) -> chrono::Duration
where
    F: Fn(&str) -> Option<String>,
{
    let default = chrono::Duration::minutes(default_min);
    let min = number(get, "JWT_EXPIRY_MIN", default_min);
    chrono::Duration::try_minutes(min)
        .filter(|d| Utc::now().checked_add_signed(*d).is_some())
        .unwrap_or_else(|| {
            log::warn!("JWT_EXPIRY_MIN={} is out of range, using {}", min, default_min);
            default
        })
}
