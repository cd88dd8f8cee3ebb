use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use common_auth::config::{
    DEFAULT_ACCESS_TTL_SECONDS, DEFAULT_LEEWAY_SECONDS, DEFAULT_REFRESH_TTL_SECONDS,
    MAX_TTL_SECONDS,
};
use common_auth::JwtConfig;
use tracing::warn;

use crate::store::DatabaseSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 50051;
const DEV_JWT_SECRET: &str = "dev_secret_4321";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 5;
const DEFAULT_CONNECTION_LIFETIME_MINUTES: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    /// `None` selects the in-memory store.
    pub database: Option<DatabaseSettings>,
    pub request_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST value '{}'", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

pub fn load_service_config() -> Result<ServiceConfig> {
    ServiceConfig::from_lookup(|key| env::var(key).ok())
}

impl ServiceConfig {
    /// Build the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).and_then(|value| normalize_optional(&value));

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;

        let secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set; falling back to the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };
        let jwt = JwtConfig::new(secret)
            .with_access_ttl(parse_or(
                get("ACCESS_TOKEN_LIFETIME"),
                "ACCESS_TOKEN_LIFETIME",
                DEFAULT_ACCESS_TTL_SECONDS,
            )?)
            .with_refresh_ttl(parse_or(
                get("REFRESH_TOKEN_LIFETIME"),
                "REFRESH_TOKEN_LIFETIME",
                DEFAULT_REFRESH_TTL_SECONDS,
            )?)
            .with_leeway(parse_or(
                get("TOKEN_LEEWAY_SECONDS"),
                "TOKEN_LEEWAY_SECONDS",
                DEFAULT_LEEWAY_SECONDS,
            )?);
        for (key, ttl) in [
            ("ACCESS_TOKEN_LIFETIME", jwt.access_ttl_seconds),
            ("REFRESH_TOKEN_LIFETIME", jwt.refresh_ttl_seconds),
        ] {
            if !(1..=MAX_TTL_SECONDS).contains(&ttl) {
                anyhow::bail!("{key} must be between 1 and {MAX_TTL_SECONDS} seconds, got {ttl}");
            }
        }

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseSettings {
                url,
                max_connections: parse_or(
                    get("DB_MAX_OPEN_CONNECTIONS"),
                    "DB_MAX_OPEN_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
                min_connections: parse_or(
                    get("DB_MAX_IDLE_CONNECTIONS"),
                    "DB_MAX_IDLE_CONNECTIONS",
                    DEFAULT_MIN_CONNECTIONS,
                )?,
                max_lifetime: Duration::from_secs(
                    parse_or(
                        get("DB_CONNECTION_MAX_LIFETIME"),
                        "DB_CONNECTION_MAX_LIFETIME",
                        DEFAULT_CONNECTION_LIFETIME_MINUTES,
                    )?
                    .checked_mul(60)
                    .context("DB_CONNECTION_MAX_LIFETIME is out of range")?,
                ),
            }),
            None => None,
        };

        let request_timeout = Duration::from_secs(parse_or(
            get("REQUEST_TIMEOUT_SECONDS"),
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?);

        let allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|value| parse_list(&value))
            .unwrap_or_default();

        Ok(ServiceConfig {
            host,
            port,
            jwt,
            database,
            request_timeout,
            allowed_origins,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Failed to parse {key} value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
