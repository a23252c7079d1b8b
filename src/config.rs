use std::{env, fmt::Display, num::NonZeroU64, str::FromStr};

use anyhow::{anyhow, Context};
use jsonwebtoken::Algorithm;
use tracing::{info, warn};

pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt_public_key: String,
    pub jwt_algorithm: Algorithm,
    pub rate_limit_per_second: NonZeroU64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "8000")?,
            database_url: require("DATABASE_URL")?,
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", "5")?,
            jwt_public_key: require("JWT_PUBLIC_KEY")?,
            jwt_algorithm: try_load("JWT_ALGORITHM", "RS384")?,
            rate_limit_per_second: try_load("RATE_LIMIT_PER_SECOND", "100")?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("Environment variable {key} must be set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Invalid {key} value {raw:?}: {e}")
    })
}
