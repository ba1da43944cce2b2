/// Configuration management for the discovery engine
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Tuning knobs for the suggestion and notification computations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of suggested users returned per viewer.
    pub suggested_users_cap: usize,
    /// Per-pool cap for post-suggestion candidate pools and for the
    /// follower-count ranking that seeds the popular-user fallback.
    pub suggestion_pool_cap: usize,
    /// Combined cap for the popular-user fallback list (ranked users plus
    /// zero-follower fill).
    pub popular_users_cap: usize,
    /// Trailing notification window, in days.
    pub notification_window_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            suggested_users_cap: 15,
            suggestion_pool_cap: 50,
            popular_users_cap: 100,
            notification_window_days: 120,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// documented defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            suggested_users_cap: env_parse("SUGGESTED_USERS_CAP", defaults.suggested_users_cap),
            suggestion_pool_cap: env_parse("SUGGESTION_POOL_CAP", defaults.suggestion_pool_cap),
            popular_users_cap: env_parse("POPULAR_USERS_CAP", defaults.popular_users_cap),
            notification_window_days: env_parse(
                "NOTIFICATION_WINDOW_DAYS",
                defaults.notification_window_days,
            ),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections in pool
    pub min_connections: u32,
    /// Connection acquisition timeout
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: env_parse("DB_MAX_CONNECTIONS", 20),
            min_connections: env_parse("DB_MIN_CONNECTIONS", 5),
            acquire_timeout_secs: env_parse("DB_ACQUIRE_TIMEOUT_SECS", 10),
            idle_timeout_secs: env_parse("DB_IDLE_TIMEOUT_SECS", 600),
            max_lifetime_secs: env_parse("DB_MAX_LIFETIME_SECS", 1800),
        })
    }
}

/// Create a Postgres pool from the database configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
        .context("Failed to connect to Postgres")?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool created"
    );
    Ok(pool)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
