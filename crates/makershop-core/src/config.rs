use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Core parsing/validation logic, decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let media_root = PathBuf::from(require("MAKERSHOP_MEDIA_ROOT")?);

    let env = parse_environment(&or_default("MAKERSHOP_ENV", "development"))?;
    let log_level = or_default("MAKERSHOP_LOG_LEVEL", "info");
    let public_base_url = or_default("MAKERSHOP_PUBLIC_BASE_URL", "http://localhost:8080")
        .trim_end_matches('/')
        .to_string();
    let report_dir = PathBuf::from(or_default("MAKERSHOP_REPORT_DIR", "./reports"));
    let pricing_config_path = PathBuf::from(or_default(
        "MAKERSHOP_PRICING_CONFIG",
        "./config/pricing.yaml",
    ));

    let merge_chunk_size = parse_usize("MAKERSHOP_MERGE_CHUNK_SIZE", "1000")?;
    if merge_chunk_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAKERSHOP_MERGE_CHUNK_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let media_concurrency = parse_usize("MAKERSHOP_MEDIA_CONCURRENCY", "4")?;
    let db_max_connections = parse_u32("MAKERSHOP_DB_MAX_CONNECTIONS", "10")?;
    // Each media job pins one pool connection for its advisory lock; at or
    // above the pool size, jobs time out on acquire instead of syncing.
    if u32::try_from(media_concurrency).unwrap_or(u32::MAX) >= db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAKERSHOP_MEDIA_CONCURRENCY".to_string(),
            reason: format!(
                "must be below MAKERSHOP_DB_MAX_CONNECTIONS ({db_max_connections})"
            ),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        media_root,
        public_base_url,
        report_dir,
        pricing_config_path,
        merge_chunk_size,
        media_concurrency,
        db_max_connections,
        db_min_connections: parse_u32("MAKERSHOP_DB_MIN_CONNECTIONS", "1")?,
        db_acquire_timeout_secs: parse_u64("MAKERSHOP_DB_ACQUIRE_TIMEOUT_SECS", "10")?,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MAKERSHOP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
