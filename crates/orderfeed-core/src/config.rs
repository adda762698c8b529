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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not read `.env` files. Use it in tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so tests can
/// drive them with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

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

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("ORDERFEED_ENV", "development"))?;

    let bind_addr = parse("ORDERFEED_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ORDERFEED_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("ORDERFEED_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ORDERFEED_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ORDERFEED_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let commerce_api_url = or_default("COMMERCE_API_URL", "https://api.ordercloud.io");
    let commerce_auth_url = or_default("COMMERCE_AUTH_URL", "https://auth.ordercloud.io");
    let commerce_client_id = optional("COMMERCE_CLIENT_ID");
    let commerce_client_secret = optional("COMMERCE_CLIENT_SECRET");
    let commerce_scope = or_default("COMMERCE_SCOPE", "FullAccess");
    let commerce_request_timeout_secs = parse_u64("COMMERCE_REQUEST_TIMEOUT_SECS", "30")?;
    let commerce_page_size = parse_u32("COMMERCE_PAGE_SIZE", "100")?;
    if commerce_page_size == 0 || commerce_page_size > 100 {
        return Err(ConfigError::InvalidEnvVar {
            var: "COMMERCE_PAGE_SIZE".to_string(),
            reason: format!("must be between 1 and 100, got {commerce_page_size}"),
        });
    }
    let commerce_max_retries = parse_u32("COMMERCE_MAX_RETRIES", "0")?;
    let commerce_retry_backoff_base_ms = parse_u64("COMMERCE_RETRY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        commerce_api_url,
        commerce_auth_url,
        commerce_client_id,
        commerce_client_secret,
        commerce_scope,
        commerce_request_timeout_secs,
        commerce_page_size,
        commerce_max_retries,
        commerce_retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ORDERFEED_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
