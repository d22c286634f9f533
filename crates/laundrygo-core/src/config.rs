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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let parse_path = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "collection path must be non-empty".to_string(),
            });
        }
        Ok(trimmed.to_string())
    };

    let database_url = require("LAUNDRYGO_DATABASE_URL")?;
    if !(database_url.starts_with("https://") || database_url.starts_with("http://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "LAUNDRYGO_DATABASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{database_url}'"),
        });
    }
    let database_auth = lookup("LAUNDRYGO_DATABASE_AUTH")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("LAUNDRYGO_ENV", "development"));
    let log_level = or_default("LAUNDRYGO_LOG_LEVEL", "info");

    let records_path = parse_path("LAUNDRYGO_RECORDS_PATH", "laundries")?;
    let points_path = parse_path("LAUNDRYGO_POINTS_PATH", "points")?;

    let request_timeout_secs = parse_u64("LAUNDRYGO_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("LAUNDRYGO_USER_AGENT", "laundrygo/0.1 (laundry-discovery)");
    let max_retries = parse_u32("LAUNDRYGO_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("LAUNDRYGO_RETRY_BACKOFF_BASE_MS", "1000")?;
    let location_timeout_secs = parse_u64("LAUNDRYGO_LOCATION_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        database_auth,
        env,
        log_level,
        records_path,
        points_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        location_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
