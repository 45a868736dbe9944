use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value is present but invalid.
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
/// Returns `ConfigError` if any value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let env = parse_environment(&or_default("PROMPTBANK_ENV", "development"))?;

    let bind_addr = parse_addr("PROMPTBANK_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PROMPTBANK_LOG_LEVEL", "info");
    let keywords_path = PathBuf::from(or_default(
        "PROMPTBANK_KEYWORDS_PATH",
        "./config/keywords.yaml",
    ));

    let engine_worker_threads = parse_usize("PROMPTBANK_ENGINE_WORKER_THREADS", "0")?;
    let cache_max_entries = parse_usize("PROMPTBANK_CACHE_MAX_ENTRIES", "16")?;
    if cache_max_entries == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROMPTBANK_CACHE_MAX_ENTRIES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let max_body_bytes = parse_usize("PROMPTBANK_MAX_BODY_BYTES", "67108864")?;
    if max_body_bytes == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROMPTBANK_MAX_BODY_BYTES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        keywords_path,
        engine_worker_threads,
        cache_max_entries,
        max_body_bytes,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PROMPTBANK_ENV".to_string(),
            reason: format!(
                "unknown environment '{other}'; expected development, test, or production"
            ),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
