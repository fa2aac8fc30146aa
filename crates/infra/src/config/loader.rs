//! Configuration loader
//!
//! Loads [`OptimizerConfig`] from a file, then applies environment
//! overrides and validates the result.
//!
//! ## Loading Strategy
//! 1. An explicit path must exist
//! 2. Without one, searches the working directory for a config file
//! 3. No file at all yields the defaults
//! 4. `OPTIQ_*` environment variables override file values
//!
//! ## Environment Variables
//! - `OPTIQ_BASE_URL`: Base URL for relative request paths
//! - `OPTIQ_CACHE_MAX_SIZE`: Shared cache capacity
//! - `OPTIQ_RETRY`: Default retry count
//! - `OPTIQ_TIMEOUT_MS`: Default per-attempt timeout in milliseconds
//! - `OPTIQ_LOG_LEVEL`: Tracing filter directive (e.g. `debug`)
//! - `OPTIQ_LOG_FORMAT`: `pretty` or `json`
//!
//! ## File Locations
//! The loader looks for the following names (in order):
//! `optiq.toml`, `optiq.json`, `config.toml`, `config.json`

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use optiq_domain::{LogFormat, OptiqError, OptimizerConfig, Result};
use tracing::{debug, info};

/// File names searched when no explicit path is given
pub const CONFIG_FILE_NAMES: [&str; 4] = ["optiq.toml", "optiq.json", "config.toml", "config.json"];

/// Load configuration with the full fallback strategy
///
/// # Errors
/// Returns `OptiqError::Config` if:
/// - `path` is given but does not exist
/// - The file cannot be read or parsed
/// - An environment override is malformed
/// - The resulting configuration fails validation
pub fn load(path: Option<PathBuf>) -> Result<OptimizerConfig> {
    let config = match path {
        Some(path) => load_from_file(&path)?,
        None => match find_config_file() {
            Some(found) => load_from_file(&found)?,
            None => {
                info!("No config file found, using defaults");
                OptimizerConfig::default()
            }
        },
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// Format is detected by extension. The result is not validated; [`load`]
/// does that after environment overrides.
///
/// # Errors
/// Returns `OptiqError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: &Path) -> Result<OptimizerConfig> {
    if !path.exists() {
        return Err(OptiqError::Config(format!("Config file not found: {}", path.display())));
    }

    info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| OptiqError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// `.toml` and `.json` are supported; a path without an extension is
/// treated as TOML.
///
/// # Errors
/// Returns `OptiqError::Config` if the format is unsupported or parsing
/// fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<OptimizerConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OptiqError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OptiqError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(OptiqError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First config file in the current working directory, if any
pub fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_in_dir(&cwd)
}

/// First of [`CONFIG_FILE_NAMES`] that exists in `dir`
pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    let found = CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).find(|path| path.is_file());
    if let Some(path) = &found {
        debug!(path = %path.display(), "Found config file");
    }
    found
}

/// Apply `OPTIQ_*` overrides read through `lookup`
///
/// # Errors
/// Returns `OptiqError::Config` naming the variable whose value does not
/// parse.
pub fn apply_env_overrides<F>(mut config: OptimizerConfig, lookup: F) -> Result<OptimizerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup("OPTIQ_BASE_URL") {
        config.http.base_url = Some(base_url);
    }
    if let Some(raw) = lookup("OPTIQ_CACHE_MAX_SIZE") {
        config.cache.max_size = parse_var("OPTIQ_CACHE_MAX_SIZE", &raw)?;
    }
    if let Some(raw) = lookup("OPTIQ_RETRY") {
        config.request.retry = parse_var("OPTIQ_RETRY", &raw)?;
    }
    if let Some(raw) = lookup("OPTIQ_TIMEOUT_MS") {
        config.request.timeout = Duration::from_millis(parse_var("OPTIQ_TIMEOUT_MS", &raw)?);
    }
    if let Some(level) = lookup("OPTIQ_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(raw) = lookup("OPTIQ_LOG_FORMAT") {
        config.logging.format = match raw.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(OptiqError::Config(format!(
                    "Invalid OPTIQ_LOG_FORMAT: {raw} (expected pretty or json)"
                )))
            }
        };
    }
    Ok(config)
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| OptiqError::Config(format!("Invalid {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use optiq_domain::EvictionMode;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_toml_and_json() {
        let toml = parse_config("[cache]\nmax_size = 5\neviction = \"lru\"\n", Path::new("a.toml"))
            .expect("toml");
        assert_eq!(toml.cache.max_size, 5);
        assert_eq!(toml.cache.eviction, EvictionMode::Lru);

        let json = parse_config(r#"{"request": {"retry": 4}}"#, Path::new("a.json")).expect("json");
        assert_eq!(json.request.retry, 4);
        assert_eq!(json.cache, OptimizerConfig::default().cache);
    }

    #[test]
    fn test_parse_rejects_unknown_extension() {
        let err = parse_config("", Path::new("config.yaml")).expect_err("yaml");
        assert_eq!(err, OptiqError::Config("Unsupported config format: yaml".to_string()));
    }

    #[test]
    fn test_parse_reports_format_errors() {
        let err = parse_config("[cache", Path::new("optiq.toml")).expect_err("broken toml");
        assert!(matches!(err, OptiqError::Config(msg) if msg.starts_with("Invalid TOML format")));
    }

    /// Validates every supported override and that untouched fields keep
    /// their values.
    #[test]
    fn test_env_overrides() {
        let lookup = env(&[
            ("OPTIQ_BASE_URL", "http://localhost:3000"),
            ("OPTIQ_CACHE_MAX_SIZE", "50"),
            ("OPTIQ_RETRY", " 0 "),
            ("OPTIQ_TIMEOUT_MS", "2500"),
            ("OPTIQ_LOG_LEVEL", "debug"),
            ("OPTIQ_LOG_FORMAT", "JSON"),
        ]);

        let config = apply_env_overrides(OptimizerConfig::default(), lookup).expect("overrides");

        assert_eq!(config.http.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.cache.max_size, 50);
        assert_eq!(config.request.retry, 0);
        assert_eq!(config.request.timeout, Duration::from_millis(2500));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.request.backoff, OptimizerConfig::default().request.backoff);
    }

    #[test]
    fn test_env_override_parse_errors() {
        let err = apply_env_overrides(OptimizerConfig::default(), env(&[("OPTIQ_RETRY", "many")]))
            .expect_err("not a number");
        assert!(matches!(err, OptiqError::Config(msg) if msg.starts_with("Invalid OPTIQ_RETRY")));

        let err =
            apply_env_overrides(OptimizerConfig::default(), env(&[("OPTIQ_LOG_FORMAT", "xml")]))
                .expect_err("bad format");
        assert!(matches!(err, OptiqError::Config(msg) if msg.contains("OPTIQ_LOG_FORMAT")));
    }
}
