//! Process-level configuration from environment variables.
//!
//! Centralizes the fallback chains so business code never repeats
//! `or_else` ladders over `env::var`.

use std::env;
use std::path::PathBuf;

/// Read an environment variable, falling back to a default when unset or empty.
pub fn env_or<F>(name: &str, default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Read an environment variable, treating empty values as unset.
pub fn env_optional(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Parse a boolean environment variable: anything but 0/false/no/off is true.
pub fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(s) => parse_bool(&s),
        Err(_) => default,
    }
}

fn parse_bool(s: &str) -> bool {
    !matches!(
        s.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Logging and audit settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// MATRUN_QUIET=1: only WARN and above are logged.
    pub quiet: bool,
    /// MATRUN_LOG_LEVEL: tracing filter directive (default "matrun=info").
    pub log_level: String,
    /// MATRUN_LOG_JSON=1: JSON log lines instead of human-readable.
    pub log_json: bool,
    /// MATRUN_AUDIT_LOG: path of the JSONL audit trail, if any.
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            quiet: env_bool("MATRUN_QUIET", false),
            log_level: env_or("MATRUN_LOG_LEVEL", || "matrun=info".to_string()),
            log_json: env_bool("MATRUN_LOG_JSON", false),
            audit_log: env_optional("MATRUN_AUDIT_LOG"),
        }
    }
}

/// Environment cache location settings.
#[derive(Debug, Clone)]
pub struct CacheConfig;

impl CacheConfig {
    /// Cache base directory override from MATRUN_CACHE_DIR.
    pub fn cache_dir() -> Option<String> {
        env_optional("MATRUN_CACHE_DIR")
    }

    /// Resolve the directory that holds per-environment virtualenvs.
    /// Priority: explicit override > MATRUN_CACHE_DIR > OS cache dir.
    pub fn envs_dir(override_dir: Option<&str>) -> PathBuf {
        let base = override_dir
            .map(PathBuf::from)
            .or_else(|| Self::cache_dir().map(PathBuf::from))
            .or_else(|| dirs::cache_dir().map(|d| d.join("matrun")))
            .unwrap_or_else(|| PathBuf::from(".matrun-cache"));
        base.join("envs")
    }
}
