//! Observability: tracing init and the JSONL audit trail.
//!
//! Uses `ObservabilityConfig` for MATRUN_QUIET, MATRUN_LOG_LEVEL,
//! MATRUN_LOG_JSON, and MATRUN_AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use matrun_core::config::ObservabilityConfig;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call once at process startup.
/// When MATRUN_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "matrun=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn audit_path() -> Option<String> {
    let path = ObservabilityConfig::from_env().audit_log?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Audit: a matrix run started.
pub fn audit_run_started(config: &str, selection: &[String]) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "run_started",
            "config": config,
            "selection": selection,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: one environment finished with a status.
pub fn audit_env_completed(env: &str, status: &str, detail: Option<&str>) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "env_completed",
            "env": env,
            "status": status,
            "detail": detail,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: the whole run finished (or aborted part-way).
pub fn audit_run_completed(passed: usize, failed: usize, skipped: usize, aborted: Option<&str>) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "run_completed",
            "passed": passed,
            "failed": failed,
            "skipped": skipped,
            "aborted": aborted,
            "success": failed == 0 && aborted.is_none(),
        });
        append_jsonl(&path, &record);
    }
}
