//! The `run` subcommand: dispatch the matrix and print the summary.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use matrun_core::matrix::load_matrix;
use matrun_runner::{run_matrix, EnvStatus, RunOptions, RunSummary, SystemInterpreterResolver};

use crate::observability;

pub struct RunArgs {
    pub config: String,
    pub env_names: Vec<String>,
    pub posargs: Vec<String>,
    pub root: Option<String>,
    pub cache_dir: Option<String>,
    pub skip_missing: bool,
}

/// Run the matrix and return whether every selected environment passed or
/// was skipped. The caller turns `false` into a non-zero exit code.
pub fn run(args: RunArgs) -> Result<bool> {
    let config_path = Path::new(&args.config);
    let matrix = load_matrix(config_path)?;

    let project_root = match args.root {
        Some(root) => PathBuf::from(root),
        None => config_path
            .canonicalize()
            .with_context(|| format!("Resolve matrix file path: {}", config_path.display()))?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let selection = if args.env_names.is_empty() {
        None
    } else {
        Some(args.env_names.as_slice())
    };

    observability::audit_run_started(&args.config, &args.env_names);

    let opts = RunOptions {
        skip_missing: args.skip_missing,
        cache_dir: args.cache_dir,
        posargs: args.posargs,
    };
    let resolver = SystemInterpreterResolver;
    let summary = run_matrix(&project_root, &matrix, selection, &resolver, &opts)?;

    print_summary(&summary);

    for result in &summary.results {
        let detail = match &result.status {
            EnvStatus::Failed(err) => Some(err.to_string()),
            EnvStatus::Skipped { reason } => Some(reason.clone()),
            EnvStatus::Passed => None,
        };
        observability::audit_env_completed(&result.name, result.status.label(), detail.as_deref());
    }
    let (passed, failed, skipped) = summary.counts();
    observability::audit_run_completed(
        passed,
        failed,
        skipped,
        summary.aborted.as_ref().map(|e| e.to_string()).as_deref(),
    );

    Ok(summary.exit_ok())
}

/// Print per-environment status lines and the tally. Output only; audit
/// events are emitted by `run`.
fn print_summary(summary: &RunSummary) {
    println!();
    for result in &summary.results {
        match &result.status {
            EnvStatus::Passed => println!("{}: passed", result.name),
            EnvStatus::Failed(err) => println!("{}: failed ({err})", result.name),
            EnvStatus::Skipped { reason } => println!("{}: skipped ({reason})", result.name),
        }
    }
    let (passed, failed, skipped) = summary.counts();
    println!("{passed} passed, {failed} failed, {skipped} skipped");
    if let Some(err) = &summary.aborted {
        eprintln!("run aborted: {err}");
    }
}
