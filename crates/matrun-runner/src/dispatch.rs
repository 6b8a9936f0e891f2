//! Sequential matrix dispatcher.
//!
//! Runs the selected environments in declared order: resolve interpreter,
//! provision virtualenv, execute commands. One environment finishes (pass,
//! fail, or skip) before the next starts; a failing environment never
//! stops the ones after it.

use std::path::{Path, PathBuf};

use matrun_core::error::MatrixError;
use matrun_core::matrix::command::{split_command, substitute_posargs};
use matrun_core::matrix::{Environment, Matrix};

use crate::builder;
use crate::exec;
use crate::resolver::InterpreterResolver;

/// Final status of one environment.
#[derive(Debug)]
pub enum EnvStatus {
    Passed,
    Failed(MatrixError),
    Skipped { reason: String },
}

impl EnvStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EnvStatus::Passed => "passed",
            EnvStatus::Failed(_) => "failed",
            EnvStatus::Skipped { .. } => "skipped",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EnvStatus::Failed(_))
    }
}

/// One environment's outcome, in declared order.
#[derive(Debug)]
pub struct EnvResult {
    pub name: String,
    pub status: EnvStatus,
}

/// Outcome of a whole invocation: exactly one status per environment that
/// was processed, plus the abort error when the run stopped early.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<EnvResult>,
    /// Set when the run stopped before processing every selected
    /// environment (unresolvable interpreter without skip-missing).
    /// Statuses of environments that already ran are kept in `results`.
    pub aborted: Option<MatrixError>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.status.is_failed())
    }

    /// True when the invocation should exit 0: no failures and no abort.
    pub fn exit_ok(&self) -> bool {
        !self.has_failures() && self.aborted.is_none()
    }

    /// (passed, failed, skipped) tallies for the summary line.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for r in &self.results {
            match r.status {
                EnvStatus::Passed => counts.0 += 1,
                EnvStatus::Failed(_) => counts.1 += 1,
                EnvStatus::Skipped { .. } => counts.2 += 1,
            }
        }
        counts
    }
}

/// Invocation-level options merged from config and CLI.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Treat unresolvable interpreters as skips (config flag or --skip-missing).
    pub skip_missing: bool,
    /// Override for the envs cache directory.
    pub cache_dir: Option<String>,
    /// Trailing CLI arguments spliced at `{posargs}`.
    pub posargs: Vec<String>,
}

/// Run the matrix, optionally restricted to `selection`.
///
/// Returns `Err` only when nothing has run yet (unknown environment name
/// in the selection). Per-environment failures are recorded in the summary
/// and the run continues; an unresolvable interpreter without skip-missing
/// stops the run but keeps the statuses already collected, with the error
/// in `RunSummary::aborted`.
pub fn run_matrix(
    project_root: &Path,
    matrix: &Matrix,
    selection: Option<&[String]>,
    resolver: &dyn InterpreterResolver,
    opts: &RunOptions,
) -> Result<RunSummary, MatrixError> {
    let selected = matrix.select(selection)?;
    let skip_missing = opts.skip_missing || matrix.skip_missing_interpreters;
    let envs_dir = matrun_core::config::CacheConfig::envs_dir(opts.cache_dir.as_deref());

    let mut summary = RunSummary::default();
    for env in selected {
        tracing::info!(env = %env.name, interpreter = %env.interpreter, "environment start");

        let Some(interpreter) = resolver.resolve(&env.interpreter) else {
            if skip_missing {
                tracing::warn!(env = %env.name, selector = %env.interpreter, "interpreter missing, skipping");
                summary.results.push(EnvResult {
                    name: env.name.clone(),
                    status: EnvStatus::Skipped {
                        reason: format!("interpreter `{}` not found", env.interpreter),
                    },
                });
                continue;
            }
            tracing::error!(env = %env.name, selector = %env.interpreter, "interpreter missing, aborting run");
            summary.aborted = Some(MatrixError::InterpreterNotFound {
                env: env.name.clone(),
                selector: env.interpreter.clone(),
            });
            break;
        };

        let status = run_environment(project_root, env, &interpreter.path, &envs_dir, opts);
        tracing::info!(env = %env.name, status = status.label(), "environment done");
        summary.results.push(EnvResult {
            name: env.name.clone(),
            status,
        });
    }

    Ok(summary)
}

/// Provision and execute a single environment. Never propagates: every
/// outcome becomes a status.
fn run_environment(
    project_root: &Path,
    env: &Environment,
    interpreter: &Path,
    envs_dir: &Path,
    opts: &RunOptions,
) -> EnvStatus {
    let env_dir = match builder::ensure_environment(project_root, env, interpreter, envs_dir) {
        Ok(dir) => dir,
        Err(e) => {
            return EnvStatus::Failed(MatrixError::DependencyInstallFailed {
                env: env.name.clone(),
                reason: format!("{e:#}"),
            });
        }
    };

    let cwd = resolve_changedir(project_root, env.changedir.as_deref());
    if !cwd.is_dir() {
        return EnvStatus::Failed(MatrixError::InvalidConfig(format!(
            "working directory does not exist: {}",
            cwd.display()
        )));
    }

    for raw in &env.commands {
        let tokens = match split_command(raw) {
            Ok(t) => t,
            Err(e) => return EnvStatus::Failed(e),
        };
        let tokens = substitute_posargs(&tokens, &opts.posargs);
        if tokens.is_empty() {
            continue;
        }

        match exec::run_command(&tokens, &cwd, env_dir.as_deref(), &env.setenv) {
            Ok(0) => {}
            Ok(code) => {
                return EnvStatus::Failed(MatrixError::CommandFailed {
                    env: env.name.clone(),
                    command: raw.clone(),
                    detail: format!("exit code {code}"),
                });
            }
            Err(e) => {
                return EnvStatus::Failed(MatrixError::CommandFailed {
                    env: env.name.clone(),
                    command: raw.clone(),
                    detail: format!("{e:#}"),
                });
            }
        }
    }

    EnvStatus::Passed
}

fn resolve_changedir(project_root: &Path, changedir: Option<&Path>) -> PathBuf {
    match changedir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => project_root.join(dir),
        None => project_root.to_path_buf(),
    }
}
