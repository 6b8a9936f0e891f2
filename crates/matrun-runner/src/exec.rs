//! Spawn one tokenized command in an environment's context.

use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use std::process::Command;

use crate::builder::venv_bin_dir;

/// Run a command with inherited stdio and return its exit code.
///
/// When `env_dir` is set, the venv's scripts directory is prepended to
/// `PATH` and `VIRTUAL_ENV` is exported, so bare tool names (`pytest`,
/// `flake8`) resolve inside the isolated environment first.
pub fn run_command(
    tokens: &[String],
    cwd: &Path,
    env_dir: Option<&Path>,
    setenv: &[(String, String)],
) -> Result<i32> {
    let (program, args) = tokens
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("empty command"))?;

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(cwd);

    if let Some(env_dir) = env_dir {
        let bin = venv_bin_dir(env_dir);
        let path = match env::var_os("PATH") {
            Some(current) => {
                let mut parts = vec![bin.clone()];
                parts.extend(env::split_paths(&current));
                env::join_paths(parts).context("Compose PATH")?
            }
            None => bin.clone().into_os_string(),
        };
        cmd.env("PATH", path);
        cmd.env("VIRTUAL_ENV", env_dir);
    }
    for (key, value) in setenv {
        cmd.env(key, value);
    }

    tracing::debug!(command = %tokens.join(" "), cwd = %cwd.display(), "spawning command");
    let status = cmd
        .status()
        .with_context(|| format!("Failed to spawn `{program}`"))?;

    // A signal-terminated child has no code; report it as failure.
    Ok(status.code().unwrap_or(-1))
}
