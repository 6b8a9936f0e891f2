//! Provision isolated virtualenvs for environments that declare deps.
//!
//! Environments are cached under the envs dir, keyed by a content hash over
//! the project root, environment name, interpreter selector, and the
//! requirements file. A changed requirements file therefore lands in a
//! fresh directory instead of mutating a stale one.

use anyhow::{Context, Result};
use matrun_core::matrix::Environment;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Cache key for an environment's virtualenv.
pub fn env_cache_key(project_root: &Path, env: &Environment) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(
        project_root
            .canonicalize()
            .unwrap_or_else(|_| project_root.to_path_buf())
            .to_string_lossy()
            .as_bytes(),
    );
    hasher.update(env.name.as_bytes());
    hasher.update(env.interpreter.as_bytes());
    if let Some(ref deps) = env.deps {
        let path = project_root.join(deps);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Read requirements file: {}", path.display()))?;
        hasher.update(content.as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}

/// The scripts directory inside a virtualenv (`bin` on unix, `Scripts` on
/// Windows layouts).
pub fn venv_bin_dir(env_dir: &Path) -> PathBuf {
    let scripts = env_dir.join("Scripts");
    if scripts.exists() {
        scripts
    } else {
        env_dir.join("bin")
    }
}

fn venv_python(env_dir: &Path) -> Option<PathBuf> {
    for p in [
        env_dir.join("bin").join("python"),
        env_dir.join("Scripts").join("python.exe"),
    ] {
        if p.exists() {
            return Some(p);
        }
    }
    None
}

/// Ensure an isolated virtualenv for the environment.
///
/// Returns `None` when the environment declares no deps (commands then run
/// against the system PATH). A cached venv whose key matches is reused
/// without reinstalling.
pub fn ensure_environment(
    project_root: &Path,
    env: &Environment,
    interpreter: &Path,
    envs_dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some(ref deps) = env.deps else {
        return Ok(None);
    };

    std::fs::create_dir_all(envs_dir).context("Create envs cache dir")?;
    let key = env_cache_key(project_root, env)?;
    let env_dir = envs_dir.join(format!("{}-{}", env.name, &key[..16]));

    if venv_python(&env_dir).is_some() {
        tracing::debug!(env = %env.name, dir = %env_dir.display(), "reusing cached virtualenv");
        return Ok(Some(env_dir));
    }

    tracing::info!(env = %env.name, interpreter = %interpreter.display(), "creating virtualenv");
    let out = Command::new(interpreter)
        .arg("-m")
        .arg("venv")
        .arg(&env_dir)
        .current_dir(project_root)
        .output()
        .context("Create venv")?;
    if !out.status.success() {
        anyhow::bail!("venv creation failed: {}", String::from_utf8_lossy(&out.stderr));
    }

    install_requirements(project_root, deps, &env_dir)?;
    Ok(Some(env_dir))
}

fn install_requirements(project_root: &Path, deps: &Path, env_dir: &Path) -> Result<()> {
    let deps_path = project_root.join(deps);
    if !deps_path.exists() {
        anyhow::bail!("requirements file not found: {}", deps_path.display());
    }

    let pip_bin = env_dir.join("bin").join("pip");
    let pip_scripts = env_dir.join("Scripts").join("pip.exe");
    let mut cmd = if pip_bin.exists() {
        let mut c = Command::new(pip_bin);
        c.arg("install");
        c
    } else if pip_scripts.exists() {
        let mut c = Command::new(pip_scripts);
        c.arg("install");
        c
    } else {
        // Fallback: python -m pip
        let python = venv_python(env_dir)
            .ok_or_else(|| anyhow::anyhow!("virtualenv has no python: {}", env_dir.display()))?;
        let mut c = Command::new(python);
        c.arg("-m").arg("pip").arg("install");
        c
    };

    let out = cmd
        .arg("-r")
        .arg(&deps_path)
        .current_dir(project_root)
        .output()
        .context("pip install")?;
    if !out.status.success() {
        anyhow::bail!("pip install failed: {}", String::from_utf8_lossy(&out.stderr));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use matrun_core::matrix::{EnvConfig, Matrix, MatrixFile};

    fn test_env(deps: Option<&str>) -> Environment {
        let matrix = Matrix::from_file(MatrixFile {
            skip_missing_interpreters: false,
            envs: vec![EnvConfig {
                name: "py311".to_string(),
                interpreter: None,
                deps: deps.map(String::from),
                changedir: None,
                commands: vec!["pytest".to_string()],
                setenv: BTreeMap::new(),
            }],
        })
        .unwrap();
        matrix.envs.into_iter().next().unwrap()
    }

    #[test]
    fn test_no_deps_means_no_venv() {
        let root = tempfile::tempdir().unwrap();
        let envs_dir = root.path().join("envs");
        let env = test_env(None);
        let result =
            ensure_environment(root.path(), &env, Path::new("python3"), &envs_dir).unwrap();
        assert!(result.is_none());
        assert!(!envs_dir.exists());
    }

    #[test]
    fn test_cache_key_changes_with_requirements_content() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("requirements.txt"), "pytest>=7\n").unwrap();
        let env = test_env(Some("requirements.txt"));
        let key1 = env_cache_key(root.path(), &env).unwrap();

        std::fs::write(root.path().join("requirements.txt"), "pytest>=8\n").unwrap();
        let key2 = env_cache_key(root.path(), &env).unwrap();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_cache_key_missing_requirements_is_error() {
        let root = tempfile::tempdir().unwrap();
        let env = test_env(Some("requirements.txt"));
        assert!(env_cache_key(root.path(), &env).is_err());
    }

    #[test]
    fn test_venv_bin_dir_defaults_to_bin() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(venv_bin_dir(dir.path()), dir.path().join("bin"));
    }
}
