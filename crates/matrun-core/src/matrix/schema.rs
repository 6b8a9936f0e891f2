//! Matrix file schema and the validated in-memory model.
//!
//! `MatrixFile` / `EnvConfig` mirror the YAML on disk; `Matrix` /
//! `Environment` are the validated form the dispatcher consumes.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::PathBuf;

use regex::Regex;
use serde::Deserialize;

use crate::error::MatrixError;

use super::command::split_command;

/// Raw matrix file as deserialized from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct MatrixFile {
    /// When true, an unresolvable interpreter marks the environment as
    /// skipped instead of failing the whole invocation.
    #[serde(default)]
    pub skip_missing_interpreters: bool,

    /// Environments in declared order.
    #[serde(default)]
    pub envs: Vec<EnvConfig>,
}

/// One environment entry as written in the matrix file.
#[derive(Deserialize, Debug, Clone)]
pub struct EnvConfig {
    /// Unique environment name, e.g. "py311" or "flake8".
    pub name: String,

    /// Interpreter selector, e.g. "python3.11" or "pypy3". When omitted it
    /// is derived from the name ("py311" -> "py311", otherwise "python3").
    #[serde(default)]
    pub interpreter: Option<String>,

    /// Path to a requirements file, relative to the project root. Absent
    /// means no isolated virtualenv is provisioned.
    #[serde(default)]
    pub deps: Option<String>,

    /// Working directory for the commands, relative to the project root.
    #[serde(default)]
    pub changedir: Option<String>,

    /// Ordered command list. Must be non-empty.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Extra environment variables exported to the commands.
    #[serde(default)]
    pub setenv: BTreeMap<String, String>,
}

/// Validated environment, ready for dispatch.
#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub interpreter: String,
    pub deps: Option<PathBuf>,
    pub changedir: Option<PathBuf>,
    pub commands: Vec<String>,
    pub setenv: Vec<(String, String)>,
}

/// Validated matrix: ordered environments plus the skip-missing policy.
#[derive(Debug, Clone)]
pub struct Matrix {
    pub skip_missing_interpreters: bool,
    pub envs: Vec<Environment>,
}

/// Derive an interpreter selector from an environment name.
/// "py311" / "py3.11" / "python3.11" / "pypy3" style names select
/// themselves; anything else defaults to "python3".
fn default_selector_for(name: &str) -> String {
    let re = Regex::new(r"^py(?:thon|py)?\d*(?:\.\d+)?$").expect("env name regex is valid");
    if re.is_match(name) {
        name.to_string()
    } else {
        "python3".to_string()
    }
}

impl Matrix {
    /// Validate a raw file into a runnable matrix.
    ///
    /// Enforces: at least one environment, unique names, non-empty command
    /// lists, and commands that tokenize cleanly.
    pub fn from_file(file: MatrixFile) -> Result<Self, MatrixError> {
        if file.envs.is_empty() {
            return Err(MatrixError::InvalidConfig(
                "matrix declares no environments".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut envs = Vec::with_capacity(file.envs.len());
        for cfg in file.envs {
            if cfg.name.trim().is_empty() {
                return Err(MatrixError::InvalidConfig(
                    "environment with empty name".to_string(),
                ));
            }
            if !seen.insert(cfg.name.clone()) {
                return Err(MatrixError::InvalidConfig(format!(
                    "duplicate environment name `{}`",
                    cfg.name
                )));
            }
            if cfg.commands.is_empty() {
                return Err(MatrixError::InvalidConfig(format!(
                    "environment `{}` has no commands",
                    cfg.name
                )));
            }
            for raw in &cfg.commands {
                // Surface quoting mistakes at load time, not mid-run.
                split_command(raw).map_err(|e| {
                    MatrixError::InvalidConfig(format!(
                        "environment `{}`: {e}",
                        cfg.name
                    ))
                })?;
            }

            let interpreter = cfg
                .interpreter
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default_selector_for(&cfg.name));

            envs.push(Environment {
                name: cfg.name,
                interpreter,
                deps: cfg.deps.map(PathBuf::from),
                changedir: cfg.changedir.map(PathBuf::from),
                commands: cfg.commands,
                setenv: cfg.setenv.into_iter().collect(),
            });
        }

        Ok(Self {
            skip_missing_interpreters: file.skip_missing_interpreters,
            envs,
        })
    }

    /// Environments to run: the declared order, filtered by `names` when a
    /// selection is given. Unknown names are rejected before anything runs.
    pub fn select(&self, names: Option<&[String]>) -> Result<Vec<&Environment>, MatrixError> {
        match names {
            None => Ok(self.envs.iter().collect()),
            Some(names) if names.is_empty() => Ok(self.envs.iter().collect()),
            Some(names) => {
                for name in names {
                    if !self.envs.iter().any(|e| &e.name == name) {
                        return Err(MatrixError::UnknownEnvironment(name.clone()));
                    }
                }
                Ok(self
                    .envs
                    .iter()
                    .filter(|e| names.contains(&e.name))
                    .collect())
            }
        }
    }
}
