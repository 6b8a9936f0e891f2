//! Typed error kinds for matrix execution.
//!
//! Per-environment failures (`DependencyInstallFailed`, `CommandFailed`) are
//! recorded in that environment's status and do not stop the run; the other
//! kinds abort the whole invocation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatrixError {
    /// The interpreter selector could not be resolved to a binary.
    /// Fatal unless `skip_missing_interpreters` is set.
    #[error("interpreter `{selector}` not found for environment `{env}`")]
    InterpreterNotFound { env: String, selector: String },

    /// Provisioning the environment's virtualenv or installing its declared
    /// dependencies failed. Fails that environment only.
    #[error("dependency install failed for environment `{env}`: {reason}")]
    DependencyInstallFailed { env: String, reason: String },

    /// A command exited non-zero or could not be spawned. Halts the
    /// remaining commands of that environment only.
    #[error("command `{command}` failed in environment `{env}`: {detail}")]
    CommandFailed {
        env: String,
        command: String,
        detail: String,
    },

    /// A name passed on the command line does not exist in the matrix.
    #[error("unknown environment `{0}` (not defined in the matrix)")]
    UnknownEnvironment(String),

    /// The matrix file is structurally invalid (duplicate names, empty
    /// command lists, unbalanced quotes, ...).
    #[error("invalid matrix configuration: {0}")]
    InvalidConfig(String),
}
