//! Matrix execution: resolve interpreters, provision virtualenvs, run
//! commands, collect per-environment statuses.

pub mod builder;
pub mod dispatch;
pub mod exec;
pub mod resolver;

pub use dispatch::{run_matrix, EnvResult, EnvStatus, RunOptions, RunSummary};
pub use resolver::{InterpreterResolver, ResolvedInterpreter, SystemInterpreterResolver};
