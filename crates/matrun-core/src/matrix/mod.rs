//! Matrix model: the declarative environment list and its YAML schema.

pub mod command;
pub mod loader;
pub mod schema;

pub use loader::load_matrix;
pub use schema::{EnvConfig, Environment, Matrix, MatrixFile};
