//! The `validate` subcommand: parse and check the matrix file.

use anyhow::Result;
use std::path::Path;

use matrun_core::matrix::load_matrix;

pub fn validate(config: &str) -> Result<()> {
    let matrix = load_matrix(Path::new(config))?;
    println!(
        "Matrix OK: {} environment(s), skip_missing_interpreters={}",
        matrix.envs.len(),
        matrix.skip_missing_interpreters
    );
    Ok(())
}
