//! The `list` subcommand: show what the matrix declares.

use anyhow::Result;
use std::path::Path;

use matrun_core::matrix::load_matrix;

pub fn list(config: &str) -> Result<()> {
    let matrix = load_matrix(Path::new(config))?;
    for env in &matrix.envs {
        let deps = env
            .deps
            .as_deref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  interpreter={}  deps={}  commands={}",
            env.name,
            env.interpreter,
            deps,
            env.commands.len()
        );
    }
    Ok(())
}
