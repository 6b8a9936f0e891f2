use clap::{Parser, Subcommand};

/// matrun - run a test/quality matrix across isolated environments
#[derive(Parser, Debug)]
#[command(name = "matrun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the matrix (all environments, or only the named ones)
    Run {
        /// Environment names to run (default: every environment, in
        /// declared order)
        #[arg(value_name = "ENV_NAMES")]
        env_names: Vec<String>,

        /// Arguments after `--`, forwarded to commands at {posargs}
        #[arg(last = true, value_name = "POSARGS")]
        posargs: Vec<String>,

        /// Path to the matrix file
        #[arg(short, long, value_name = "FILE", default_value = "matrix.yaml")]
        config: String,

        /// Project root (default: the matrix file's directory)
        #[arg(long, value_name = "DIR")]
        root: Option<String>,

        /// Custom cache directory for environments
        #[arg(long, value_name = "DIR", env = "MATRUN_CACHE_DIR")]
        cache_dir: Option<String>,

        /// Skip environments whose interpreter is missing instead of failing
        #[arg(long, default_value = "false")]
        skip_missing: bool,
    },

    /// List the environments declared in the matrix
    List {
        /// Path to the matrix file
        #[arg(short, long, value_name = "FILE", default_value = "matrix.yaml")]
        config: String,
    },

    /// Parse and validate the matrix file without running anything
    Validate {
        /// Path to the matrix file
        #[arg(short, long, value_name = "FILE", default_value = "matrix.yaml")]
        config: String,
    },
}
