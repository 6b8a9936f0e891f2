//! Load and validate the matrix file.

use anyhow::{Context, Result};
use std::path::Path;

use super::schema::{Matrix, MatrixFile};

/// Read, parse, and validate a matrix YAML file.
pub fn load_matrix(path: &Path) -> Result<Matrix> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix file: {}", path.display()))?;
    let file: MatrixFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse matrix file: {}", path.display()))?;
    let matrix = Matrix::from_file(file)?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_matrix(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_full_matrix() {
        let f = write_matrix(
            r#"
skip_missing_interpreters: true
envs:
  - name: py311
    deps: requirements/test.txt
    commands:
      - pytest {posargs}
  - name: flake8
    interpreter: python3
    deps: requirements/lint.txt
    commands:
      - flake8 progressbar tests
  - name: docs
    changedir: docs
    setenv:
      SPHINXOPTS: -W
    commands:
      - sphinx-build -b html . _build/html
"#,
        );
        let matrix = load_matrix(f.path()).unwrap();
        assert!(matrix.skip_missing_interpreters);
        assert_eq!(matrix.envs.len(), 3);

        let py = &matrix.envs[0];
        assert_eq!(py.name, "py311");
        assert_eq!(py.interpreter, "py311");
        assert_eq!(py.deps.as_deref().unwrap().to_str(), Some("requirements/test.txt"));

        let docs = &matrix.envs[2];
        assert_eq!(docs.interpreter, "python3");
        assert_eq!(docs.changedir.as_deref().unwrap().to_str(), Some("docs"));
        assert_eq!(docs.setenv, vec![("SPHINXOPTS".to_string(), "-W".to_string())]);
    }

    #[test]
    fn test_load_rejects_bad_yaml() {
        let f = write_matrix("envs: [:::");
        assert!(load_matrix(f.path()).is_err());
    }

    #[test]
    fn test_load_rejects_unbalanced_quotes_in_command() {
        let f = write_matrix(
            r#"
envs:
  - name: broken
    commands:
      - "echo 'oops"
"#,
        );
        let err = load_matrix(f.path()).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_load_missing_file_has_path_in_error() {
        let err = load_matrix(Path::new("/nonexistent/matrix.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/matrix.yaml"));
    }
}
