//! Command-line tokenization and `{posargs}` substitution.
//!
//! Commands in the matrix file are plain strings; they are split into argv
//! tokens here (quote-aware, no shell involved) so the dispatcher can spawn
//! them directly.

use crate::error::MatrixError;

/// Placeholder replaced by the CLI's trailing pass-through arguments.
pub const POSARGS: &str = "{posargs}";

/// Split a command string into argv tokens.
///
/// Supports single and double quotes; no escapes, no expansion. Unbalanced
/// quotes are a configuration error.
pub fn split_command(raw: &str) -> Result<Vec<String>, MatrixError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in raw.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(MatrixError::InvalidConfig(format!(
            "unbalanced quote in command `{raw}`"
        )));
    }
    if in_token {
        tokens.push(current);
    }
    if tokens.is_empty() {
        return Err(MatrixError::InvalidConfig(format!(
            "empty command `{raw}`"
        )));
    }
    Ok(tokens)
}

/// Splice pass-through arguments at `{posargs}` placeholders.
///
/// A token that is exactly the placeholder expands to the full argument
/// list; a token containing it gets the arguments joined with spaces.
/// Tokens without the placeholder are untouched, so commands that do not
/// opt in never see the extra arguments.
pub fn substitute_posargs(tokens: &[String], posargs: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token == POSARGS {
            out.extend(posargs.iter().cloned());
        } else if token.contains(POSARGS) {
            out.push(token.replace(POSARGS, &posargs.join(" ")));
        } else {
            out.push(token.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(raw: &str) -> Vec<String> {
        split_command(raw).unwrap()
    }

    #[test]
    fn test_split_plain_tokens() {
        assert_eq!(split("pytest -x tests"), vec!["pytest", "-x", "tests"]);
    }

    #[test]
    fn test_split_quoted_tokens() {
        assert_eq!(
            split(r#"python -c 'import sys; print(sys.version)'"#),
            vec!["python", "-c", "import sys; print(sys.version)"]
        );
        assert_eq!(split(r#"echo "a b" c"#), vec!["echo", "a b", "c"]);
    }

    #[test]
    fn test_split_empty_quotes_make_a_token() {
        assert_eq!(split(r#"cmd """#), vec!["cmd", ""]);
    }

    #[test]
    fn test_split_unbalanced_quote_is_error() {
        assert!(split_command("echo 'oops").is_err());
    }

    #[test]
    fn test_split_empty_command_is_error() {
        assert!(split_command("   ").is_err());
    }

    #[test]
    fn test_posargs_spliced_as_separate_tokens() {
        let tokens = split("pytest {posargs}");
        let args = vec!["-k".to_string(), "test_end".to_string()];
        assert_eq!(
            substitute_posargs(&tokens, &args),
            vec!["pytest", "-k", "test_end"]
        );
    }

    #[test]
    fn test_posargs_absent_placeholder_leaves_command_unchanged() {
        let tokens = split("flake8 src");
        let args = vec!["-k".to_string(), "foo".to_string()];
        assert_eq!(substitute_posargs(&tokens, &args), vec!["flake8", "src"]);
    }

    #[test]
    fn test_posargs_empty_args_drop_placeholder_token() {
        let tokens = split("pytest {posargs}");
        assert_eq!(substitute_posargs(&tokens, &[]), vec!["pytest"]);
    }

    #[test]
    fn test_posargs_embedded_in_token() {
        let tokens = split("pytest --cov-report={posargs}");
        let args = vec!["term".to_string()];
        assert_eq!(
            substitute_posargs(&tokens, &args),
            vec!["pytest", "--cov-report=term"]
        );
    }
}
