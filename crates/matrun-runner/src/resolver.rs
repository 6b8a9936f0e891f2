//! InterpreterResolver trait: extension point for locating interpreters.
//!
//! The dispatcher resolves each environment's selector through this trait
//! before anything is provisioned or run, so tests can substitute a stub
//! and production code can grow new selector schemes.

use std::path::{Path, PathBuf};

use regex::Regex;

/// A resolved interpreter: the concrete binary the selector mapped to.
#[derive(Debug, Clone)]
pub struct ResolvedInterpreter {
    /// Path to the interpreter executable (e.g. /usr/bin/python3.11)
    pub path: PathBuf,
}

/// Extension point for resolving interpreter selectors.
///
/// Returns `None` if the selector cannot be satisfied on this machine;
/// the dispatcher decides whether that skips the environment or fails the
/// invocation.
pub trait InterpreterResolver: Send + Sync {
    fn resolve(&self, selector: &str) -> Option<ResolvedInterpreter>;
}

/// Resolver backed by PATH lookup.
///
/// Selector grammar:
/// - `py311`, `py3.11`, `python3.11` -> `python3.11`; `py3` -> `python3`
/// - `python` / `python3` -> `python3`, then `python`
/// - a selector containing a path separator -> used as-is if it exists
/// - anything else -> literal PATH lookup (covers `pypy3` and friends)
#[derive(Debug, Default)]
pub struct SystemInterpreterResolver;

impl SystemInterpreterResolver {
    /// Candidate binary names for a selector, most specific first.
    fn candidates(selector: &str) -> Vec<String> {
        if selector == "python" || selector == "python3" {
            return vec!["python3".to_string(), "python".to_string()];
        }

        let re = Regex::new(r"^py(?:thon)?(\d)(?:\.?(\d+))?$").expect("selector regex is valid");
        if let Some(caps) = re.captures(selector) {
            let major = caps.get(1).map(|m| m.as_str()).unwrap_or("3");
            return match caps.get(2) {
                Some(minor) => vec![format!("python{}.{}", major, minor.as_str())],
                None => vec![format!("python{major}")],
            };
        }

        vec![selector.to_string()]
    }
}

impl InterpreterResolver for SystemInterpreterResolver {
    fn resolve(&self, selector: &str) -> Option<ResolvedInterpreter> {
        // Explicit paths bypass PATH lookup entirely.
        if selector.contains(std::path::MAIN_SEPARATOR) || selector.contains('/') {
            let path = Path::new(selector);
            return path.is_file().then(|| ResolvedInterpreter {
                path: path.to_path_buf(),
            });
        }

        for candidate in Self::candidates(selector) {
            if let Ok(path) = which::which(&candidate) {
                tracing::debug!(selector = %selector, path = %path.display(), "interpreter resolved");
                return Some(ResolvedInterpreter { path });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_versioned_selectors() {
        assert_eq!(
            SystemInterpreterResolver::candidates("py311"),
            vec!["python3.11"]
        );
        assert_eq!(
            SystemInterpreterResolver::candidates("py3.12"),
            vec!["python3.12"]
        );
        assert_eq!(
            SystemInterpreterResolver::candidates("python3.9"),
            vec!["python3.9"]
        );
        assert_eq!(SystemInterpreterResolver::candidates("py3"), vec!["python3"]);
    }

    #[test]
    fn test_candidates_bare_python() {
        assert_eq!(
            SystemInterpreterResolver::candidates("python"),
            vec!["python3", "python"]
        );
    }

    #[test]
    fn test_candidates_unknown_selector_is_literal() {
        assert_eq!(
            SystemInterpreterResolver::candidates("pypy3"),
            vec!["pypy3"]
        );
    }

    #[test]
    fn test_resolve_explicit_path() {
        let resolver = SystemInterpreterResolver;
        // /bin/sh exists on any unix test machine.
        #[cfg(unix)]
        {
            let resolved = resolver.resolve("/bin/sh").expect("/bin/sh resolves");
            assert_eq!(resolved.path, PathBuf::from("/bin/sh"));
        }
        assert!(resolver.resolve("/nonexistent/interpreter").is_none());
    }
}
