//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// An unset variable without a default is an error naming `field`.
/// Values without `${` are returned unchanged, so a bare `$` is kept as is.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand environment variables, then a leading `~` to the home directory.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(shellexpand::tilde(&expanded).into_owned())
}

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var_and_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDKROKI_TEST_HOST", "kroki.internal");
            std::env::remove_var("MDKROKI_TEST_PORT");
        }
        let result = expand_env(
            "http://${MDKROKI_TEST_HOST}:${MDKROKI_TEST_PORT:-8000}",
            "kroki.server_url",
        )
        .unwrap();
        assert_eq!(result, "http://kroki.internal:8000");
        unsafe {
            std::env::remove_var("MDKROKI_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDKROKI_TEST_MISSING");
        }
        let err = expand_env("${MDKROKI_TEST_MISSING}", "kroki.user_agent").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("MDKROKI_TEST_MISSING"), "{msg}");
        assert!(msg.contains("kroki.user_agent"), "{msg}");
    }

    #[test]
    fn test_bare_dollar_kept() {
        assert_eq!(expand_env("cache/$tmp", "cache.dir").unwrap(), "cache/$tmp");
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/mdkroki-cache", "cache.dir").unwrap();
        assert!(expanded.ends_with("/mdkroki-cache"), "{expanded}");
        assert_eq!(expand_path("/abs/path", "cache.dir").unwrap(), "/abs/path");
    }
}
