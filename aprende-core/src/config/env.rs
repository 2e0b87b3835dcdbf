//! Environment variable interpolation for configuration

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;

const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

fn env_var_pattern() -> Result<Regex, ConfigError> {
    Regex::new(ENV_VAR_PATTERN).map_err(|e| ConfigError::Invalid {
        message: format!("bad env var pattern: {e}"),
    })
}

/// Replace every `${VAR}` in `content` with the value of `VAR`.
///
/// Fails on the first referenced variable that is not set.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let pattern = env_var_pattern()?;
    let mut missing: Option<String> = None;

    let result = pattern.replace_all(content, |cap: &Captures| match env::var(&cap[1]) {
        Ok(value) => value,
        Err(_) => {
            missing.get_or_insert_with(|| cap[1].to_string());
            String::new()
        }
    });

    match missing {
        Some(var) => Err(ConfigError::MissingEnvVar { var }),
        None => Ok(result.into_owned()),
    }
}

/// Non-empty value of an environment variable
pub(crate) fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Value of an environment variable, or `default` when unset or empty
pub(crate) fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env_vars() {
        env::set_var("APRENDE_TEST_VAR", "test_value");

        let content = "api_key: ${APRENDE_TEST_VAR}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "api_key: test_value");

        env::remove_var("APRENDE_TEST_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let content = "api_key: ${APRENDE_MISSING_VAR}";
        let result = interpolate_env_vars(content);

        match result {
            Err(ConfigError::MissingEnvVar { var }) => assert_eq!(var, "APRENDE_MISSING_VAR"),
            other => panic!("Expected MissingEnvVar error, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_env_vars() {
        env::set_var("APRENDE_VAR1", "value1");
        env::set_var("APRENDE_VAR2", "value2");

        let content = "key1: ${APRENDE_VAR1}, key2: ${APRENDE_VAR2}, again: ${APRENDE_VAR1}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "key1: value1, key2: value2, again: value1");

        env::remove_var("APRENDE_VAR1");
        env::remove_var("APRENDE_VAR2");
    }

    #[test]
    fn test_lowercase_placeholders_are_left_alone() {
        let content = "senha: ${not_a_var}";
        assert_eq!(interpolate_env_vars(content).unwrap(), content);
    }

    #[test]
    fn test_var_or_treats_empty_as_unset() {
        env::set_var("APRENDE_EMPTY_VAR", "");
        assert_eq!(var_or("APRENDE_EMPTY_VAR", "smed2025"), "smed2025");
        assert_eq!(var("APRENDE_EMPTY_VAR"), None);
        env::remove_var("APRENDE_EMPTY_VAR");
    }
}
