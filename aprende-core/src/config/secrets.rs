//! Secrets handling for configuration
//!
//! Provider credentials and the panel password are wrapped in
//! [`SecretString`], which never prints its value through `Debug` or
//! `Display`.

use serde::{Deserialize, Serialize};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// Credential or password that never prints itself
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for headers and query strings only
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare against a candidate without exposing the value
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    /// Enough of the value to tell keys apart in startup logs.
    ///
    /// Keys with a vendor prefix (`sk-`, `gsk_`) keep the prefix and the last
    /// four characters; anything of eight characters or fewer is hidden.
    pub fn partial_redact(&self) -> String {
        let value = self.0.as_str();
        if value.is_empty() {
            return "[EMPTY]".to_string();
        }
        if value.len() <= 8 || !value.is_ascii() {
            return REDACTED.to_string();
        }

        let tail = &value[value.len() - 4..];
        match ["sk-", "gsk_"].iter().find(|p| value.starts_with(**p)) {
            Some(prefix) => format!("{prefix}...{tail}"),
            None => format!("{}...{}", &value[..2], &value[value.len() - 2..]),
        }
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
