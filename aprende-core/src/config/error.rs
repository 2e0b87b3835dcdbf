//! Configuration errors
//!
//! Loading can fail at four stages: reading the file, substituting `${VAR}`
//! references, parsing, and validation. Each has its own variant so the
//! server can print a precise startup message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{}:{}: {message}", .line.unwrap_or(0), .column.unwrap_or(0))]
    Parse {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("environment variable '{var}' is referenced but not set")]
    MissingEnvVar { var: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// A rejected field, addressed by its dotted path (`providers.gemini.base_url`)
#[derive(Debug, Error)]
#[error("{field_path}: {kind}{}", context_suffix(.context))]
pub struct ValidationError {
    pub field_path: String,
    pub kind: ValidationErrorKind,
    pub context: Option<String>,
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("required")]
    Missing,

    #[error("expected {expected}, got '{actual}'")]
    Invalid { expected: String, actual: String },

    #[error("out of range, {0}")]
    OutOfRange(String),

    #[error("'{0}' listed more than once")]
    Duplicate(String),

    #[error("bad URL, {0}")]
    BadUrl(String),
}

impl ValidationError {
    fn at(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn required(field_path: impl Into<String>) -> Self {
        Self::at(field_path, ValidationErrorKind::Missing)
    }

    pub fn invalid_value(
        field_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::at(
            field_path,
            ValidationErrorKind::Invalid {
                expected: expected.into(),
                actual: actual.into(),
            },
        )
    }

    pub fn out_of_range(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(field_path, ValidationErrorKind::OutOfRange(message.into()))
    }

    pub fn duplicate(field_path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::at(field_path, ValidationErrorKind::Duplicate(value.into()))
    }

    pub fn invalid_url(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(field_path, ValidationErrorKind::BadUrl(message.into()))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
