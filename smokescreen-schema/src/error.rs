//! Error types for include parsing, definition parsing and configuration.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while parsing include selectors, definitions or config.
#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    /// A definition string could not be parsed.
    #[error("invalid definition for `{key}`: {message}")]
    #[diagnostic(
        code(smokescreen::schema::parse_definition),
        help("directives are separated by `|`, values follow a `:`")
    )]
    ParseDefinition { key: String, message: String },

    /// Include parameters were malformed.
    #[error("invalid include parameters: {message}")]
    #[diagnostic(code(smokescreen::schema::parse_includes))]
    ParseIncludes { message: String },

    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(smokescreen::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(smokescreen::schema::config_error))]
    ConfigError { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(smokescreen::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },
}

impl ParseError {
    /// Create a definition error for the given key.
    pub fn definition(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseDefinition {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an include parameter error.
    pub fn includes(message: impl Into<String>) -> Self {
        Self::ParseIncludes {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// The key a definition error refers to, if any.
    pub fn definition_key(&self) -> Option<&str> {
        match self {
            Self::ParseDefinition { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_error_display() {
        let err = ParseError::definition("owner", "Unsupported key: foo");
        assert_eq!(
            err.to_string(),
            "invalid definition for `owner`: Unsupported key: foo"
        );
        assert_eq!(err.definition_key(), Some("owner"));
    }

    #[test]
    fn test_includes_error_has_no_definition_key() {
        let err = ParseError::includes("expected an object");
        assert!(err.definition_key().is_none());
        assert!(err.to_string().contains("expected an object"));
    }
}
