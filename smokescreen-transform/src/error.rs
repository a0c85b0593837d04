//! Error types for the transformation pipeline.
//!
//! Every failure is fatal to the current transformation: nothing is retried
//! or swallowed and no partial output is produced.
//!
//! ```rust
//! use smokescreen_transform::TransformError;
//!
//! let err = TransformError::missing_resource();
//! assert!(err.is_resource_error());
//! assert!(err.to_string().contains("no resource"));
//! ```

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use smokescreen_schema::ParseError;
use thiserror::Error;

/// Boxed error returned by external collaborators such as relation loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors raised while transforming, serializing or composing resources.
#[derive(Error, Debug, Diagnostic)]
pub enum TransformError {
    /// An include or definition string could not be parsed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Definition(#[from] ParseError),

    /// A transformer could not be resolved.
    #[error("invalid transformer: {message}")]
    #[diagnostic(code(smokescreen::transform::invalid_transformer))]
    InvalidTransformer { message: String },

    /// A serializer name or value was not recognised.
    #[error("invalid serializer: {message}")]
    #[diagnostic(
        code(smokescreen::transform::invalid_serializer),
        help("expected one of `default`, `simple_collection` or `none`")
    )]
    InvalidSerializer { message: String },

    /// A compositor name or value was not recognised.
    #[error("invalid compositor: {message}")]
    #[diagnostic(
        code(smokescreen::transform::invalid_compositor),
        help("expected one of `default` or `none`")
    )]
    InvalidCompositor { message: String },

    /// Data of a shape the pipeline cannot handle.
    #[error("unhandled resource type: {message}")]
    #[diagnostic(code(smokescreen::transform::unhandled_resource_type))]
    UnhandledResourceType { message: String },

    /// An include could not be resolved.
    #[error("cannot include `{key}`: {message}")]
    #[diagnostic(code(smokescreen::transform::include))]
    Include { key: String, message: String },

    /// An operation required a resource and none was set.
    #[error("no resource has been set")]
    #[diagnostic(
        code(smokescreen::transform::missing_resource),
        help("call `item()` or `collection()` first")
    )]
    MissingResource,

    /// Output could not be encoded or decoded.
    #[error("failed to encode output")]
    #[diagnostic(code(smokescreen::transform::json_encode))]
    JsonEncode {
        #[source]
        source: serde_json::Error,
    },

    /// A prop definition could not be applied to a value.
    #[error("invalid definition for prop `{key}`: {message}")]
    #[diagnostic(code(smokescreen::transform::invalid_definition))]
    InvalidDefinition { key: String, message: String },

    /// The relation loader failed.
    #[error("failed to load relations [{}]", relations.join(", "))]
    #[diagnostic(code(smokescreen::transform::relation_load))]
    RelationLoad {
        relations: Vec<String>,
        #[source]
        source: BoxError,
    },
}

impl TransformError {
    /// Create an invalid transformer error.
    pub fn invalid_transformer(message: impl Into<String>) -> Self {
        Self::InvalidTransformer {
            message: message.into(),
        }
    }

    /// Create an invalid serializer error.
    pub fn invalid_serializer(message: impl Into<String>) -> Self {
        Self::InvalidSerializer {
            message: message.into(),
        }
    }

    /// Create an invalid compositor error.
    pub fn invalid_compositor(message: impl Into<String>) -> Self {
        Self::InvalidCompositor {
            message: message.into(),
        }
    }

    /// Create an unhandled resource type error.
    pub fn unhandled_resource(message: impl Into<String>) -> Self {
        Self::UnhandledResourceType {
            message: message.into(),
        }
    }

    /// Create an include error.
    pub fn include(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Include {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a missing resource error.
    pub fn missing_resource() -> Self {
        Self::MissingResource
    }

    /// Create an invalid prop definition error.
    pub fn invalid_definition(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Check if this is a parse error from an include or definition string.
    pub fn is_definition_error(&self) -> bool {
        matches!(self, Self::Definition(_) | Self::InvalidDefinition { .. })
    }

    /// Check if this error concerns the resource itself.
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Self::MissingResource | Self::UnhandledResourceType { .. } | Self::Include { .. }
        )
    }

    /// Check if this is a strategy configuration error.
    pub fn is_strategy_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransformer { .. }
                | Self::InvalidSerializer { .. }
                | Self::InvalidCompositor { .. }
        )
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonEncode { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_converts() {
        let err: TransformError = ParseError::definition("owner", "Unsupported key 'x'").into();
        assert!(err.is_definition_error());
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn test_relation_load_display() {
        let err = TransformError::RelationLoad {
            relations: vec!["users".into(), "comments".into()],
            source: "connection reset".into(),
        };
        assert_eq!(err.to_string(), "failed to load relations [users, comments]");
    }

    #[test]
    fn test_predicates() {
        assert!(TransformError::missing_resource().is_resource_error());
        assert!(TransformError::include("owner", "no data").is_resource_error());
        assert!(TransformError::invalid_serializer("xml").is_strategy_error());
        assert!(!TransformError::invalid_compositor("x").is_resource_error());
    }
}
