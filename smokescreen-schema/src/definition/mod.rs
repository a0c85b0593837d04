//! The definition mini-language.
//!
//! A definition is a pipe-delimited list of directives, each optionally
//! carrying a value after the first colon:
//!
//! ```text
//! relation:users|default|method:includeOwner
//! ```
//!
//! [`DefinitionParser`] turns such strings into a [`Definition`]. Typed views
//! are built on top: [`IncludeMap`] for transformer include declarations and
//! [`PropDefinition`] for prop formatting.

mod include;
mod parser;
mod prop;

pub use include::{IncludeDeclarations, IncludeMap, IncludeMapEntry, ResourceType};
pub use parser::DefinitionParser;
pub use prop::{PROP_TYPES, PropDefinition};

use indexmap::IndexMap;

/// Parsed directive settings, in declaration order.
///
/// A directive given without a value (eg. `default`) is present with `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    directives: IndexMap<String, Option<String>>,
}

impl Definition {
    /// Create an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the directive is present, with or without a value.
    pub fn has(&self, directive: &str) -> bool {
        self.directives.contains_key(directive)
    }

    /// The value of a directive, if present and given a value.
    pub fn get(&self, directive: &str) -> Option<&str> {
        self.directives.get(directive).and_then(|v| v.as_deref())
    }

    /// Set a directive.
    pub fn set(&mut self, directive: impl Into<String>, value: Option<String>) -> &mut Self {
        self.directives.insert(directive.into(), value);
        self
    }

    /// Returns true if no directives were given.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Iterate over directives in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.directives
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// The underlying directive map.
    pub fn as_map(&self) -> &IndexMap<String, Option<String>> {
        &self.directives
    }
}
