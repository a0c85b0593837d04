use super::{Definition, DefinitionParser};
use crate::error::ParseResult;

/// Built-in prop types, usable as bare short keys (`integer` means `type:integer`).
pub const PROP_TYPES: &[&str] = &[
    "int",
    "integer",
    "real",
    "float",
    "double",
    "string",
    "bool",
    "boolean",
    "array",
    "date",
    "datetime",
    "datetime_utc",
];

/// Formatting settings for one declared prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropDefinition {
    key: String,
    definition: Definition,
}

impl PropDefinition {
    /// Parse a prop definition string such as `datetime|timezone:+10:00|map:created`.
    pub fn parse(key: impl Into<String>, input: &str) -> ParseResult<Self> {
        let parser = DefinitionParser::new().with_short_keys("type", PROP_TYPES.iter().copied());
        Ok(Self {
            key: key.into(),
            definition: parser.parse(input)?,
        })
    }

    /// A prop with no formatting directives.
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            definition: Definition::new(),
        }
    }

    /// The output key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The declared type, if any.
    pub fn prop_type(&self) -> Option<&str> {
        self.definition.get("type")
    }

    /// The record key the value is read from: `map`, else the prop key.
    pub fn map_key(&self) -> &str {
        self.definition.get("map").unwrap_or(&self.key)
    }

    /// Explicit output format, if any.
    pub fn format(&self) -> Option<&str> {
        self.definition.get("format")
    }

    /// Explicit timezone, if any.
    pub fn timezone(&self) -> Option<&str> {
        self.definition.get("timezone")
    }

    /// Any other directive value.
    pub fn get(&self, directive: &str) -> Option<&str> {
        self.definition.get(directive)
    }

    /// The raw parsed directives.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_short_key() {
        let prop = PropDefinition::parse("id", "integer").unwrap();
        assert_eq!(prop.prop_type(), Some("integer"));
        assert_eq!(prop.map_key(), "id");
    }

    #[test]
    fn test_map_and_format() {
        let prop = PropDefinition::parse("created", "date|map:created_at|format:%d/%m/%Y").unwrap();
        assert_eq!(prop.prop_type(), Some("date"));
        assert_eq!(prop.map_key(), "created_at");
        assert_eq!(prop.format(), Some("%d/%m/%Y"));
    }

    #[test]
    fn test_plain() {
        let prop = PropDefinition::plain("name");
        assert!(prop.prop_type().is_none());
        assert!(prop.definition().is_empty());
    }
}
