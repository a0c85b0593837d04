//! Parser for pipe-delimited definition strings.

use indexmap::IndexMap;

use super::Definition;
use crate::case::snake_case;
use crate::error::{ParseError, ParseResult};

/// Parses definition strings such as `integer|format:%Y|map:created`.
///
/// # Example
///
/// ```rust
/// use smokescreen_schema::definition::DefinitionParser;
///
/// let parser = DefinitionParser::new()
///     .with_short_keys("type", ["integer", "string"])
///     .with_allowed_keys(["type", "map"]);
///
/// let definition = parser.parse("integer | map:user_id").unwrap();
/// assert_eq!(definition.get("type"), Some("integer"));
/// assert_eq!(definition.get("map"), Some("user_id"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefinitionParser {
    allowed_keys: Vec<String>,
    short_keys: IndexMap<String, String>,
}

impl DefinitionParser {
    /// Create a parser that accepts any directive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the accepted directives. An empty list accepts any directive.
    pub fn with_allowed_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Register bare words that stand for `directive:<word>`.
    ///
    /// With `with_short_keys("type", ["integer"])`, a definition of `integer`
    /// is read as `type:integer`.
    pub fn with_short_keys<I, S>(mut self, directive: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.short_keys.insert(key.into(), directive.to_string());
        }
        self
    }

    /// Parse a definition string.
    ///
    /// Blank input yields an empty definition. When a short key is given a
    /// value, that value is stored under the short key's own name.
    pub fn parse(&self, input: &str) -> ParseResult<Definition> {
        let mut definition = Definition::new();
        if input.trim().is_empty() {
            return Ok(definition);
        }

        for segment in input.split('|').map(str::trim) {
            let (key, value) = match segment.split_once(':') {
                Some((key, value)) => (key.trim(), Some(value.trim().to_string())),
                None => (segment, None),
            };
            if key.is_empty() {
                return Err(ParseError::definition(
                    segment,
                    format!("unable to parse directive in `{input}`"),
                ));
            }

            let (key, value) = match self.short_keys.get(key) {
                Some(directive) => {
                    if value.is_some() {
                        definition.set(normalize_key(key), value);
                    }
                    (directive.as_str(), Some(key.to_string()))
                }
                None => (key, value),
            };

            if !self.is_allowed(key) {
                return Err(ParseError::definition(key, format!("Unsupported key '{key}'")));
            }
            definition.set(normalize_key(key), value);
        }

        Ok(definition)
    }

    fn is_allowed(&self, key: &str) -> bool {
        self.allowed_keys.is_empty() || self.allowed_keys.iter().any(|allowed| allowed == key)
    }
}

/// Directive keys are stored in lower snake case.
fn normalize_key(key: &str) -> String {
    snake_case(&key.to_lowercase())
}
