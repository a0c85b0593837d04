//! Include declarations and the include map derived from them.
//!
//! Recognised directives are `default`, `relation`, `method`, `item` and
//! `collection`. The last two are short forms of `resource_type:item` and
//! `resource_type:collection`, and the long form is accepted as well.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use super::DefinitionParser;
use crate::case::studly_case;
use crate::error::{ParseError, ParseResult};

/// Which resource wrapper an auto-wired include produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A single record.
    Item,
    /// A list of records.
    Collection,
}

impl ResourceType {
    fn from_directive(include_key: &str, value: &str) -> ParseResult<Self> {
        match value {
            "item" => Ok(Self::Item),
            "collection" => Ok(Self::Collection),
            other => Err(ParseError::definition(
                include_key,
                format!("unknown resource type '{other}'"),
            )),
        }
    }
}

/// Include keys declared by a transformer, each with an optional definition.
///
/// ```rust
/// use smokescreen_schema::definition::IncludeDeclarations;
///
/// let includes = IncludeDeclarations::new()
///     .with("owner", "relation:users|default")
///     .with("comments", "relation:comments|collection")
///     .key("tags");
/// assert_eq!(includes.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeDeclarations {
    entries: Vec<(String, Option<String>)>,
}

impl IncludeDeclarations {
    /// No declared includes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an include with no definition.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.entries.push((key.into(), None));
        self
    }

    /// Declare an include with a definition string.
    pub fn with(mut self, key: impl Into<String>, definition: impl Into<String>) -> Self {
        self.entries.push((key.into(), Some(definition.into())));
        self
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, definition)| (key.as_str(), definition.as_deref()))
    }
}

impl<K: Into<String>> FromIterator<K> for IncludeDeclarations {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|key| (key.into(), None)).collect(),
        }
    }
}

/// Resolved settings for one declared include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeMapEntry {
    /// Included when the client requests nothing.
    pub default: bool,
    /// Relation keys to surface to the relation loader.
    pub relation: Vec<String>,
    /// Name of the transformer hook producing the included resource.
    pub method: String,
    /// Wrapper used when the include is auto-wired from the record.
    pub resource_type: Option<ResourceType>,
}

/// Include key to resolved settings, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncludeMap {
    entries: IndexMap<String, IncludeMapEntry>,
}

impl IncludeMap {
    /// Resolve every declaration into an [`IncludeMapEntry`].
    ///
    /// Accepted directives are `default`, `relation`, `method`, `item` and
    /// `collection`. Anything else fails with a definition error naming the
    /// include key.
    pub fn compute(declarations: &IncludeDeclarations) -> ParseResult<Self> {
        let parser = DefinitionParser::new()
            .with_allowed_keys(["default", "relation", "method", "resource_type"])
            .with_short_keys("resource_type", ["item", "collection"]);

        let mut entries = IndexMap::with_capacity(declarations.len());
        for (include_key, definition) in declarations.iter() {
            let definition = parser
                .parse(definition.unwrap_or_default())
                .map_err(|err| rekey(include_key, err))?;

            let relation = if definition.has("relation") {
                match definition.get("relation").filter(|v| !v.is_empty()) {
                    Some(value) => value
                        .split(',')
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .map(str::to_string)
                        .collect(),
                    None => vec![include_key.to_string()],
                }
            } else {
                Vec::new()
            };

            let method = definition
                .get("method")
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("include{}", studly_case(include_key)));

            let resource_type = definition
                .get("resource_type")
                .map(|value| ResourceType::from_directive(include_key, value))
                .transpose()?;

            entries.insert(
                include_key.to_string(),
                IncludeMapEntry {
                    default: definition.has("default"),
                    relation,
                    method,
                    resource_type,
                },
            );
        }

        Ok(Self { entries })
    }

    /// Settings for one include key.
    pub fn get(&self, key: &str) -> Option<&IncludeMapEntry> {
        self.entries.get(key)
    }

    /// Returns true if the key was declared.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All declared include keys.
    pub fn available(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Include keys declared with `default`.
    pub fn defaults(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.default)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Include key to relation keys, for includes that declare relations.
    pub fn relationships(&self) -> IndexMap<String, Vec<String>> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.relation.is_empty())
            .map(|(key, entry)| (key.clone(), entry.relation.clone()))
            .collect()
    }

    /// De-duplicated union of the relation keys for the given includes.
    pub fn relations_for<I, S>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut relations = IndexSet::new();
        for key in keys {
            if let Some(entry) = self.entries.get(key.as_ref()) {
                relations.extend(entry.relation.iter().cloned());
            }
        }
        relations.into_iter().collect()
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IncludeMapEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of declared includes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn rekey(include_key: &str, err: ParseError) -> ParseError {
    match err {
        ParseError::ParseDefinition { message, .. } => ParseError::definition(include_key, message),
        other => other,
    }
}
