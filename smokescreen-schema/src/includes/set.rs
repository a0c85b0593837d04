//! The include set: requested include keys plus their parameters.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ParseError, ParseResult};

/// A single include parameter value, eg. the `5` in `:limit(5)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Any other value, kept verbatim.
    String(String),
}

impl ParamValue {
    /// Interpret a raw parameter string, coercing numeric text.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int) = raw.parse::<i64>() {
            return Self::Int(int);
        }
        let numeric = !raw.is_empty()
            && raw.chars().any(|c| c.is_ascii_digit())
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
        if numeric {
            if let Ok(float) = raw.parse::<f64>() {
                return Self::Float(float);
            }
        }
        Self::String(raw.to_string())
    }

    /// Get the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::String(_) => None,
        }
    }

    /// Get the value as a string slice, if it is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => Value::from(*v),
            Self::Float(v) => Value::from(*v),
            Self::String(v) => Value::from(v.as_str()),
        }
    }

    fn from_json(key: &str, name: &str, value: &Value) -> ParseResult<Self> {
        match value {
            Value::Number(n) => Ok(n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::String(n.to_string()))),
            Value::String(s) => Ok(Self::parse(s)),
            Value::Bool(b) => Ok(Self::String(b.to_string())),
            _ => Err(ParseError::includes(format!(
                "parameter `{name}` for `{key}` must be a scalar value"
            ))),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Parameters attached to one include key, by parameter name.
pub type ParamMap = IndexMap<String, ParamValue>;

/// Requested include keys and their parameters.
///
/// Keys are dot-separated paths. Whenever `a.b.c` is present, `a.b` and `a`
/// are present too; parents are expanded as keys are inserted. Keys keep the
/// order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncludeSet {
    keys: IndexSet<String>,
    params: IndexMap<String, ParamMap>,
}

impl IncludeSet {
    /// Create an empty include set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an include set from a list of keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.add(keys);
        set
    }

    /// Replace all keys, expanding parents.
    pub fn set<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keys.clear();
        self.add(keys)
    }

    /// Add keys, expanding parents. Duplicates are ignored.
    pub fn add<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            for expanded in expand_key(key.as_ref()) {
                if !self.keys.contains(expanded) {
                    self.keys.insert(expanded.to_string());
                }
            }
        }
        self
    }

    /// Remove keys along with all of their descendants.
    pub fn remove<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removals: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        self.keys.retain(|key| {
            !removals
                .iter()
                .any(|remove| key == remove || is_descendant(key, remove))
        });
        self
    }

    /// Check if a key has been requested.
    pub fn has(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// All keys, including expanded parents.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Returns true if any keys are set.
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no keys are set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys that do not descend from another key (contain no dot).
    pub fn base_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .filter(|key| !key.contains('.'))
            .cloned()
            .collect()
    }

    /// All parameters, by include key.
    pub fn params(&self) -> &IndexMap<String, ParamMap> {
        &self.params
    }

    /// Returns true if any parameters are set.
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// Parameters for one key. Empty when the key has none.
    pub fn params_for(&self, key: &str) -> ParamMap {
        self.params.get(key).cloned().unwrap_or_default()
    }

    /// A single parameter value.
    pub fn param(&self, key: &str, name: &str) -> Option<&ParamValue> {
        self.params.get(key).and_then(|params| params.get(name))
    }

    /// Set a single parameter.
    pub fn set_param(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> &mut Self {
        self.params
            .entry(key.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    /// Replace all parameters from a JSON structure keyed by include key.
    ///
    /// `{"cast": {"offset": 5}, "cast.movies": {"limit": "3"}}`
    ///
    /// Null and empty containers clear the parameters. Anything else that is
    /// not an object of objects is rejected.
    pub fn set_params(&mut self, params: &Value) -> ParseResult<&mut Self> {
        let parsed = match params {
            Value::Null => IndexMap::new(),
            Value::Array(items) if items.is_empty() => IndexMap::new(),
            Value::Object(map) => {
                let mut parsed = IndexMap::with_capacity(map.len());
                for (key, entry) in map {
                    let Value::Object(entry) = entry else {
                        return Err(ParseError::includes(format!(
                            "parameters for `{key}` must be an object indexed by name"
                        )));
                    };
                    let mut values = ParamMap::with_capacity(entry.len());
                    for (name, value) in entry {
                        values.insert(name.clone(), ParamValue::from_json(key, name, value)?);
                    }
                    parsed.insert(key.clone(), values);
                }
                parsed
            }
            _ => {
                return Err(ParseError::includes(
                    "parameters must be an associative structure indexed by key",
                ));
            }
        };
        self.params = parsed;
        Ok(self)
    }

    /// Clear all keys and parameters.
    pub fn reset(&mut self) -> &mut Self {
        self.keys.clear();
        self.params.clear();
        self
    }

    /// A new, independent include set holding the descendants of `parent`,
    /// with the `parent.` prefix stripped from keys and parameters.
    pub fn splice(&self, parent: &str) -> IncludeSet {
        let prefix = format!("{parent}.");
        let mut spliced = IncludeSet::new();
        for key in &self.keys {
            if let Some(stripped) = key.strip_prefix(&prefix) {
                spliced.keys.insert(stripped.to_string());
                if let Some(params) = self.params.get(key) {
                    spliced.params.insert(stripped.to_string(), params.clone());
                }
            }
        }
        spliced
    }

    /// Descendant keys of `parent`, with the parent prefix removed.
    ///
    /// Given `user` and keys `["user", "user.id", "user.photos", "user.photos.id"]`
    /// this returns `["id", "photos", "photos.id"]`.
    pub fn descendants_of(&self, parent: &str) -> Vec<String> {
        let prefix = format!("{parent}.");
        self.keys
            .iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    /// Parameters for the given keys, by key. Keys without parameters are skipped.
    pub fn all_params_for<I, S>(&self, keys: I) -> IndexMap<String, ParamMap>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .filter_map(|key| {
                let key = key.as_ref();
                self.params
                    .get(key)
                    .map(|params| (key.to_string(), params.clone()))
            })
            .collect()
    }
}

/// `a.b.c` expands to `a.b.c`, `a.b`, `a`.
fn expand_key(key: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(key), |current| {
        let current: &str = *current;
        current.rfind('.').map(|dot| &current[..dot])
    })
}

fn is_descendant(key: &str, ancestor: &str) -> bool {
    key.len() > ancestor.len() + 1
        && key.starts_with(ancestor)
        && key.as_bytes()[ancestor.len()] == b'.'
}
