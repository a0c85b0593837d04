//! Transformers turn one raw record into client-facing fields and declare
//! which nested resources may be included.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::{Map, Value, json};
//! use smokescreen_transform::{
//!     IncludeContext, IncludeDeclarations, Item, Resource, TransformResult, Transformer,
//! };
//!
//! struct PostTransformer;
//!
//! impl Transformer for PostTransformer {
//!     fn transform(&self, record: &Value) -> TransformResult<Map<String, Value>> {
//!         let mut data = Map::new();
//!         data.insert("id".into(), record["id"].clone());
//!         data.insert("title".into(), record["title"].clone());
//!         Ok(data)
//!     }
//!
//!     fn includes(&self) -> IncludeDeclarations {
//!         IncludeDeclarations::new()
//!             .with("author", "relation:users|default")
//!             .with("comments", "collection")
//!     }
//!
//!     fn include(
//!         &self,
//!         method: &str,
//!         record: &Value,
//!         _context: &IncludeContext<'_>,
//!     ) -> Option<TransformResult<Resource>> {
//!         match method {
//!             "includeAuthor" => Some(Ok(Item::new(json!({"id": record["author_id"]})).into())),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

mod props;
mod resolver;

pub use props::{
    DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT, Prop, PropFn, format_prop_value, with_props,
};
pub use resolver::{KeyedTransformerResolver, TransformerResolver};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use smokescreen_schema::{IncludeDeclarations, IncludeMap, IncludeSet, ParamMap, ParamValue, PropDefinition};
use std::fmt;
use std::sync::Arc;

use crate::error::TransformResult;
use crate::resource::Resource;

/// Produces client-facing fields for one record.
///
/// Every method has a default, so a transformer only implements what it
/// needs. Without a `transform` implementation the declared [`props`] are
/// evaluated.
///
/// [`props`]: Transformer::props
pub trait Transformer: Send + Sync {
    /// Transform one record into a string-keyed map.
    fn transform(&self, record: &Value) -> TransformResult<Map<String, Value>> {
        with_props(self, record, &self.props())
    }

    /// Declared include keys, each with an optional definition string.
    fn includes(&self) -> IncludeDeclarations {
        IncludeDeclarations::new()
    }

    /// Fields returned when the client asks for no specific fields.
    /// Empty means every field.
    fn default_props(&self) -> Vec<String> {
        Vec::new()
    }

    /// Declarative props used by the default `transform`.
    fn props(&self) -> Vec<Prop> {
        Vec::new()
    }

    /// Produce the resource for an include.
    ///
    /// `method` is the include's hook name (`include<StudlyKey>` unless
    /// declared with `method:`). Return `None` for hooks this transformer
    /// does not provide; the include is then read off the record itself.
    fn include(
        &self,
        method: &str,
        record: &Value,
        context: &IncludeContext<'_>,
    ) -> Option<TransformResult<Resource>> {
        let _ = (method, record, context);
        None
    }

    /// Format a prop whose type is not built in.
    ///
    /// Return `None` to reject the type.
    fn format_prop(
        &self,
        value: &Value,
        definition: &PropDefinition,
    ) -> Option<TransformResult<Value>> {
        let _ = (value, definition);
        None
    }

    /// `chrono` format used for `date` props.
    fn date_format(&self) -> &str {
        DEFAULT_DATE_FORMAT
    }

    /// `chrono` format used for `datetime` props.
    fn datetime_format(&self) -> &str {
        DEFAULT_DATETIME_FORMAT
    }

    /// Timezone applied to date props without an explicit `timezone`.
    fn default_timezone(&self) -> Option<&str> {
        None
    }
}

/// A transformer closure.
pub type TransformFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// The transformer attached to a resource.
#[derive(Clone)]
pub enum TransformerKind {
    /// A closure whose return value is the output. No includes, no field filtering.
    Callable(TransformFn),
    /// A [`Transformer`] implementation.
    Strategy(TransformerRef),
}

impl TransformerKind {
    /// Wrap a closure.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// The strategy transformer, if this is one.
    pub fn as_strategy(&self) -> Option<&TransformerRef> {
        match self {
            Self::Strategy(transformer) => Some(transformer),
            Self::Callable(_) => None,
        }
    }
}

impl fmt::Debug for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Strategy(transformer) => f.debug_tuple("Strategy").field(transformer).finish(),
        }
    }
}

impl<T: Transformer + 'static> From<T> for TransformerKind {
    fn from(transformer: T) -> Self {
        Self::Strategy(TransformerRef::new(transformer))
    }
}

impl From<TransformerRef> for TransformerKind {
    fn from(transformer: TransformerRef) -> Self {
        Self::Strategy(transformer)
    }
}

impl From<Arc<dyn Transformer>> for TransformerKind {
    fn from(transformer: Arc<dyn Transformer>) -> Self {
        Self::Strategy(TransformerRef::from_arc(transformer))
    }
}

/// A shared transformer with its include map memoized.
///
/// Clones share the transformer and the cached include map.
#[derive(Clone)]
pub struct TransformerRef {
    inner: Arc<TransformerCell>,
}

struct TransformerCell {
    transformer: Arc<dyn Transformer>,
    include_map: Mutex<Option<Arc<IncludeMap>>>,
}

impl TransformerRef {
    /// Wrap a transformer.
    pub fn new(transformer: impl Transformer + 'static) -> Self {
        Self::from_arc(Arc::new(transformer))
    }

    /// Wrap an already shared transformer.
    pub fn from_arc(transformer: Arc<dyn Transformer>) -> Self {
        Self {
            inner: Arc::new(TransformerCell {
                transformer,
                include_map: Mutex::new(None),
            }),
        }
    }

    /// The underlying transformer.
    pub fn get(&self) -> &dyn Transformer {
        self.inner.transformer.as_ref()
    }

    /// The include map, computed from the declarations on first access.
    pub fn include_map(&self) -> TransformResult<Arc<IncludeMap>> {
        let mut cached = self.inner.include_map.lock();
        if let Some(map) = cached.as_ref() {
            return Ok(Arc::clone(map));
        }
        let map = Arc::new(IncludeMap::compute(&self.get().includes())?);
        *cached = Some(Arc::clone(&map));
        Ok(map)
    }

    /// Drop the cached include map so the next access recomputes it.
    pub fn reset_include_map(&self) {
        *self.inner.include_map.lock() = None;
    }

    /// All declared include keys.
    pub fn available_includes(&self) -> TransformResult<Vec<String>> {
        Ok(self.include_map()?.available())
    }

    /// Include keys declared with `default`.
    pub fn default_includes(&self) -> TransformResult<Vec<String>> {
        Ok(self.include_map()?.defaults())
    }

    /// Include key to relation keys, for includes that declare relations.
    pub fn relationships(&self) -> TransformResult<IndexMap<String, Vec<String>>> {
        Ok(self.include_map()?.relationships())
    }

    /// The transformer's default props.
    pub fn default_props(&self) -> Vec<String> {
        self.get().default_props()
    }
}

impl fmt::Debug for TransformerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerRef")
            .field("include_map", &*self.inner.include_map.lock())
            .finish_non_exhaustive()
    }
}

/// What an include hook can see about the include being resolved.
#[derive(Debug, Clone, Copy)]
pub struct IncludeContext<'a> {
    key: &'a str,
    includes: &'a IncludeSet,
}

impl<'a> IncludeContext<'a> {
    /// Context for the include `key` within the given include set.
    pub fn new(key: &'a str, includes: &'a IncludeSet) -> Self {
        Self { key, includes }
    }

    /// The include key being resolved.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// The include set of the scope the include belongs to.
    pub fn includes(&self) -> &'a IncludeSet {
        self.includes
    }

    /// Parameters requested for this include, eg. `limit` in `comments:limit(5)`.
    pub fn params(&self) -> ParamMap {
        self.includes.params_for(self.key)
    }

    /// A single parameter requested for this include.
    pub fn param(&self, name: &str) -> Option<&'a ParamValue> {
        self.includes.param(self.key, name)
    }

    /// The nested includes requested below this include.
    pub fn nested(&self) -> IncludeSet {
        self.includes.splice(self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use smokescreen_schema::parse_includes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransformer {
        calls: Arc<AtomicUsize>,
    }

    impl Transformer for CountingTransformer {
        fn includes(&self) -> IncludeDeclarations {
            self.calls.fetch_add(1, Ordering::SeqCst);
            IncludeDeclarations::new()
                .with("owner", "relation:users|default")
                .with("comments", "relation:comments")
        }
    }

    #[test]
    fn test_include_map_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let transformer = TransformerRef::new(CountingTransformer {
            calls: Arc::clone(&calls),
        });

        assert_eq!(transformer.default_includes().unwrap(), vec!["owner"]);
        assert_eq!(
            transformer.available_includes().unwrap(),
            vec!["owner", "comments"]
        );
        let clone = transformer.clone();
        clone.relationships().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        transformer.reset_include_map();
        transformer.include_map().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    struct BrokenTransformer;

    impl Transformer for BrokenTransformer {
        fn includes(&self) -> IncludeDeclarations {
            IncludeDeclarations::new().with("owner", "relation|nonsense")
        }
    }

    #[test]
    fn test_malformed_include_definition() {
        let transformer = TransformerRef::new(BrokenTransformer);
        let err = transformer.available_includes().unwrap_err();
        assert!(err.is_definition_error());
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn test_include_context_params() {
        let includes = parse_includes("comments{author}:limit(5)");
        let context = IncludeContext::new("comments", &includes);
        assert_eq!(context.key(), "comments");
        assert_eq!(context.param("limit").and_then(ParamValue::as_i64), Some(5));
        assert_eq!(context.params().len(), 1);
        assert!(context.nested().has("author"));
    }

    #[test]
    fn test_callable_kind() {
        let kind = TransformerKind::callable(|record| json!({"wrapped": record}));
        assert!(kind.as_strategy().is_none());
        match kind {
            TransformerKind::Callable(f) => {
                assert_eq!(f(&json!(1)), json!({"wrapped": 1}));
            }
            TransformerKind::Strategy(_) => panic!("expected a callable"),
        }
    }
}
