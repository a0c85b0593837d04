//! Serializers shape the transformed data of each resource into its final
//! output form and build pagination blocks.
//!
//! - [`DefaultSerializer`] wraps collections under `data` and adds a
//!   `pagination` or `cursor` block
//! - [`SimpleCollectionSerializer`] emits collections as bare lists
//! - [`SerializerKind::Disabled`] emits data exactly as transformed
//!
//! ```rust
//! use serde_json::json;
//! use smokescreen_transform::serializer::{DefaultSerializer, Serializer};
//!
//! let output = DefaultSerializer.collection(None, vec![json!({"id": 1})]);
//! assert_eq!(output, json!({"data": [{"id": 1}]}));
//! ```

use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::{TransformError, TransformResult};
use crate::pagination::{Cursor, Paginator};

/// Output shaping for items, collections and pagination.
pub trait Serializer: Send + Sync {
    /// Shape a collection's transformed records.
    fn collection(&self, key: Option<&str>, data: Vec<Value>) -> Value;

    /// Shape an item's transformed record.
    fn item(&self, key: Option<&str>, data: Value) -> Value;

    /// Output for a collection with no data.
    fn null_collection(&self) -> Value {
        Value::Null
    }

    /// Output for an item with no data.
    fn null_item(&self) -> Value {
        Value::Null
    }

    /// The block merged into a paginated collection's output.
    fn paginator(&self, paginator: &dyn Paginator) -> Value;

    /// The block merged into a cursor-paginated collection's output.
    fn cursor(&self, cursor: &dyn Cursor) -> Value;
}

/// Collections under `data`, items as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSerializer;

impl Serializer for DefaultSerializer {
    fn collection(&self, _key: Option<&str>, data: Vec<Value>) -> Value {
        json!({ "data": data })
    }

    fn item(&self, _key: Option<&str>, data: Value) -> Value {
        data
    }

    fn paginator(&self, paginator: &dyn Paginator) -> Value {
        let current_page = paginator.current_page();
        let last_page = paginator.last_page();

        let mut links = Map::new();
        if current_page > 1 {
            links.insert("previous".into(), Value::from(paginator.url(current_page - 1)));
        }
        if current_page < last_page {
            links.insert("next".into(), Value::from(paginator.url(current_page + 1)));
        }

        json!({
            "pagination": {
                "total": paginator.total(),
                "count": paginator.count(),
                "per_page": paginator.per_page(),
                "current_page": current_page,
                "total_pages": last_page,
                "links": links,
            }
        })
    }

    fn cursor(&self, cursor: &dyn Cursor) -> Value {
        json!({
            "cursor": {
                "current": cursor.current(),
                "prev": cursor.prev(),
                "next": cursor.next(),
                "count": cursor.count(),
            }
        })
    }
}

/// Collections as bare lists, without pagination.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCollectionSerializer;

impl Serializer for SimpleCollectionSerializer {
    fn collection(&self, _key: Option<&str>, data: Vec<Value>) -> Value {
        Value::Array(data)
    }

    fn item(&self, _key: Option<&str>, data: Value) -> Value {
        data
    }

    fn paginator(&self, _paginator: &dyn Paginator) -> Value {
        Value::Object(Map::new())
    }

    fn cursor(&self, _cursor: &dyn Cursor) -> Value {
        Value::Object(Map::new())
    }
}

/// A serializer closure, called with the resource key and the transformed data
/// (a list for collections).
pub type SerializeFn = Arc<dyn Fn(Option<&str>, Value) -> Value + Send + Sync>;

/// The serializer in effect for a resource.
#[derive(Clone)]
pub enum SerializerKind {
    /// Emit data exactly as transformed.
    Disabled,
    /// A closure used for items and collections alike. Pagination is dropped.
    Callable(SerializeFn),
    /// A [`Serializer`] implementation.
    Strategy(Arc<dyn Serializer>),
}

impl SerializerKind {
    /// Wrap a closure.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(Option<&str>, Value) -> Value + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// Look up a built-in serializer: `default`, `simple_collection` or `none`.
    pub fn from_name(name: &str) -> TransformResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(DefaultSerializer.into()),
            "simple_collection" | "simple" => Ok(SimpleCollectionSerializer.into()),
            "none" | "disabled" => Ok(Self::Disabled),
            other => Err(TransformError::invalid_serializer(format!(
                "unknown serializer `{other}`"
            ))),
        }
    }

    /// Returns true for [`SerializerKind::Disabled`].
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Serialize an item's transformed data.
    pub(crate) fn serialize_item(&self, key: Option<&str>, data: Value) -> Value {
        match self {
            Self::Disabled => data,
            Self::Callable(f) => f(key, data),
            Self::Strategy(serializer) if data.is_null() => serializer.null_item(),
            Self::Strategy(serializer) => serializer.item(key, data),
        }
    }

    /// Serialize a collection's transformed records, merging pagination when
    /// the serializer produced an object.
    pub(crate) fn serialize_collection(
        &self,
        key: Option<&str>,
        data: Option<Vec<Value>>,
        paginator: Option<&dyn Paginator>,
        cursor: Option<&dyn Cursor>,
    ) -> Value {
        let serializer = match self {
            Self::Disabled => return data.map_or(Value::Null, Value::Array),
            Self::Callable(f) => return f(key, data.map_or(Value::Null, Value::Array)),
            Self::Strategy(serializer) => serializer,
        };

        let Some(data) = data else {
            return serializer.null_collection();
        };

        let mut output = serializer.collection(key, data);
        let block = match (paginator, cursor) {
            (Some(paginator), _) => serializer.paginator(paginator),
            (None, Some(cursor)) => serializer.cursor(cursor),
            (None, None) => return output,
        };
        merge_block(&mut output, block);
        output
    }
}

fn merge_block(output: &mut Value, block: Value) {
    let block = match block {
        Value::Object(block) if block.is_empty() => return,
        Value::Null => return,
        Value::Object(block) => block,
        other => {
            warn!(block = %other, "pagination block is not an object, dropping it");
            return;
        }
    };

    match output {
        Value::Object(output) => output.extend(block),
        _ => warn!("serialized collection is not an object, dropping pagination"),
    }
}

impl<S: Serializer + 'static> From<S> for SerializerKind {
    fn from(serializer: S) -> Self {
        Self::Strategy(Arc::new(serializer))
    }
}

impl From<Arc<dyn Serializer>> for SerializerKind {
    fn from(serializer: Arc<dyn Serializer>) -> Self {
        Self::Strategy(serializer)
    }
}

impl Default for SerializerKind {
    fn default() -> Self {
        DefaultSerializer.into()
    }
}

impl fmt::Debug for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Strategy(_) => f.write_str("Strategy(..)"),
        }
    }
}
