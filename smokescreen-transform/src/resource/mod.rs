//! Resources: the data handed to the pipeline, with its transformer and
//! output settings.
//!
//! - [`Item`] wraps a single record
//! - [`Collection`] wraps a list of records, plus optional pagination
//! - [`Resource::Raw`] is plain data that is emitted as-is
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use smokescreen_transform::{Collection, Item, Resource, SerializerKind};
//!
//! let post = Item::new(json!({"id": 1, "title": "Hello"})).with_key("post");
//! let tags = Collection::new(vec![json!("rust"), json!("serde")])
//!     .with_serializer(SerializerKind::Disabled);
//!
//! let resource: Resource = post.into();
//! assert_eq!(resource.resource_key(), Some("post"));
//! assert!(!resource.is_collection());
//! assert_eq!(tags.len(), 2);
//! ```

mod collection;
mod item;

pub use collection::Collection;
pub use item::Item;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::compositor::CompositorKind;
use crate::error::{TransformError, TransformResult};
use crate::serializer::SerializerKind;
use crate::transformer::TransformerKind;

/// Settings shared by items and collections.
#[derive(Clone, Debug, Default)]
pub(crate) struct ResourceOptions {
    pub(crate) transformer: Option<TransformerKind>,
    pub(crate) resource_key: Option<String>,
    pub(crate) serializer: Option<SerializerKind>,
    pub(crate) compositor: Option<CompositorKind>,
    pub(crate) meta: Map<String, Value>,
}

/// Builder and accessor methods common to [`Item`] and [`Collection`].
macro_rules! resource_options {
    ($ty:ty) => {
        impl $ty {
            /// Attach a transformer.
            pub fn with_transformer(mut self, transformer: impl Into<$crate::transformer::TransformerKind>) -> Self {
                self.options.transformer = Some(transformer.into());
                self
            }

            /// Set the resource key passed to serializers.
            pub fn with_key(mut self, key: impl Into<String>) -> Self {
                self.options.resource_key = Some(key.into());
                self
            }

            /// Override the serializer for this resource.
            /// Use `SerializerKind::Disabled` to emit data unserialized.
            pub fn with_serializer(mut self, serializer: impl Into<$crate::serializer::SerializerKind>) -> Self {
                self.options.serializer = Some(serializer.into());
                self
            }

            /// Override the compositor used to attach this resource to its parent.
            pub fn with_compositor(mut self, compositor: impl Into<$crate::compositor::CompositorKind>) -> Self {
                self.options.compositor = Some(compositor.into());
                self
            }

            /// Replace the meta data.
            pub fn with_meta(mut self, meta: serde_json::Map<String, serde_json::Value>) -> Self {
                self.options.meta = meta;
                self
            }

            /// The attached transformer, if any.
            pub fn transformer(&self) -> Option<&$crate::transformer::TransformerKind> {
                self.options.transformer.as_ref()
            }

            /// Returns true if a transformer is attached.
            pub fn has_transformer(&self) -> bool {
                self.options.transformer.is_some()
            }

            /// Attach or replace the transformer.
            pub fn set_transformer(&mut self, transformer: impl Into<$crate::transformer::TransformerKind>) {
                self.options.transformer = Some(transformer.into());
            }

            /// The resource key, if set.
            pub fn resource_key(&self) -> Option<&str> {
                self.options.resource_key.as_deref()
            }

            /// Set the resource key.
            pub fn set_resource_key(&mut self, key: impl Into<String>) {
                self.options.resource_key = Some(key.into());
            }

            /// The serializer override, if any.
            pub fn serializer(&self) -> Option<&$crate::serializer::SerializerKind> {
                self.options.serializer.as_ref()
            }

            /// Set or clear the serializer override.
            pub fn set_serializer(&mut self, serializer: Option<$crate::serializer::SerializerKind>) {
                self.options.serializer = serializer;
            }

            /// The compositor override, if any.
            pub fn compositor(&self) -> Option<&$crate::compositor::CompositorKind> {
                self.options.compositor.as_ref()
            }

            /// Set or clear the compositor override.
            pub fn set_compositor(&mut self, compositor: Option<$crate::compositor::CompositorKind>) {
                self.options.compositor = compositor;
            }

            /// Free-form meta data.
            pub fn meta(&self) -> &serde_json::Map<String, serde_json::Value> {
                &self.options.meta
            }

            /// A single meta value.
            pub fn meta_value(&self, key: &str) -> Option<&serde_json::Value> {
                self.options.meta.get(key)
            }

            /// Set a single meta value.
            pub fn set_meta_value(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
                self.options.meta.insert(key.into(), value.into());
            }
        }
    };
}

pub(crate) use resource_options;

/// Any resource the pipeline can process.
#[derive(Clone, Debug)]
pub enum Resource {
    /// A single record.
    Item(Item),
    /// A list of records.
    Collection(Collection),
    /// Plain data, emitted without transformation or serialization.
    Raw(Value),
}

impl Resource {
    /// Wrap plain data.
    pub fn raw(value: impl Into<Value>) -> Self {
        Self::Raw(value.into())
    }

    /// The resource key, if any.
    pub fn resource_key(&self) -> Option<&str> {
        match self {
            Self::Item(item) => item.resource_key(),
            Self::Collection(collection) => collection.resource_key(),
            Self::Raw(_) => None,
        }
    }

    /// The attached transformer, if any.
    pub fn transformer(&self) -> Option<&TransformerKind> {
        match self {
            Self::Item(item) => item.transformer(),
            Self::Collection(collection) => collection.transformer(),
            Self::Raw(_) => None,
        }
    }

    /// Returns true if a transformer is attached.
    pub fn has_transformer(&self) -> bool {
        self.transformer().is_some()
    }

    /// Attach or replace the transformer. Raw data cannot carry one.
    pub fn set_transformer(&mut self, transformer: impl Into<TransformerKind>) -> TransformResult<()> {
        match self {
            Self::Item(item) => item.set_transformer(transformer),
            Self::Collection(collection) => collection.set_transformer(transformer),
            Self::Raw(_) => {
                return Err(TransformError::unhandled_resource(
                    "raw data cannot carry a transformer",
                ));
            }
        }
        Ok(())
    }

    /// The serializer override, if any.
    pub fn serializer(&self) -> Option<&SerializerKind> {
        match self {
            Self::Item(item) => item.serializer(),
            Self::Collection(collection) => collection.serializer(),
            Self::Raw(_) => None,
        }
    }

    /// The compositor override, if any.
    pub fn compositor(&self) -> Option<&CompositorKind> {
        match self {
            Self::Item(item) => item.compositor(),
            Self::Collection(collection) => collection.compositor(),
            Self::Raw(_) => None,
        }
    }

    /// Returns true for collections.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// Meta data, for items and collections.
    pub fn meta(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Item(item) => Some(item.meta()),
            Self::Collection(collection) => Some(collection.meta()),
            Self::Raw(_) => None,
        }
    }

    /// Include key to relation keys declared by the attached transformer.
    ///
    /// Empty for callables, raw data and resources without a transformer.
    pub fn relationships(&self) -> TransformResult<IndexMap<String, Vec<String>>> {
        match self.transformer() {
            Some(TransformerKind::Strategy(transformer)) => transformer.relationships(),
            _ => Ok(IndexMap::new()),
        }
    }

    /// Borrow as an item.
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Mutably borrow as an item.
    pub fn as_item_mut(&mut self) -> Option<&mut Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Borrow as a collection.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Mutably borrow as a collection.
    pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

impl From<Item> for Resource {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl From<Collection> for Resource {
    fn from(collection: Collection) -> Self {
        Self::Collection(collection)
    }
}

impl From<Value> for Resource {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::Transformer;
    use serde_json::json;
    use smokescreen_schema::IncludeDeclarations;

    struct PostTransformer;

    impl Transformer for PostTransformer {
        fn includes(&self) -> IncludeDeclarations {
            IncludeDeclarations::new()
                .with("owner", "relation:users|default")
                .key("tags")
        }
    }

    #[test]
    fn test_raw_rejects_transformer() {
        let mut raw = Resource::raw(json!([1, 2]));
        let err = raw.set_transformer(PostTransformer).unwrap_err();
        assert!(err.is_resource_error());
        assert!(raw.relationships().unwrap().is_empty());
    }

    #[test]
    fn test_relationships_from_transformer() {
        let resource: Resource = Item::new(json!({"id": 1}))
            .with_transformer(PostTransformer)
            .into();
        let relationships = resource.relationships().unwrap();
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships["owner"], vec!["users".to_string()]);
    }

    #[test]
    fn test_callable_has_no_relationships() {
        let resource: Resource = Item::new(json!({"id": 1}))
            .with_transformer(crate::TransformerKind::callable(|record| record.clone()))
            .into();
        assert!(resource.has_transformer());
        assert!(resource.relationships().unwrap().is_empty());
    }

    #[test]
    fn test_accessors() {
        let mut resource: Resource = Collection::new(vec![json!(1)]).with_key("numbers").into();
        assert!(resource.is_collection());
        assert_eq!(resource.resource_key(), Some("numbers"));
        assert!(resource.as_item().is_none());
        resource
            .as_collection_mut()
            .unwrap()
            .set_meta_value("source", "test");
        assert_eq!(resource.meta().unwrap()["source"], json!("test"));
    }
}
